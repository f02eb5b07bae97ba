// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request signing for the verification provider.
//!
//! Every outbound call carries a Unix timestamp and an HMAC-SHA256 over
//! `timestamp + METHOD + path_with_query + body`. The body must be the exact
//! string that goes on the wire: re-serializing JSON between signing and
//! sending invalidates the signature.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Headers and values derived for a single outbound call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: String,
    pub path_with_query: String,
    pub timestamp: i64,
    pub body: String,
    /// Lowercase hex HMAC-SHA256 digest.
    pub signature: String,
}

/// Computes request signatures with the provider secret key.
#[derive(Clone)]
pub struct RequestSigner {
    secret_key: String,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
        }
    }

    /// Sign using the current Unix time in whole seconds.
    pub fn sign(&self, method: &str, path_with_query: &str, body: &str) -> SignedRequest {
        self.sign_at(Utc::now().timestamp(), method, path_with_query, body)
    }

    /// Sign with an explicit timestamp. Deterministic for fixed inputs.
    pub fn sign_at(
        &self,
        timestamp: i64,
        method: &str,
        path_with_query: &str,
        body: &str,
    ) -> SignedRequest {
        let method = method.to_ascii_uppercase();

        let mut mac = HmacSha256::new_from_slice(self.secret_key.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(timestamp.to_string().as_bytes());
        mac.update(method.as_bytes());
        mac.update(path_with_query.as_bytes());
        mac.update(body.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        SignedRequest {
            method,
            path_with_query: path_with_query.to_string(),
            timestamp,
            body: body.to_string(),
            signature,
        }
    }
}
