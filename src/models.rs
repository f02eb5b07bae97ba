// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Gateway Data Models
//!
//! Request and response structures for the three gateway operations. Field
//! names are camelCase on the wire. Request fields are optional at the
//! deserialization layer so that missing fields are reported together by
//! validation instead of failing on the first one.
//!
//! ## Model Categories
//!
//! - **Levels**: flattened verification level catalog
//! - **Applicants**: dedup-aware applicant creation
//! - **Hosted Links**: short-lived verification URLs (never persisted)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::storage::ApplicantMapping;

// =============================================================================
// Levels
// =============================================================================

/// Verification levels known to the provider.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct VerificationLevels {
    /// Level names in provider order
    pub levels: Vec<String>,
    /// Unmodified provider payload
    #[schema(value_type = Object)]
    pub raw: Value,
}

// =============================================================================
// Applicants
// =============================================================================

/// Request body for applicant creation.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicantRequest {
    pub external_user_id: Option<String>,
    pub tenant_brand: Option<String>,
    pub inbox_id: Option<i64>,
    pub level_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Sent to the provider only when non-blank
    pub middle_name: Option<String>,
}

/// Whether the applicant was created by this call or found in the registry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ApplicantOutcome {
    Created,
    Reused,
}

/// Response for applicant creation.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantResponse {
    pub outcome: ApplicantOutcome,
    pub mapping: ApplicantMapping,
    /// Provider creation payload; absent when the mapping was reused
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub raw: Option<Value>,
}

impl ApplicantResponse {
    pub fn is_reused(&self) -> bool {
        self.outcome == ApplicantOutcome::Reused
    }
}

// =============================================================================
// Hosted Links
// =============================================================================

/// Request body for hosted link issuance.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateHostedLinkRequest {
    pub external_user_id: Option<String>,
    pub level_name: Option<String>,
    /// Forwarded to the provider as an applicant identifier; never stored
    pub email: Option<String>,
}

/// Short-lived verification URL. Returned to the caller and dropped.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HostedLink {
    pub url: String,
    pub ttl_in_secs: u64,
    pub external_user_id: String,
    pub level_name: String,
}
