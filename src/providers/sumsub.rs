// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Sumsub verification provider integration.
//!
//! Only the three endpoints the gateway needs are covered: the level
//! catalog, applicant creation and WebSDK link issuance. Every call is
//! signed with [`RequestSigner`] and normalized into a JSON value: bodies
//! that do not parse as JSON come back as `Value::String` with the raw text.

use reqwest::{Client, Method};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::signing::RequestSigner;
use crate::config::{ProviderConfig, PROVIDER_APP_TOKEN_ENV, PROVIDER_SECRET_KEY_ENV};

pub const LEVELS_PATH: &str = "/resources/applicants/-/levels";
pub const APPLICANTS_PATH: &str = "/resources/applicants";
pub const WEBSDK_LINK_PATH: &str = "/resources/sdkIntegrations/levels/-/websdkLink";

/// Lifetime requested for hosted verification links.
pub const HOSTED_LINK_TTL_SECS: u64 = 1800;

const APP_TOKEN_HEADER: &str = "X-App-Token";
const ACCESS_TS_HEADER: &str = "X-App-Access-Ts";
const ACCESS_SIG_HEADER: &str = "X-App-Access-Sig";

#[derive(Debug, thiserror::Error)]
pub enum SumsubError {
    #[error("Sumsub configuration missing: {0}")]
    MissingConfig(String),

    #[error("Sumsub request failed: {0}")]
    Request(String),

    #[error("Sumsub returned {status}: {}", describe_payload(.payload))]
    Api { status: u16, payload: Value },
}

/// Applicant creation input, borrowed from the validated gateway request.
pub struct CreateApplicantRequest<'a> {
    pub external_user_id: &'a str,
    pub level_name: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub middle_name: Option<&'a str>,
}

/// Hosted WebSDK link input.
pub struct CreateHostedLinkRequest<'a> {
    pub external_user_id: &'a str,
    pub level_name: &'a str,
    pub ttl_in_secs: u64,
    pub email: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct SumsubClient {
    base_url: String,
    app_token: Option<String>,
    signer: Option<RequestSigner>,
    http: Client,
}

impl SumsubClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, SumsubError> {
        let http = Client::builder()
            .user_agent(concat!("kyc-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SumsubError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_token: config.app_token.clone(),
            signer: config.secret_key.clone().map(RequestSigner::new),
            http,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.app_token.is_some() && self.signer.is_some()
    }

    pub async fn fetch_levels(&self) -> Result<Value, SumsubError> {
        self.call(Method::GET, LEVELS_PATH, None).await
    }

    pub async fn create_applicant(
        &self,
        request: CreateApplicantRequest<'_>,
    ) -> Result<Value, SumsubError> {
        let encoded_level: String =
            url::form_urlencoded::byte_serialize(request.level_name.as_bytes()).collect();
        let path = format!("{APPLICANTS_PATH}?levelName={encoded_level}");
        let payload = applicant_creation_body(&request);
        self.call(Method::POST, &path, Some(&payload)).await
    }

    pub async fn create_hosted_link(
        &self,
        request: CreateHostedLinkRequest<'_>,
    ) -> Result<Value, SumsubError> {
        let payload = hosted_link_body(&request);
        self.call(Method::POST, WEBSDK_LINK_PATH, Some(&payload)).await
    }

    /// Perform one signed call. No retries.
    pub async fn call(
        &self,
        method: Method,
        path_with_query: &str,
        payload: Option<&Value>,
    ) -> Result<Value, SumsubError> {
        let (app_token, signer) = self.credentials()?;

        // Serialized exactly once: the signed string is the transmitted string.
        let body = match payload {
            Some(value) => serde_json::to_string(value)
                .map_err(|e| SumsubError::Request(format!("serialize body failed: {e}")))?,
            None => String::new(),
        };
        let signed = signer.sign(method.as_str(), path_with_query, &body);

        debug!(method = %method, path = %path_with_query, "Sumsub request");

        let mut builder = self
            .http
            .request(method.clone(), format!("{}{}", self.base_url, path_with_query))
            .header(APP_TOKEN_HEADER, app_token)
            .header(ACCESS_TS_HEADER, signed.timestamp.to_string())
            .header(ACCESS_SIG_HEADER, signed.signature)
            .header("Accept", "application/json");
        if payload.is_some() {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = builder.send().await.map_err(|e| {
            SumsubError::Request(format!("{method} {path_with_query} failed: {e}"))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            SumsubError::Request(format!(
                "{method} {path_with_query} body could not be read: {e}"
            ))
        })?;
        let payload = parse_payload(text);

        if !status.is_success() {
            warn!(
                method = %method,
                path = %path_with_query,
                status = status.as_u16(),
                "Sumsub returned an error status"
            );
            return Err(SumsubError::Api {
                status: status.as_u16(),
                payload,
            });
        }

        debug!(method = %method, path = %path_with_query, status = status.as_u16(), "Sumsub response");
        Ok(payload)
    }

    fn credentials(&self) -> Result<(&str, &RequestSigner), SumsubError> {
        let app_token = self
            .app_token
            .as_deref()
            .ok_or_else(|| SumsubError::MissingConfig(PROVIDER_APP_TOKEN_ENV.to_string()))?;
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| SumsubError::MissingConfig(PROVIDER_SECRET_KEY_ENV.to_string()))?;
        Ok((app_token, signer))
    }
}

/// Parse a response body as JSON, falling back to the raw text.
pub fn parse_payload(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

fn applicant_creation_body(request: &CreateApplicantRequest<'_>) -> Value {
    let mut fixed_info = serde_json::Map::new();
    fixed_info.insert(
        "firstName".to_string(),
        Value::String(request.first_name.to_string()),
    );
    fixed_info.insert(
        "lastName".to_string(),
        Value::String(request.last_name.to_string()),
    );
    if let Some(middle_name) = request
        .middle_name
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        fixed_info.insert(
            "middleName".to_string(),
            Value::String(middle_name.to_string()),
        );
    }

    json!({
        "externalUserId": request.external_user_id,
        "levelName": request.level_name,
        "fixedInfo": fixed_info
    })
}

fn hosted_link_body(request: &CreateHostedLinkRequest<'_>) -> Value {
    let mut body = json!({
        "levelName": request.level_name,
        "userId": request.external_user_id,
        "ttlInSecs": request.ttl_in_secs
    });
    if let Some(email) = request
        .email
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        body["applicantIdentifiers"] = json!({ "email": email });
    }
    body
}

/// Human-readable summary of a provider error payload.
pub fn describe_payload(payload: &Value) -> String {
    match payload {
        Value::String(text) if text.trim().is_empty() => "empty response body".to_string(),
        Value::String(text) => text.clone(),
        other => other
            .get("description")
            .and_then(Value::as_str)
            .or_else(|| other.get("message").and_then(Value::as_str))
            .or_else(|| other.get("errorName").and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hmac::{Hmac, Mac};
    use httpmock::{prelude::*, HttpMockRequest};
    use sha2::Sha256;

    fn client_for(server: &MockServer) -> SumsubClient {
        SumsubClient::new(&ProviderConfig::new(
            server.base_url(),
            Some("app-token".to_string()),
            Some("secret-key".to_string()),
        ))
        .expect("client should build")
    }

    #[test]
    fn applicant_body_omits_blank_middle_name() {
        let body = applicant_creation_body(&CreateApplicantRequest {
            external_user_id: "user-1",
            level_name: "basic-kyc",
            first_name: "Ada",
            last_name: "Lovelace",
            middle_name: Some("   "),
        });
        assert_eq!(body["externalUserId"], "user-1");
        assert_eq!(body["levelName"], "basic-kyc");
        assert_eq!(body["fixedInfo"]["firstName"], "Ada");
        assert!(body["fixedInfo"].get("middleName").is_none());
    }

    #[test]
    fn applicant_body_trims_middle_name() {
        let body = applicant_creation_body(&CreateApplicantRequest {
            external_user_id: "user-1",
            level_name: "basic-kyc",
            first_name: "Ada",
            last_name: "Lovelace",
            middle_name: Some("  King "),
        });
        assert_eq!(body["fixedInfo"]["middleName"], "King");
    }

    #[test]
    fn hosted_link_body_includes_trimmed_email_only_when_present() {
        let without = hosted_link_body(&CreateHostedLinkRequest {
            external_user_id: "user-1",
            level_name: "basic-kyc",
            ttl_in_secs: HOSTED_LINK_TTL_SECS,
            email: Some(" "),
        });
        assert_eq!(without["userId"], "user-1");
        assert_eq!(without["ttlInSecs"], 1800);
        assert!(without.get("applicantIdentifiers").is_none());

        let with = hosted_link_body(&CreateHostedLinkRequest {
            external_user_id: "user-1",
            level_name: "basic-kyc",
            ttl_in_secs: HOSTED_LINK_TTL_SECS,
            email: Some(" ada@example.com "),
        });
        assert_eq!(with["applicantIdentifiers"]["email"], "ada@example.com");
    }

    #[test]
    fn parse_payload_falls_back_to_raw_text() {
        assert_eq!(parse_payload(r#"{"ok":true}"#.to_string()), json!({"ok": true}));
        assert_eq!(
            parse_payload("<html>bad gateway</html>".to_string()),
            Value::String("<html>bad gateway</html>".to_string())
        );
    }

    #[test]
    fn describe_payload_prefers_provider_description() {
        let payload = json!({"description": "Applicant already exists", "code": 409});
        assert_eq!(describe_payload(&payload), "Applicant already exists");
        assert_eq!(
            describe_payload(&Value::String("Service Unavailable".into())),
            "Service Unavailable"
        );
        assert_eq!(describe_payload(&json!({"code": 1})), r#"{"code":1}"#);
    }

    #[tokio::test]
    async fn signed_get_sends_auth_headers() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(LEVELS_PATH)
                .header(APP_TOKEN_HEADER, "app-token")
                .header_exists(ACCESS_TS_HEADER)
                .header_exists(ACCESS_SIG_HEADER);
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"items":[{"name":"basic-kyc"}]}"#);
        });

        let payload = client_for(&server).fetch_levels().await.unwrap();
        assert_eq!(payload["items"][0]["name"], "basic-kyc");
        mock.assert();
    }

    #[tokio::test]
    async fn create_applicant_encodes_level_and_sends_signed_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(APPLICANTS_PATH)
                .query_param("levelName", "kyc/basic")
                .json_body(json!({
                    "externalUserId": "user-1",
                    "levelName": "kyc/basic",
                    "fixedInfo": {"firstName": "Ada", "lastName": "Lovelace"}
                }));
            then.status(201).body(r#"{"id":"app-123"}"#);
        });

        let payload = client_for(&server)
            .create_applicant(CreateApplicantRequest {
                external_user_id: "user-1",
                level_name: "kyc/basic",
                first_name: "Ada",
                last_name: "Lovelace",
                middle_name: None,
            })
            .await
            .unwrap();
        assert_eq!(payload["id"], "app-123");
        mock.assert();
    }

    /// Recomputes the signature from what actually arrived on the wire.
    fn wire_signature_matches(req: &HttpMockRequest, secret: &str) -> bool {
        let headers = req.headers();
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let (Some(timestamp), Some(signature)) =
            (header(ACCESS_TS_HEADER), header(ACCESS_SIG_HEADER))
        else {
            return false;
        };
        let uri = req.uri();
        let Some(path_and_query) = uri.path_and_query() else {
            return false;
        };

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(timestamp.as_bytes());
        mac.update(req.method().as_str().as_bytes());
        mac.update(path_and_query.as_str().as_bytes());
        mac.update(req.body_ref());
        hex::encode(mac.finalize().into_bytes()) == signature
    }

    #[tokio::test]
    async fn signature_covers_transmitted_query_and_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path(APPLICANTS_PATH)
                .query_param("levelName", "kyc/basic")
                .is_true(|req| wire_signature_matches(req, "secret-key"));
            then.status(201).body(r#"{"id":"app-123"}"#);
        });

        client_for(&server)
            .create_applicant(CreateApplicantRequest {
                external_user_id: "user-1",
                level_name: "kyc/basic",
                first_name: "Ada",
                last_name: "Lovelace",
                middle_name: Some("King"),
            })
            .await
            .unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn signature_covers_get_without_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(LEVELS_PATH)
                .is_true(|req| wire_signature_matches(req, "secret-key"));
            then.status(200).body(r#"{"items":[]}"#);
        });

        client_for(&server).fetch_levels().await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn signature_made_with_another_secret_is_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path(LEVELS_PATH)
                .is_true(|req| wire_signature_matches(req, "other-secret"));
            then.status(200);
        });

        assert!(client_for(&server).fetch_levels().await.is_err());
        mock.assert_hits(0);
    }

    #[tokio::test]
    async fn success_with_non_json_body_returns_raw_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LEVELS_PATH);
            then.status(200).body("plain text");
        });

        let payload = client_for(&server).fetch_levels().await.unwrap();
        assert_eq!(payload, Value::String("plain text".to_string()));
    }

    #[tokio::test]
    async fn error_status_carries_structured_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LEVELS_PATH);
            then.status(401)
                .body(r#"{"description":"Invalid signature","code":401}"#);
        });

        let error = client_for(&server).fetch_levels().await.unwrap_err();
        match error {
            SumsubError::Api { status, payload } => {
                assert_eq!(status, 401);
                assert_eq!(payload["description"], "Invalid signature");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_status_carries_raw_text_when_unparseable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path(LEVELS_PATH);
            then.status(503).body("upstream down");
        });

        let error = client_for(&server).fetch_levels().await.unwrap_err();
        assert!(error.to_string().contains("503"));
        assert!(error.to_string().contains("upstream down"));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.path(LEVELS_PATH);
            then.status(200);
        });

        let client = SumsubClient::new(&ProviderConfig::new(
            server.base_url(),
            Some("app-token".to_string()),
            None,
        ))
        .unwrap();
        assert!(!client.is_configured());

        let error = client.fetch_levels().await.unwrap_err();
        assert!(matches!(error, SumsubError::MissingConfig(ref name) if name == PROVIDER_SECRET_KEY_ENV));
        mock.assert_hits(0);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = SumsubClient::new(&ProviderConfig::new(
            "https://api.sumsub.com/",
            None,
            None,
        ))
        .unwrap();
        assert_eq!(client.base_url, "https://api.sumsub.com");
    }
}
