// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::providers::sumsub::{describe_payload, SumsubError};
use crate::storage::StoreError;

/// Failure of a gateway operation.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("missing required fields: {}", .0.join(", "))]
    Validation(Vec<&'static str>),

    #[error("provider configuration error: {0}")]
    Configuration(String),

    #[error("provider request failed: {message}")]
    Provider {
        status: Option<u16>,
        message: String,
        payload: Option<Value>,
    },

    #[error("provider response did not include {0}")]
    ProviderContract(&'static str),

    #[error("{0}")]
    Precondition(String),

    #[error("applicant store error: {0}")]
    Store(#[from] StoreError),
}

impl GatewayError {
    /// Stable machine-readable error category.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Validation(_) => "validation",
            GatewayError::Configuration(_) => "configuration",
            GatewayError::Provider { .. } | GatewayError::ProviderContract(_) => "provider",
            GatewayError::Precondition(_) => "precondition",
            GatewayError::Store(_) => "store",
        }
    }
}

impl From<SumsubError> for GatewayError {
    fn from(error: SumsubError) -> Self {
        match error {
            SumsubError::MissingConfig(name) => {
                GatewayError::Configuration(format!("{name} is not set"))
            }
            SumsubError::Request(message) => GatewayError::Provider {
                status: None,
                message,
                payload: None,
            },
            SumsubError::Api { status, payload } => GatewayError::Provider {
                status: Some(status),
                message: format!("provider returned {status}: {}", describe_payload(&payload)),
                payload: Some(payload),
            },
        }
    }
}

/// Uniform failure result rendered at the HTTP boundary.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub missing_fields: Vec<&'static str>,
    pub provider_status: Option<u16>,
    pub provider_payload: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    success: bool,
    error: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provider_payload: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            missing_fields: Vec::new(),
            provider_status: None,
            provider_payload: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<GatewayError> for ApiError {
    fn from(error: GatewayError) -> Self {
        let message = error.to_string();
        let kind = error.kind();
        match error {
            GatewayError::Validation(fields) => ApiError {
                missing_fields: fields,
                ..ApiError::new(StatusCode::BAD_REQUEST, kind, message)
            },
            GatewayError::Configuration(_) => {
                ApiError::new(StatusCode::SERVICE_UNAVAILABLE, kind, message)
            }
            GatewayError::Provider {
                status, payload, ..
            } => ApiError {
                provider_status: status,
                provider_payload: payload,
                ..ApiError::new(StatusCode::BAD_GATEWAY, kind, message)
            },
            GatewayError::ProviderContract(_) => {
                ApiError::new(StatusCode::BAD_GATEWAY, kind, message)
            }
            GatewayError::Precondition(_) => ApiError::new(StatusCode::CONFLICT, kind, message),
            GatewayError::Store(_) => {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, kind, message)
            }
        }
    }
}

/// Malformed request bodies are validation failures. The message keeps the
/// offending field path reported by the deserializer.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "validation", rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            success: false,
            error: self.message,
            kind: self.kind,
            missing_fields: self.missing_fields,
            provider_status: self.provider_status,
            provider_payload: self.provider_payload,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    #[test]
    fn validation_error_lists_missing_fields() {
        let error = GatewayError::Validation(vec!["lastName", "inboxId"]);
        assert_eq!(error.to_string(), "missing required fields: lastName, inboxId");
        assert_eq!(error.kind(), "validation");

        let api: ApiError = error.into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.missing_fields, vec!["lastName", "inboxId"]);
    }

    #[test]
    fn provider_errors_map_to_gateway_taxonomy() {
        let missing: GatewayError = SumsubError::MissingConfig("SUMSUB_SECRET_KEY".into()).into();
        assert!(matches!(missing, GatewayError::Configuration(_)));
        assert_eq!(
            ApiError::from(missing).status,
            StatusCode::SERVICE_UNAVAILABLE
        );

        let api_error: GatewayError = SumsubError::Api {
            status: 409,
            payload: json!({"description": "duplicate"}),
        }
        .into();
        assert_eq!(api_error.to_string(), "provider request failed: provider returned 409: duplicate");
        let api = ApiError::from(api_error);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert_eq!(api.provider_status, Some(409));
    }

    #[test]
    fn precondition_and_contract_statuses() {
        let precondition =
            ApiError::from(GatewayError::Precondition("create applicant first".into()));
        assert_eq!(precondition.status, StatusCode::CONFLICT);
        assert_eq!(precondition.message, "create applicant first");

        let contract = ApiError::from(GatewayError::ProviderContract("applicant id"));
        assert_eq!(contract.status, StatusCode::BAD_GATEWAY);
        assert_eq!(contract.kind, "provider");
    }

    #[tokio::test]
    async fn into_response_returns_failure_envelope() {
        let response =
            ApiError::from(GatewayError::Validation(vec!["levelName"])).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "missing required fields: levelName",
                "kind": "validation",
                "missingFields": ["levelName"]
            })
        );
    }
}
