// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Gateway orchestration: level lookup, dedup-aware applicant creation and
//! hosted link issuance.
//!
//! Each operation performs at most one registry read, one provider call and
//! one registry write, in that order. A failure at any step leaves the
//! registry as it was before the operation.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::error::GatewayError;
use crate::models::{
    ApplicantOutcome, ApplicantResponse, CreateApplicantRequest, GenerateHostedLinkRequest,
    HostedLink, VerificationLevels,
};
use crate::providers::sumsub::{
    self, CreateHostedLinkRequest, SumsubClient, HOSTED_LINK_TTL_SECS,
};
use crate::storage::{ApplicantMapping, ApplicantRecord, ApplicantStore, ClaimOutcome};

pub struct GatewayService {
    provider: SumsubClient,
    registry: Arc<dyn ApplicantStore>,
}

impl GatewayService {
    pub fn new(provider: SumsubClient, registry: Arc<dyn ApplicantStore>) -> Self {
        Self { provider, registry }
    }

    pub fn provider_configured(&self) -> bool {
        self.provider.is_configured()
    }

    /// Fetch the provider's level catalog and flatten it into level names.
    pub async fn list_verification_levels(&self) -> Result<VerificationLevels, GatewayError> {
        let raw = self.provider.fetch_levels().await?;
        let levels = extract_level_names(&raw);
        info!(count = levels.len(), "fetched verification levels");
        Ok(VerificationLevels { levels, raw })
    }

    /// Create a provider applicant for an external identity, or return the
    /// one already registered for it.
    pub async fn create_applicant(
        &self,
        request: CreateApplicantRequest,
    ) -> Result<ApplicantResponse, GatewayError> {
        let input = NewApplicant::validate(request)?;

        if let Some(existing) = self
            .registry
            .find(&input.external_user_id)?
            .filter(ApplicantMapping::has_applicant)
        {
            info!(
                external_user_id = %existing.external_user_id,
                applicant_id = %existing.applicant_id,
                reused = true,
                "applicant already registered"
            );
            return Ok(ApplicantResponse {
                outcome: ApplicantOutcome::Reused,
                mapping: existing,
                raw: None,
            });
        }

        let raw = self
            .provider
            .create_applicant(sumsub::CreateApplicantRequest {
                external_user_id: &input.external_user_id,
                level_name: &input.level_name,
                first_name: &input.first_name,
                last_name: &input.last_name,
                middle_name: input.middle_name.as_deref(),
            })
            .await?;

        let applicant_id = extract_applicant_id(&raw)
            .ok_or(GatewayError::ProviderContract("applicant id"))?
            .to_string();

        let record = ApplicantRecord {
            external_user_id: input.external_user_id,
            tenant_brand: input.tenant_brand,
            inbox_id: input.inbox_id,
            applicant_id,
        };

        match self.registry.claim(&record)? {
            ClaimOutcome::Inserted(mapping) => {
                info!(
                    external_user_id = %mapping.external_user_id,
                    applicant_id = %mapping.applicant_id,
                    reused = false,
                    "applicant created"
                );
                Ok(ApplicantResponse {
                    outcome: ApplicantOutcome::Created,
                    mapping,
                    raw: Some(raw),
                })
            }
            ClaimOutcome::Existing(mapping) => {
                // A concurrent request for the same identity committed first.
                warn!(
                    external_user_id = %mapping.external_user_id,
                    applicant_id = %mapping.applicant_id,
                    orphaned_applicant_id = %record.applicant_id,
                    "lost applicant creation race; keeping registered applicant"
                );
                Ok(ApplicantResponse {
                    outcome: ApplicantOutcome::Reused,
                    mapping,
                    raw: None,
                })
            }
        }
    }

    /// Issue a hosted verification link for an identity that already has an
    /// applicant. The link is returned and never stored.
    pub async fn generate_hosted_link(
        &self,
        request: GenerateHostedLinkRequest,
    ) -> Result<HostedLink, GatewayError> {
        let mut missing = Vec::new();
        let external_user_id = required(request.external_user_id, "externalUserId", &mut missing);
        let level_name = required(request.level_name, "levelName", &mut missing);
        if !missing.is_empty() {
            return Err(GatewayError::Validation(missing));
        }

        let mapping = self
            .registry
            .find(&external_user_id)?
            .filter(ApplicantMapping::has_applicant)
            .ok_or_else(|| {
                GatewayError::Precondition(format!(
                    "no applicant registered for externalUserId `{external_user_id}`; create applicant first"
                ))
            })?;

        let raw = self
            .provider
            .create_hosted_link(CreateHostedLinkRequest {
                external_user_id: &external_user_id,
                level_name: &level_name,
                ttl_in_secs: HOSTED_LINK_TTL_SECS,
                email: request.email.as_deref(),
            })
            .await?;

        let url = extract_hosted_url(&raw)
            .ok_or(GatewayError::ProviderContract("hosted link url"))?
            .to_string();

        info!(
            external_user_id = %external_user_id,
            applicant_id = %mapping.applicant_id,
            level_name = %level_name,
            "issued hosted verification link"
        );

        Ok(HostedLink {
            url,
            ttl_in_secs: HOSTED_LINK_TTL_SECS,
            external_user_id,
            level_name,
        })
    }
}

/// Validated applicant creation input.
struct NewApplicant {
    external_user_id: String,
    tenant_brand: String,
    inbox_id: i64,
    level_name: String,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
}

impl NewApplicant {
    fn validate(request: CreateApplicantRequest) -> Result<Self, GatewayError> {
        let mut missing = Vec::new();
        let external_user_id = required(request.external_user_id, "externalUserId", &mut missing);
        let tenant_brand = required(request.tenant_brand, "tenantBrand", &mut missing);
        if request.inbox_id.is_none() {
            missing.push("inboxId");
        }
        let level_name = required(request.level_name, "levelName", &mut missing);
        let first_name = required(request.first_name, "firstName", &mut missing);
        let last_name = required(request.last_name, "lastName", &mut missing);

        match request.inbox_id {
            Some(inbox_id) if missing.is_empty() => Ok(Self {
                external_user_id,
                tenant_brand,
                inbox_id,
                level_name,
                first_name,
                last_name,
                middle_name: request.middle_name,
            }),
            _ => Err(GatewayError::Validation(missing)),
        }
    }
}

/// Trimmed non-empty value, or record the field as missing.
fn required(value: Option<String>, field: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
    {
        Some(value) => value,
        None => {
            missing.push(field);
            String::new()
        }
    }
}

// =============================================================================
// Response Extraction
// =============================================================================

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Flatten a level catalog: `items` at the top level or under `list.items`;
/// each item named by `name`, then `id`, then `levelName`.
pub fn extract_level_names(payload: &Value) -> Vec<String> {
    let items = payload
        .get("items")
        .and_then(Value::as_array)
        .or_else(|| payload.pointer("/list/items").and_then(Value::as_array));

    items
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    non_empty_str(item, "name")
                        .or_else(|| non_empty_str(item, "id"))
                        .or_else(|| non_empty_str(item, "levelName"))
                })
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn extract_applicant_id(payload: &Value) -> Option<&str> {
    non_empty_str(payload, "id").or_else(|| non_empty_str(payload, "applicantId"))
}

pub fn extract_hosted_url(payload: &Value) -> Option<&str> {
    non_empty_str(payload, "url")
}
