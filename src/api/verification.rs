// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Verification endpoints. Handlers only unwrap the request and wrap the
//! result; all behavior lives in [`GatewayService`](crate::gateway::GatewayService).

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;

use crate::{
    error::ApiError,
    models::{
        ApplicantResponse, CreateApplicantRequest, GenerateHostedLinkRequest, HostedLink,
        VerificationLevels,
    },
    state::AppState,
};

/// Success envelope: `{"success": true, ...payload}`.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T> Success<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[utoipa::path(
    get,
    path = "/v1/levels",
    tag = "Verification",
    responses(
        (status = 200, description = "Verification levels", body = VerificationLevels),
        (status = 502, description = "Provider error"),
        (status = 503, description = "Provider credentials missing")
    )
)]
pub async fn list_levels(
    State(state): State<AppState>,
) -> Result<Json<Success<VerificationLevels>>, ApiError> {
    let levels = state.gateway.list_verification_levels().await?;
    Ok(Success::new(levels))
}

#[utoipa::path(
    post,
    path = "/v1/applicants",
    tag = "Verification",
    request_body = CreateApplicantRequest,
    responses(
        (status = 200, description = "Applicant created or reused", body = ApplicantResponse),
        (status = 400, description = "Missing or malformed fields"),
        (status = 502, description = "Provider error"),
        (status = 503, description = "Provider credentials missing")
    )
)]
pub async fn create_applicant(
    State(state): State<AppState>,
    payload: Result<Json<CreateApplicantRequest>, JsonRejection>,
) -> Result<Json<Success<ApplicantResponse>>, ApiError> {
    let Json(request) = payload?;
    let response = state.gateway.create_applicant(request).await?;
    Ok(Success::new(response))
}

#[utoipa::path(
    post,
    path = "/v1/hosted-links",
    tag = "Verification",
    request_body = GenerateHostedLinkRequest,
    responses(
        (status = 200, description = "Hosted verification link", body = HostedLink),
        (status = 400, description = "Missing or malformed fields"),
        (status = 409, description = "No applicant registered for this identity"),
        (status = 502, description = "Provider error")
    )
)]
pub async fn generate_hosted_link(
    State(state): State<AppState>,
    payload: Result<Json<GenerateHostedLinkRequest>, JsonRejection>,
) -> Result<Json<Success<HostedLink>>, ApiError> {
    let Json(request) = payload?;
    let link = state.gateway.generate_hosted_link(request).await?;
    Ok(Success::new(link))
}
