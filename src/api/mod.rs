// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        ApplicantOutcome, ApplicantResponse, CreateApplicantRequest, GenerateHostedLinkRequest,
        HostedLink, VerificationLevels,
    },
    state::AppState,
    storage::ApplicantMapping,
};

pub mod health;
pub mod verification;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/levels", get(verification::list_levels))
        .route("/applicants", post(verification::create_applicant))
        .route("/hosted-links", post(verification::generate_hosted_link))
        .with_state(state.clone());

    Router::new()
        .route("/health", get(health::health))
        .with_state(state)
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        verification::list_levels,
        verification::create_applicant,
        verification::generate_hosted_link
    ),
    components(
        schemas(
            health::HealthResponse,
            VerificationLevels,
            CreateApplicantRequest,
            ApplicantOutcome,
            ApplicantResponse,
            ApplicantMapping,
            GenerateHostedLinkRequest,
            HostedLink
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Verification", description = "Levels, applicants and hosted verification links")
    )
)]
struct ApiDoc;
