// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, sync::Arc};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use kyc_gateway::{
    api::router,
    config::{GatewayConfig, LogFormat, DEFAULT_LOG_FILTER},
    gateway::GatewayService,
    providers::SumsubClient,
    state::AppState,
    storage::ApplicantDatabase,
};

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() {
    let config = GatewayConfig::from_env().expect("Invalid configuration");
    init_tracing(config.log_format);

    let db_path = config.applicant_db_path();
    let store = ApplicantDatabase::open(&db_path).expect("Failed to open applicant database");
    info!(path = %db_path.display(), "Applicant database ready");

    let provider = SumsubClient::new(&config.provider).expect("Failed to build provider client");
    if !provider.is_configured() {
        warn!(
            base_url = %config.provider.base_url,
            "Provider credentials are not configured; provider calls will fail with a configuration error"
        );
    }
    let state = AppState::new(GatewayService::new(provider, Arc::new(store)));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Failed to parse bind address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    info!(%addr, "KYC gateway listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}
