// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup and passed
//! into the provider client and storage as explicit values. Nothing below
//! `main` reads the environment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUMSUB_BASE_URL` | Verification provider API base URL | `https://api.sumsub.com` |
//! | `SUMSUB_APP_TOKEN` | Provider app token (`X-App-Token`) | Required for provider calls |
//! | `SUMSUB_SECRET_KEY` | Provider HMAC secret key | Required for provider calls |
//! | `DATA_DIR` | Directory holding the applicant database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;

use url::Url;

pub const PROVIDER_BASE_URL_ENV: &str = "SUMSUB_BASE_URL";
pub const PROVIDER_APP_TOKEN_ENV: &str = "SUMSUB_APP_TOKEN";
pub const PROVIDER_SECRET_KEY_ENV: &str = "SUMSUB_SECRET_KEY";
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://api.sumsub.com";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// File name of the applicant database inside `DATA_DIR`.
pub const APPLICANT_DB_FILE: &str = "applicants.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is not a valid http(s) URL: {value}")]
    InvalidUrl { name: &'static str, value: String },

    #[error("{name} is not a valid port: {value}")]
    InvalidPort { name: &'static str, value: String },
}

/// Credentials and endpoint for the verification provider.
///
/// Token and secret stay optional here: their absence is reported as a
/// configuration error by the provider client before any signed call.
#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub app_token: Option<String>,
    pub secret_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("app_token", &self.app_token.as_ref().map(|_| "<set>"))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(
        base_url: impl Into<String>,
        app_token: Option<String>,
        secret_key: Option<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            app_token: non_blank(app_token),
            secret_key: non_blank(secret_key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub provider: ProviderConfig,
    pub data_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| non_blank(lookup(name)).map(|v| v.trim().to_string());

        let base_url = optional(PROVIDER_BASE_URL_ENV)
            .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string());
        validate_base_url(PROVIDER_BASE_URL_ENV, &base_url)?;

        let port = match optional(PORT_ENV) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort {
                name: PORT_ENV,
                value: raw.clone(),
            })?,
            None => DEFAULT_PORT,
        };

        let log_format = match optional(LOG_FORMAT_ENV).as_deref() {
            Some(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            provider: ProviderConfig::new(
                base_url,
                lookup(PROVIDER_APP_TOKEN_ENV),
                lookup(PROVIDER_SECRET_KEY_ENV),
            ),
            data_dir: PathBuf::from(
                optional(DATA_DIR_ENV).unwrap_or_else(|| DEFAULT_DATA_DIR.to_string()),
            ),
            host: optional(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            log_format,
        })
    }

    pub fn applicant_db_path(&self) -> PathBuf {
        self.data_dir.join(APPLICANT_DB_FILE)
    }
}

fn validate_base_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            name,
            value: value.to_string(),
        }),
    }
}

/// Drops blank values. Non-blank values are returned byte for byte.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
