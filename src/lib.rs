// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! KYC Gateway - Identity Verification Provider Gateway
//!
//! Mediates identity-verification operations between client applications and
//! the Sumsub verification API.
//!
//! ## Modules
//!
//! - `providers` - Request signing and the provider HTTP client
//! - `storage` - Durable external identity → applicant registry (redb)
//! - `gateway` - Orchestration: levels, dedup-aware applicant creation, hosted links
//! - `api` - HTTP API handlers (Axum)
//! - `config` - Environment configuration
//! - `error` - Error taxonomy and the failure envelope

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod providers;
pub mod state;
pub mod storage;
