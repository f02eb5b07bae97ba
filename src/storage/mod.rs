// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Durable Storage
//!
//! The only persisted entity is the [`ApplicantMapping`]: one row per
//! external identity, stored in an embedded redb database under `DATA_DIR`.
//!
//! Hosted verification links, signatures and provider credentials are never
//! written here.

pub mod applicants;

pub use applicants::{
    ApplicantDatabase, ApplicantMapping, ApplicantRecord, ApplicantStore, ClaimOutcome,
    StoreError, StoreResult,
};
