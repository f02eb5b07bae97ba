// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound integrations with the verification provider.

pub mod signing;
pub mod sumsub;

pub use signing::{RequestSigner, SignedRequest};
pub use sumsub::{SumsubClient, SumsubError};
