// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::gateway::GatewayService;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<GatewayService>,
}

impl AppState {
    pub fn new(gateway: GatewayService) -> Self {
        Self {
            gateway: Arc::new(gateway),
        }
    }
}
