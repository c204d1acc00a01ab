// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP ingest server.

use crate::forwarder::Forwarder;
use crate::handlers;
use crate::mapping::MetricMapper;
use axum::{routing::any, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state
pub struct AppState {
    pub forwarder: Forwarder,
    pub mapper: MetricMapper,
    pub legacy_status_codes: bool,
}

impl AppState {
    pub fn new(forwarder: Forwarder, mapper: MetricMapper, legacy_status_codes: bool) -> Self {
        Self {
            forwarder,
            mapper,
            legacy_status_codes,
        }
    }
}

/// Ingest routes: every method on `/`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handlers::ingest))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
