// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HTTP request handlers.

use crate::collectd;
use crate::server::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Per-batch outcome returned to collectd.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestSummary {
    /// Samples produced by the batch.
    pub total: usize,
    /// Failed writes plus rejected records.
    pub errors: usize,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ok: {}\nErrors: {}\n", self.total, self.errors)
    }
}

/// ANY / - collectd `write_http` JSON batch
pub async fn ingest(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let records = match collectd::decode_batch(&body) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, bytes = body.len(), "rejecting undecodable batch");
            let status = if state.legacy_status_codes {
                StatusCode::OK
            } else {
                StatusCode::BAD_REQUEST
            };
            return (status, err.to_string()).into_response();
        }
    };

    let batch = state.mapper.map_batch(&records);
    let mut summary = IngestSummary {
        total: batch.samples.len(),
        errors: batch.rejected.len(),
    };

    for sample in batch.samples {
        if state.forwarder.write_direct(sample).await.is_err() {
            summary.errors += 1;
        }
    }

    debug!(
        records = records.len(),
        samples = summary.total,
        errors = summary.errors,
        "batch forwarded"
    );

    (StatusCode::OK, summary.to_string()).into_response()
}
