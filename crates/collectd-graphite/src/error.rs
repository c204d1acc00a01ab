// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Top-level bridge errors.

use crate::config::ConfigError;
use crate::forwarder::ForwardError;
use thiserror::Error;

/// Bridge errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Forwarder error: {0}")]
    Forward(#[from] ForwardError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP server task failed: {0}")]
    Server(String),
}
