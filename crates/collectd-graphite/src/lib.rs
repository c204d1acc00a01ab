// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! collectd to Graphite bridge
//!
//! Accepts collectd `write_http` JSON batches over HTTP and forwards every
//! value as a Graphite plaintext line over one persistent TCP connection.
//!
//! ```text
//! HTTP body --> decode_batch --> MetricMapper --> Forwarder --> Sample::to_line --> TCP
//! ```
//!
//! # Quick Start
//!
//! ```bash
//! # Forward to a local carbon-cache, listen on :9292
//! collectd-graphite
//!
//! # Explicit endpoints
//! collectd-graphite --graphite carbon.example.com:2003 --http 0.0.0.0:8080
//!
//! # Using config file
//! collectd-graphite --config collectd-graphite.toml
//! ```
//!
//! collectd side:
//!
//! ```text
//! <Plugin write_http>
//!   <Node "graphite">
//!     URL "http://bridge.example.com:9292/"
//!     Format "JSON"
//!   </Node>
//! </Plugin>
//! ```

pub mod bridge;
pub mod collectd;
pub mod config;
pub mod error;
pub mod forwarder;
pub mod handlers;
pub mod line;
pub mod mapping;
pub mod server;

pub use bridge::Bridge;
pub use collectd::IngestRecord;
pub use config::{BridgeConfig, ConfigError};
pub use error::BridgeError;
pub use forwarder::{ChannelState, ForwardError, Forwarder, ForwarderOptions};
pub use line::Sample;
pub use mapping::{MappingError, MetricMapper};
