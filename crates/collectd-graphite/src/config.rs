// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge configuration.
//!
//! Loaded from a TOML file; every field has a default so an empty file is a
//! valid configuration.
//!
//! ```toml
//! graphite = "graphite.example.com:2003"
//! listen = "0.0.0.0:9292"
//! prefix = "collectd"
//! reconnect_backoff_ms = 10000
//! ```

use crate::forwarder::{ForwarderOptions, DEFAULT_QUEUE_CAPACITY};
use crate::mapping::{MetricMapper, DEFAULT_EXPECTED_INTERVAL, DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Bridge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
    /// Graphite line receiver (`host:port`).
    #[serde(default = "default_graphite")]
    pub graphite: String,

    /// HTTP listen address (`host:port`).
    #[serde(default = "default_listen")]
    pub listen: String,

    /// First component of every metric path.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Interval (seconds) records are expected to carry; others are logged.
    #[serde(default = "default_expected_interval")]
    pub expected_interval: u64,

    /// Per-attempt connect timeout (milliseconds).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Delay between reconnect attempts (milliseconds).
    #[serde(default = "default_reconnect_backoff_ms")]
    pub reconnect_backoff_ms: u64,

    /// Deadline for one write (milliseconds). Unset means no deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_timeout_ms: Option<u64>,

    /// Capacity of the pending-sample queue.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Answer decode failures with 200 instead of 400.
    #[serde(default)]
    pub legacy_status_codes: bool,

    /// Statistics reporting interval (seconds, 0 to disable).
    #[serde(default = "default_stats_interval")]
    pub stats_interval_secs: u64,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_graphite() -> String {
    "localhost:2003".to_string()
}

fn default_listen() -> String {
    "0.0.0.0:9292".to_string()
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_expected_interval() -> u64 {
    DEFAULT_EXPECTED_INTERVAL
}

fn default_connect_timeout_ms() -> u64 {
    2_000
}

fn default_reconnect_backoff_ms() -> u64 {
    10_000
}

fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_stats_interval() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            graphite: default_graphite(),
            listen: default_listen(),
            prefix: default_prefix(),
            expected_interval: default_expected_interval(),
            connect_timeout_ms: default_connect_timeout_ms(),
            reconnect_backoff_ms: default_reconnect_backoff_ms(),
            write_timeout_ms: None,
            queue_capacity: default_queue_capacity(),
            legacy_status_codes: false,
            stats_interval_secs: default_stats_interval(),
            log_level: default_log_level(),
        }
    }
}

impl BridgeConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graphite.trim().is_empty() {
            return Err(ConfigError::Invalid("Graphite address is empty".into()));
        }
        if self.listen.trim().is_empty() {
            return Err(ConfigError::Invalid("Listen address is empty".into()));
        }
        if self.prefix.is_empty() || self.prefix.contains(' ') {
            return Err(ConfigError::Invalid(format!(
                "Metric prefix '{}' must be non-empty and contain no spaces",
                self.prefix
            )));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "queue_capacity must be greater than zero".into(),
            ));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.write_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "write_timeout_ms must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn reconnect_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect_backoff_ms)
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }

    pub fn forwarder_options(&self) -> ForwarderOptions {
        ForwarderOptions {
            queue_capacity: self.queue_capacity,
            write_timeout: self.write_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn mapper(&self) -> MetricMapper {
        MetricMapper::new(self.prefix.clone(), self.expected_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = BridgeConfig::from_toml("").expect("parse");
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.graphite, "localhost:2003");
        assert_eq!(config.listen, "0.0.0.0:9292");
        assert_eq!(config.connect_timeout(), Duration::from_secs(2));
        assert_eq!(config.reconnect_backoff(), Duration::from_secs(10));
        assert_eq!(config.stats_interval(), Some(Duration::from_secs(60)));
        assert!(config.forwarder_options().write_timeout.is_none());
    }

    #[test]
    fn test_parse_all_fields() {
        let toml = r#"
graphite = "carbon.example.com:2003"
listen = "127.0.0.1:8080"
prefix = "servers"
expected_interval = 60
connect_timeout_ms = 500
reconnect_backoff_ms = 1000
write_timeout_ms = 3000
queue_capacity = 64
legacy_status_codes = true
stats_interval_secs = 0
log_level = "debug"
"#;
        let config = BridgeConfig::from_toml(toml).expect("parse");
        assert_eq!(config.graphite, "carbon.example.com:2003");
        assert_eq!(config.listen, "127.0.0.1:8080");
        assert_eq!(config.mapper().prefix(), "servers");
        assert_eq!(config.expected_interval, 60);
        assert_eq!(config.connect_timeout(), Duration::from_millis(500));
        assert_eq!(config.reconnect_backoff(), Duration::from_secs(1));
        assert!(config.legacy_status_codes);
        assert_eq!(config.stats_interval(), None);
        assert_eq!(config.log_level, "debug");

        let options = config.forwarder_options();
        assert_eq!(options.queue_capacity, 64);
        assert_eq!(options.write_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = BridgeConfig::from_toml("graphit = \"x:1\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let cases = [
            "graphite = \"\"",
            "listen = \" \"",
            "prefix = \"\"",
            "prefix = \"my prefix\"",
            "queue_capacity = 0",
            "connect_timeout_ms = 0",
            "write_timeout_ms = 0",
        ];
        for case in cases {
            match BridgeConfig::from_toml(case) {
                Err(ConfigError::Invalid(_)) => {}
                other => panic!("{}: expected Invalid, got {:?}", case, other),
            }
        }
    }

    #[test]
    fn test_toml_roundtrip_of_example() {
        let example = BridgeConfig::default().to_toml().expect("serialize");
        let parsed = BridgeConfig::from_toml(&example).expect("parse example");
        assert_eq!(parsed, BridgeConfig::default());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "graphite = \"10.0.0.5:2003\"").unwrap();
        writeln!(file, "queue_capacity = 5").unwrap();

        let config = BridgeConfig::from_file(file.path()).expect("load");
        assert_eq!(config.graphite, "10.0.0.5:2003");
        assert_eq!(config.queue_capacity, 5);
    }

    #[test]
    fn test_from_missing_file() {
        let err = BridgeConfig::from_file("/nonexistent/collectd-graphite.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
