// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! collectd value list to Graphite metric mapping.
//!
//! Each value of a record becomes one sample named
//! ```text
//! <prefix>.<host>.<plugin>[.<plugin_instance>].[<type_instance>.]<type>.<dsname>
//! ```
//! Only the host and the plugin instance are sanitized (`.` and spaces
//! become `_`); every other component passes through untouched.

use crate::collectd::IngestRecord;
use crate::line::Sample;
use thiserror::Error;
use tracing::{debug, warn};

/// Default metric path prefix.
pub const DEFAULT_PREFIX: &str = "collectd";

/// collectd's default `Interval`.
pub const DEFAULT_EXPECTED_INTERVAL: u64 = 10;

/// A record that cannot be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{host}/{plugin}/{kind}: {values} values but {names} data source names")]
    LengthMismatch {
        host: String,
        plugin: String,
        kind: String,
        values: usize,
        names: usize,
    },
}

/// Replace every `.` and space with `_`.
pub fn sanitize(s: &str) -> String {
    s.replace(['.', ' '], "_")
}

/// Samples of one batch, plus the records that were rejected.
#[derive(Debug, Default)]
pub struct MappedBatch {
    pub samples: Vec<Sample>,
    pub rejected: Vec<MappingError>,
}

/// Maps collectd records to Graphite samples.
#[derive(Debug, Clone)]
pub struct MetricMapper {
    prefix: String,
    expected_interval: u64,
}

impl MetricMapper {
    pub fn new(prefix: impl Into<String>, expected_interval: u64) -> Self {
        Self {
            prefix: prefix.into(),
            expected_interval,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Map one record, one sample per value, in value order.
    ///
    /// A record whose `values` and `dsnames` lengths differ is rejected as a
    /// whole; none of its values are mapped. `null` values are skipped.
    pub fn map_record(&self, record: &IngestRecord) -> Result<Vec<Sample>, MappingError> {
        if record.values.len() != record.dsnames.len() {
            return Err(MappingError::LengthMismatch {
                host: record.host.clone(),
                plugin: record.plugin.clone(),
                kind: record.kind.clone(),
                values: record.values.len(),
                names: record.dsnames.len(),
            });
        }

        if record.interval != self.expected_interval {
            warn!(
                interval = record.interval,
                expected = self.expected_interval,
                plugin = %record.plugin,
                host = %record.host,
                "unexpected collection interval"
            );
        }

        let base = self.metric_base(record);
        let mut samples = Vec::with_capacity(record.values.len());
        for (value, dsname) in record.values.iter().zip(&record.dsnames) {
            let name = format!("{}.{}", base, dsname);
            match value {
                Some(value) => samples.push(Sample::new(name, *value, record.time)),
                None => debug!(metric = %name, "skipping null value"),
            }
        }
        Ok(samples)
    }

    /// Map a whole batch. Rejected records are logged and skipped; the
    /// samples of the remaining records keep their order.
    pub fn map_batch(&self, records: &[IngestRecord]) -> MappedBatch {
        let mut batch = MappedBatch::default();
        for record in records {
            match self.map_record(record) {
                Ok(samples) => batch.samples.extend(samples),
                Err(e) => {
                    warn!(error = %e, "skipping malformed record");
                    batch.rejected.push(e);
                }
            }
        }
        batch
    }

    /// Everything up to (not including) the data source name.
    fn metric_base(&self, record: &IngestRecord) -> String {
        let mut name = format!("{}.{}.{}", self.prefix, sanitize(&record.host), record.plugin);
        if !record.plugin_instance.is_empty() {
            name.push('.');
            name.push_str(&sanitize(&record.plugin_instance));
        }
        name.push('.');
        if !record.type_instance.is_empty() {
            name.push_str(&record.type_instance);
            name.push('.');
        }
        name.push_str(&record.kind);
        name
    }
}

impl Default for MetricMapper {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX, DEFAULT_EXPECTED_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(host: &str, plugin: &str, plugin_instance: &str, kind: &str) -> IngestRecord {
        IngestRecord {
            time: 1000,
            interval: 10,
            host: host.to_string(),
            plugin: plugin.to_string(),
            plugin_instance: plugin_instance.to_string(),
            kind: kind.to_string(),
            type_instance: String::new(),
            values: vec![Some(3.2)],
            dstypes: vec!["gauge".to_string()],
            dsnames: vec!["value".to_string()],
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("eth 0.1"), "eth_0_1");
        assert_eq!(sanitize("plain"), "plain");
        assert_eq!(sanitize(""), "");
        for s in ["eth 0.1", "a..b", " . ", "web.01"] {
            assert_eq!(sanitize(&sanitize(s)), sanitize(s));
        }
    }

    #[test]
    fn test_map_with_plugin_instance() {
        let mapper = MetricMapper::default();
        let samples = mapper
            .map_record(&record("web.01", "cpu", "0", "idle"))
            .expect("map");

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, "collectd.web_01.cpu.0.idle.value");
        assert_eq!(samples[0].value, 3.2);
        assert_eq!(samples[0].timestamp, 1000);
    }

    #[test]
    fn test_map_with_type_instance_only() {
        let mut rec = record("h", "df", "", "used");
        rec.type_instance = "root".to_string();
        rec.values = vec![Some(1.0)];
        rec.time = 0;

        let samples = MetricMapper::default().map_record(&rec).expect("map");
        assert_eq!(samples[0].name, "collectd.h.df.root.used.value");
        assert_eq!(samples[0].timestamp, 0);
    }

    #[test]
    fn test_map_sanitizes_only_host_and_plugin_instance() {
        let mut rec = record("my host", "disk", "sda 1.2", "disk.ops");
        rec.type_instance = "read write".to_string();
        rec.dsnames = vec!["rx.bytes".to_string()];

        let samples = MetricMapper::default().map_record(&rec).expect("map");
        assert_eq!(
            samples[0].name,
            "collectd.my_host.disk.sda_1_2.read write.disk.ops.rx.bytes"
        );
    }

    #[test]
    fn test_map_preserves_value_order() {
        let mut rec = record("h", "load", "", "load");
        rec.values = vec![Some(0.1), Some(0.5), Some(1.5)];
        rec.dsnames = vec![
            "shortterm".to_string(),
            "midterm".to_string(),
            "longterm".to_string(),
        ];

        let samples = MetricMapper::default().map_record(&rec).expect("map");
        let names: Vec<_> = samples.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "collectd.h.load.load.shortterm",
                "collectd.h.load.load.midterm",
                "collectd.h.load.load.longterm"
            ]
        );
        let values: Vec<_> = samples.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0.1, 0.5, 1.5]);
    }

    #[test]
    fn test_map_skips_null_values() {
        let mut rec = record("h", "memory", "", "memory");
        rec.values = vec![None, Some(2.0)];
        rec.dsnames = vec!["free".to_string(), "used".to_string()];

        let samples = MetricMapper::default().map_record(&rec).expect("map");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, "collectd.h.memory.memory.used");
        assert_eq!(samples[0].value, 2.0);
    }

    #[test]
    fn test_map_length_mismatch() {
        let mut rec = record("h", "if", "eth0", "if_octets");
        rec.values = vec![Some(1.0), Some(2.0)];

        let err = MetricMapper::default().map_record(&rec).unwrap_err();
        assert_eq!(
            err,
            MappingError::LengthMismatch {
                host: "h".to_string(),
                plugin: "if".to_string(),
                kind: "if_octets".to_string(),
                values: 2,
                names: 1,
            }
        );
    }

    #[test]
    fn test_map_unexpected_interval_still_maps() {
        let mut rec = record("h", "cpu", "0", "idle");
        rec.interval = 60;
        let samples = MetricMapper::default().map_record(&rec).expect("map");
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_map_batch_skips_only_bad_record() {
        let good = record("a", "cpu", "0", "idle");
        let mut bad = record("b", "cpu", "1", "idle");
        bad.dsnames.clear();
        let other = record("c", "cpu", "2", "idle");

        let batch = MetricMapper::default().map_batch(&[good, bad, other]);
        assert_eq!(batch.samples.len(), 2);
        assert_eq!(batch.samples[0].name, "collectd.a.cpu.0.idle.value");
        assert_eq!(batch.samples[1].name, "collectd.c.cpu.2.idle.value");
        assert_eq!(batch.rejected.len(), 1);
    }

    #[test]
    fn test_custom_prefix() {
        let mapper = MetricMapper::new("servers", 10);
        let samples = mapper.map_record(&record("h", "cpu", "", "idle")).expect("map");
        assert_eq!(samples[0].name, "servers.h.cpu.idle.value");
        assert_eq!(mapper.prefix(), "servers");
    }
}
