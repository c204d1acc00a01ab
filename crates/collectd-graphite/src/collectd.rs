// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! collectd `write_http` JSON format.
//!
//! collectd posts an array of value lists:
//! ```json
//! [{"values":[1901474177],"dstypes":["counter"],"dsnames":["value"],
//!   "time":1280959128,"interval":10,"host":"leeloo.octo.it",
//!   "plugin":"cpu","plugin_instance":"0","type":"cpu","type_instance":"idle"}]
//! ```
//!
//! Newer collectd releases send `time` and `interval` as fractional seconds
//! and `null` for NaN gauges; both are accepted here. A `null` value decodes
//! as `None` and is never forwarded.

use serde::{Deserialize, Deserializer, Serialize};

/// One collectd value list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRecord {
    /// Collection time in seconds since the epoch.
    #[serde(default, deserialize_with = "whole_seconds")]
    pub time: i64,

    /// Collection interval in seconds.
    #[serde(default, deserialize_with = "whole_interval")]
    pub interval: u64,

    pub host: String,

    pub plugin: String,

    #[serde(default)]
    pub plugin_instance: String,

    /// collectd type (`type` on the wire).
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub type_instance: String,

    /// Values, paired index by index with `dsnames`. `None` for `null`.
    pub values: Vec<Option<f64>>,

    #[serde(default)]
    pub dstypes: Vec<String>,

    pub dsnames: Vec<String>,
}

/// Decode a request body into a batch of records.
pub fn decode_batch(body: &[u8]) -> Result<Vec<IngestRecord>, serde_json::Error> {
    serde_json::from_slice(body)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
    Whole(i64),
    Fractional(f64),
}

fn whole_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Seconds::deserialize(deserializer)? {
        Seconds::Whole(s) => s,
        Seconds::Fractional(s) => s.trunc() as i64,
    })
}

fn whole_interval<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = whole_seconds(deserializer)?;
    u64::try_from(secs).map_err(|_| serde::de::Error::custom("interval must not be negative"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTD_BATCH: &str = r#"[
      {"values":[1901474177],"dstypes":["counter"],"dsnames":["value"],
       "time":1280959128,"interval":10,"host":"leeloo.octo.it",
       "plugin":"cpu","plugin_instance":"0","type":"cpu","type_instance":"idle"},
      {"values":[0.5,0.25],"dstypes":["gauge","gauge"],"dsnames":["shortterm","midterm"],
       "time":1451893574.285,"interval":10.000,"host":"web01",
       "plugin":"load","plugin_instance":"","type":"load","type_instance":""}
    ]"#;

    #[test]
    fn test_decode_collectd_batch() {
        let records = decode_batch(COLLECTD_BATCH.as_bytes()).expect("decode");
        assert_eq!(records.len(), 2);

        let cpu = &records[0];
        assert_eq!(cpu.time, 1280959128);
        assert_eq!(cpu.interval, 10);
        assert_eq!(cpu.host, "leeloo.octo.it");
        assert_eq!(cpu.plugin, "cpu");
        assert_eq!(cpu.plugin_instance, "0");
        assert_eq!(cpu.kind, "cpu");
        assert_eq!(cpu.type_instance, "idle");
        assert_eq!(cpu.values, vec![Some(1901474177.0)]);
        assert_eq!(cpu.dstypes, vec!["counter"]);
        assert_eq!(cpu.dsnames, vec!["value"]);

        let load = &records[1];
        assert_eq!(load.time, 1451893574);
        assert_eq!(load.interval, 10);
        assert_eq!(load.dsnames, vec!["shortterm", "midterm"]);
    }

    #[test]
    fn test_decode_optional_fields_default() {
        let body = r#"[{"host":"h","plugin":"df","type_instance":"root","type":"used",
                        "dsnames":["value"],"values":[1.0]}]"#;
        let records = decode_batch(body.as_bytes()).expect("decode");
        assert_eq!(records[0].time, 0);
        assert_eq!(records[0].interval, 0);
        assert_eq!(records[0].plugin_instance, "");
        assert!(records[0].dstypes.is_empty());
    }

    #[test]
    fn test_decode_null_value_is_none() {
        let body = r#"[{"host":"h","plugin":"p","type":"t","dsnames":["a","b"],"values":[null,2]}]"#;
        let records = decode_batch(body.as_bytes()).expect("decode");
        assert_eq!(records[0].values, vec![None, Some(2.0)]);
    }

    #[test]
    fn test_decode_missing_required_field() {
        let body = r#"[{"plugin":"p","type":"t","dsnames":["a"],"values":[1]}]"#;
        let err = decode_batch(body.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("host"), "{}", err);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_batch(b"not json").is_err());
        assert!(decode_batch(b"{\"host\":\"h\"}").is_err());
    }

    #[test]
    fn test_decode_negative_interval() {
        let body = r#"[{"host":"h","plugin":"p","type":"t","dsnames":[],"values":[],"interval":-1}]"#;
        assert!(decode_batch(body.as_bytes()).is_err());
    }
}
