// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Graphite plaintext protocol writer.
//!
//! Line format:
//! ```text
//! metric.path value timestamp\n
//! ```
//!
//! See: <https://graphite.readthedocs.io/en/latest/feeding-carbon.html>

use std::time::{SystemTime, UNIX_EPOCH};

/// One normalized sample: a dotted metric path, its value and a timestamp
/// in seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Dotted metric path.
    pub name: String,
    /// Sample value.
    pub value: f64,
    /// Seconds since the Unix epoch, `0` meaning "now".
    pub timestamp: i64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(name: impl Into<String>, value: f64, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
        }
    }

    /// Encode this sample as one newline-terminated line.
    ///
    /// A zero timestamp is replaced with the wall-clock time at the moment
    /// of encoding, not the moment the sample was created.
    pub fn to_line(&self) -> String {
        encode_line_at(self, unix_now())
    }
}

/// Encode a sample, substituting `now` for a zero timestamp.
pub fn encode_line_at(sample: &Sample, now: i64) -> String {
    let timestamp = if sample.timestamp == 0 {
        now
    } else {
        sample.timestamp
    };

    let value = format_value(sample.value);
    let mut line = String::with_capacity(sample.name.len() + value.len() + 22);
    line.push_str(&sample.name);
    line.push(' ');
    line.push_str(&value);
    line.push(' ');
    line.push_str(&timestamp.to_string());
    line.push('\n');
    line
}

/// Current wall-clock time in whole seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Format a value the way Graphite expects it.
///
/// - Shortest decimal form that round-trips (`3.2`, `100000`, `0.001`)
/// - Exponent form below `1e-4` and from `1e6` up (`1e+06`, `2.5e-07`)
/// - `NaN`, `+Inf` and `-Inf` for non-finite values
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return format!("{}", value);
    }

    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return format!("{}", value),
    };

    if (-4..6).contains(&exponent) {
        format!("{}", value)
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.unsigned_abs())
    }
}
