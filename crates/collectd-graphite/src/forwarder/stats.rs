// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forwarder counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters, shared between the writer task and its handles.
#[derive(Debug, Default)]
pub struct ForwarderStats {
    /// Samples written to the socket.
    pub samples_sent: AtomicU64,
    /// Bytes written to the socket.
    pub bytes_sent: AtomicU64,
    /// Failed writes (sample lost, connection reset).
    pub write_errors: AtomicU64,
    /// Samples refused because the queue was full.
    pub samples_dropped: AtomicU64,
    /// Successful connects.
    pub connects: AtomicU64,
    /// Failed connect attempts.
    pub connect_failures: AtomicU64,
}

impl ForwarderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&self, bytes: usize) {
        self.samples_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub fn record_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats.
    pub fn snapshot(&self) -> ForwarderStatsSnapshot {
        ForwarderStatsSnapshot {
            samples_sent: self.samples_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            connects: self.connects.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`ForwarderStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwarderStatsSnapshot {
    pub samples_sent: u64,
    pub bytes_sent: u64,
    pub write_errors: u64,
    pub samples_dropped: u64,
    pub connects: u64,
    pub connect_failures: u64,
}
