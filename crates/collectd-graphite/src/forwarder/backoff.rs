// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reconnect delay policies.

use std::time::Duration;

/// Default delay between reconnect attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(10);

/// Decides how long to wait before the next connect attempt.
pub trait Backoff: Send + 'static {
    /// Delay to apply after a failed attempt.
    fn next_delay(&mut self) -> Duration;

    /// Called once a connection has been established.
    fn reset(&mut self) {}
}

/// Same delay after every failure, retried forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff {
    delay: Duration,
}

impl FixedBackoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for FixedBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_RECONNECT_DELAY)
    }
}

impl Backoff for FixedBackoff {
    fn next_delay(&mut self) -> Duration {
        self.delay
    }
}
