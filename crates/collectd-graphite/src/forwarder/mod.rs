// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Forwarding channel to Graphite.
//!
//! A single writer task owns the outbound connection. Producers talk to it
//! through a cloneable [`Forwarder`] handle over a bounded queue, so lines
//! from concurrent requests are never interleaved and the stream needs no
//! lock.
//!
//! # Connection lifecycle
//!
//! ```text
//!            connect ok                 write error
//! Disconnected ---------> Connected ------------------> Disconnected
//!     ^    |                                                 |
//!     |    | connect failed: sleep backoff                   |
//!     +----+                                                 |
//!                         close()                            |
//! any state -------------------------------> Closed  <-------+
//! ```
//!
//! While disconnected nothing is written: the writer keeps dialing and the
//! queue fills up behind it.

mod backoff;
mod connector;
mod stats;
mod writer;

pub use backoff::{Backoff, FixedBackoff, DEFAULT_RECONNECT_DELAY};
pub use connector::{Connector, TcpConnector, DEFAULT_CONNECT_TIMEOUT};
pub use stats::{ForwarderStats, ForwarderStatsSnapshot};

use crate::line::Sample;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use writer::Writer;

/// Default capacity of the pending-sample queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 10_000;

/// Forwarding errors.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("write to graphite failed: {0}")]
    Write(#[from] io::Error),

    #[error("write to graphite timed out after {0:?}")]
    WriteTimeout(Duration),

    #[error("forwarding queue is full")]
    QueueFull,

    #[error("forwarder is closed")]
    Closed,
}

/// Connection state as seen from outside the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Disconnected,
    Connected,
    Closed,
}

/// Tuning knobs for [`Forwarder::spawn`].
#[derive(Debug, Clone)]
pub struct ForwarderOptions {
    /// Capacity of the pending queue (must be non-zero).
    pub queue_capacity: usize,
    /// Deadline for a single write, `None` to wait forever.
    pub write_timeout: Option<Duration>,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            write_timeout: None,
        }
    }
}

pub(crate) enum Command {
    Enqueue(Sample),
    Direct {
        sample: Sample,
        reply: oneshot::Sender<Result<(), ForwardError>>,
    },
}

/// Handle to the forwarding channel.
///
/// Cloning is cheap; every clone feeds the same writer. The writer stops on
/// [`Forwarder::close`] or once every handle is dropped.
#[derive(Clone)]
pub struct Forwarder {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<ChannelState>,
    shutdown: Arc<watch::Sender<bool>>,
    stats: Arc<ForwarderStats>,
}

impl Forwarder {
    /// Spawn the writer task on the current tokio runtime.
    ///
    /// The first connect attempt starts immediately.
    pub fn spawn<C, B>(connector: C, backoff: B, options: ForwarderOptions) -> Self
    where
        C: Connector,
        B: Backoff,
    {
        let (commands_tx, commands_rx) = mpsc::channel(options.queue_capacity.max(1));
        let (state_tx, state_rx) = watch::channel(ChannelState::Disconnected);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = Arc::new(ForwarderStats::new());

        let writer = Writer {
            connector,
            backoff,
            commands: commands_rx,
            state: state_tx,
            shutdown: shutdown_rx,
            stats: stats.clone(),
            write_timeout: options.write_timeout,
            stream: None,
        };
        tokio::spawn(writer.run());

        Self {
            commands: commands_tx,
            state: state_rx,
            shutdown: Arc::new(shutdown_tx),
            stats,
        }
    }

    /// Forwarder over plain TCP with a fixed reconnect delay.
    pub fn tcp(
        endpoint: impl Into<String>,
        connect_timeout: Duration,
        reconnect_delay: Duration,
        options: ForwarderOptions,
    ) -> Self {
        Self::spawn(
            TcpConnector::new(endpoint, connect_timeout),
            FixedBackoff::new(reconnect_delay),
            options,
        )
    }

    /// Queue a sample without waiting for it to be written.
    ///
    /// Fails with [`ForwardError::QueueFull`] when the queue is at capacity;
    /// the sample is dropped and counted.
    pub fn enqueue(&self, sample: Sample) -> Result<(), ForwardError> {
        match self.commands.try_send(Command::Enqueue(sample)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                self.stats.record_dropped();
                Err(ForwardError::QueueFull)
            }
            Err(TrySendError::Closed(_)) => Err(ForwardError::Closed),
        }
    }

    /// Write a sample and wait for the outcome.
    ///
    /// Waits for queue space, for a connection if there is none, and for the
    /// write itself.
    pub async fn write_direct(&self, sample: Sample) -> Result<(), ForwardError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Direct { sample, reply })
            .await
            .map_err(|_| ForwardError::Closed)?;
        outcome.await.map_err(|_| ForwardError::Closed)?
    }

    /// Current connection state.
    pub fn state(&self) -> ChannelState {
        *self.state.borrow()
    }

    /// Wait until the writer is connected.
    ///
    /// Returns [`ForwardError::Closed`] if the forwarder closes first.
    pub async fn wait_connected(&self) -> Result<(), ForwardError> {
        let mut state = self.state.clone();
        let connected = matches!(
            state
                .wait_for(|s| *s != ChannelState::Disconnected)
                .await
                .as_deref(),
            Ok(ChannelState::Connected)
        );
        if connected {
            Ok(())
        } else {
            Err(ForwardError::Closed)
        }
    }

    /// Wait until the writer has no connection, either because it is
    /// redialing or because it has closed.
    pub async fn wait_disconnected(&self) {
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s != ChannelState::Connected).await;
    }

    /// Stop the writer and close the connection.
    ///
    /// Queued samples not yet written are discarded and pending direct
    /// writes fail with [`ForwardError::Closed`]. Resolves once the writer
    /// has exited.
    pub async fn close(&self) {
        let _ = self.shutdown.send(true);
        let mut state = self.state.clone();
        let _ = state.wait_for(|s| *s == ChannelState::Closed).await;
    }

    /// Snapshot of the forwarder counters.
    pub fn stats(&self) -> ForwarderStatsSnapshot {
        self.stats.snapshot()
    }
}
