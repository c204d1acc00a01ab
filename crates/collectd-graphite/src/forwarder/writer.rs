// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! The writer task: sole owner of the outbound stream.

use super::backoff::Backoff;
use super::connector::Connector;
use super::stats::ForwarderStats;
use super::{ChannelState, Command, ForwardError};
use crate::line::Sample;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

pub(super) struct Writer<C: Connector, B: Backoff> {
    pub(super) connector: C,
    pub(super) backoff: B,
    pub(super) commands: mpsc::Receiver<Command>,
    pub(super) state: watch::Sender<ChannelState>,
    pub(super) shutdown: watch::Receiver<bool>,
    pub(super) stats: Arc<ForwarderStats>,
    pub(super) write_timeout: Option<Duration>,
    pub(super) stream: Option<C::Stream>,
}

impl<C: Connector, B: Backoff> Writer<C, B> {
    pub(super) async fn run(mut self) {
        loop {
            if self.stream.is_none() && !self.connect().await {
                break;
            }

            let command = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                command = self.commands.recv() => match command {
                    Some(command) => command,
                    None => break,
                },
            };

            match command {
                Command::Enqueue(sample) => {
                    // Failure is already counted and logged.
                    let _ = self.write(&sample).await;
                }
                Command::Direct { sample, reply } => {
                    let result = self.write(&sample).await;
                    let _ = reply.send(result);
                }
            }
        }

        self.finish().await;
    }

    /// Dial until connected. Returns `false` if shutdown was requested first.
    async fn connect(&mut self) -> bool {
        let mut attempt: u64 = 0;
        loop {
            if *self.shutdown.borrow() {
                return false;
            }
            attempt += 1;

            let result = tokio::select! {
                biased;
                _ = self.shutdown.changed() => return false,
                result = self.connector.connect() => result,
            };

            match result {
                Ok(stream) => {
                    info!(
                        endpoint = self.connector.endpoint(),
                        attempt, "connected to graphite"
                    );
                    self.stream = Some(stream);
                    self.backoff.reset();
                    self.stats.record_connect();
                    self.state.send_replace(ChannelState::Connected);
                    return true;
                }
                Err(e) => {
                    self.stats.record_connect_failure();
                    let delay = self.backoff.next_delay();
                    warn!(
                        endpoint = self.connector.endpoint(),
                        attempt,
                        error = %e,
                        retry_in_ms = delay.as_millis() as u64,
                        "graphite connect failed"
                    );
                    tokio::select! {
                        biased;
                        _ = self.shutdown.changed() => return false,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Encode and write one sample. A failed write drops the sample and the
    /// connection; the next loop iteration reconnects.
    async fn write(&mut self, sample: &Sample) -> Result<(), ForwardError> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(ForwardError::Write(io::ErrorKind::NotConnected.into()));
        };

        let line = sample.to_line();
        let result = match self.write_timeout {
            Some(limit) => {
                match tokio::time::timeout(limit, stream.write_all(line.as_bytes())).await {
                    Ok(written) => written.map_err(ForwardError::from),
                    Err(_) => Err(ForwardError::WriteTimeout(limit)),
                }
            }
            None => stream
                .write_all(line.as_bytes())
                .await
                .map_err(ForwardError::from),
        };

        match result {
            Ok(()) => {
                debug!(metric = %sample.name, "sample written");
                self.stats.record_sent(line.len());
                Ok(())
            }
            Err(e) => {
                warn!(
                    metric = %sample.name,
                    error = %e,
                    "graphite write failed, dropping sample and reconnecting"
                );
                self.stats.record_write_error();
                self.stream = None;
                self.state.send_replace(ChannelState::Disconnected);
                Err(e)
            }
        }
    }

    async fn finish(mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "error closing graphite connection");
            }
        }
        // Pending direct writes see their reply channel dropped.
        self.commands.close();
        self.state.send_replace(ChannelState::Closed);
        info!(endpoint = self.connector.endpoint(), "forwarder stopped");
    }
}
