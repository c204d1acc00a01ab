// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bridge lifecycle: listener, forwarder, stats reporting and shutdown.

use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::forwarder::{Forwarder, ForwarderStatsSnapshot};
use crate::server::{build_router, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::info;

/// Longest wait for in-flight requests during [`Bridge::shutdown`].
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A running bridge.
pub struct Bridge {
    forwarder: Forwarder,
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<std::io::Result<()>>,
    stats_task: Option<JoinHandle<()>>,
}

impl Bridge {
    /// Bind the HTTP listener, connect to Graphite and start serving.
    ///
    /// Does not return until the first Graphite connection succeeds; failed
    /// attempts are retried with the configured backoff.
    pub async fn start(config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen).await?;
        let local_addr = listener.local_addr()?;

        let forwarder = Forwarder::tcp(
            config.graphite.clone(),
            config.connect_timeout(),
            config.reconnect_backoff(),
            config.forwarder_options(),
        );
        info!("Graphite: {}", config.graphite);
        forwarder.wait_connected().await?;

        let state = Arc::new(AppState::new(
            forwarder.clone(),
            config.mapper(),
            config.legacy_status_codes,
        ));
        let app = build_router(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });
        info!("HTTP server: http://{}", local_addr);

        let stats_task = config
            .stats_interval()
            .map(|period| tokio::spawn(report_stats(forwarder.clone(), period)));

        Ok(Self {
            forwarder,
            local_addr,
            shutdown: shutdown_tx,
            server,
            stats_task,
        })
    }

    /// Address the HTTP server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    /// Stop accepting requests, let in-flight batches finish, then close the
    /// Graphite connection. Returns the final forwarder statistics.
    ///
    /// In-flight batches are only waited for while Graphite stays connected
    /// and for at most [`SHUTDOWN_GRACE`]; after that the forwarder is closed
    /// and their remaining samples are reported as errors.
    pub async fn shutdown(self) -> Result<ForwarderStatsSnapshot, BridgeError> {
        let Self {
            forwarder,
            shutdown,
            mut server,
            stats_task,
            ..
        } = self;

        if let Some(task) = stats_task {
            task.abort();
        }

        let _ = shutdown.send(());
        let drained = tokio::select! {
            served = &mut server => Some(served),
            _ = forwarder.wait_disconnected() => None,
            _ = tokio::time::sleep(SHUTDOWN_GRACE) => None,
        };

        forwarder.close().await;
        let served = match drained {
            Some(served) => served,
            None => {
                info!("forwarder closed with requests in flight");
                server.await
            }
        };

        let stats = forwarder.stats();
        log_stats(&stats);

        served.map_err(|e| BridgeError::Server(e.to_string()))??;
        Ok(stats)
    }
}

async fn report_stats(forwarder: Forwarder, period: Duration) {
    let mut interval = tokio::time::interval(period);
    // The first tick completes immediately.
    interval.tick().await;
    loop {
        interval.tick().await;
        log_stats(&forwarder.stats());
    }
}

fn log_stats(stats: &ForwarderStatsSnapshot) {
    info!(
        sent = stats.samples_sent,
        bytes = stats.bytes_sent,
        write_errors = stats.write_errors,
        dropped = stats.samples_dropped,
        connects = stats.connects,
        connect_failures = stats.connect_failures,
        "forwarder stats"
    );
}
