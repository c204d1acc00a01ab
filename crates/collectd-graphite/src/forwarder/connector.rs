// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Outbound connection establishment.

use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::net::TcpStream;

/// Default per-attempt connect timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Opens the stream the forwarder writes to.
pub trait Connector: Send + Sync + 'static {
    type Stream: AsyncWrite + Unpin + Send + 'static;

    /// Make one connection attempt.
    fn connect(&self) -> impl Future<Output = io::Result<Self::Stream>> + Send;

    /// Human-readable destination, for logs.
    fn endpoint(&self) -> &str;
}

/// Plain TCP to a Graphite line receiver.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    endpoint: String,
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    fn connect(&self) -> impl Future<Output = io::Result<TcpStream>> + Send {
        let endpoint = self.endpoint.clone();
        let timeout = self.timeout;
        async move {
            let stream = tokio::time::timeout(timeout, TcpStream::connect(endpoint.as_str()))
                .await
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect to {} timed out after {:?}", endpoint, timeout),
                    )
                })??;
            stream.set_nodelay(true)?;
            Ok::<_, io::Error>(stream)
        }
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
