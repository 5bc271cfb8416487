//! TCP connect probe.
//!
//! Completes a full TCP handshake using the operating system's socket API.
//! Needs no privileges. The stream is dropped as soon as the handshake
//! finishes, so the socket is released whatever the outcome.

use crate::scanner::traits::{PortProbe, PortStatus};
use crate::types::Address;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Probes ports with a plain `connect()` bounded by a timeout.
#[derive(Debug, Clone)]
pub struct TcpConnectProbe {
    timeout: Duration,
}

impl TcpConnectProbe {
    /// Create a probe with the given per-attempt timeout.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl PortProbe for TcpConnectProbe {
    async fn probe(&self, host: Address, port: u16) -> PortStatus {
        let addr = SocketAddr::new(host.to_ipv4().into(), port);

        match timeout(self.timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                PortStatus::Open
            }
            Ok(Err(e)) => {
                trace!(%host, port, error = %e, "connect failed");
                PortStatus::Closed
            }
            Err(_) => {
                trace!(%host, port, "connect timed out");
                PortStatus::Closed
            }
        }
    }
}
