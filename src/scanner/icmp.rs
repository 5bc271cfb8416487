//! ICMP echo liveness check.
//!
//! Uses `surge-ping`. On most systems sending echo requests needs either
//! root or an unprivileged ICMP socket allowed by the kernel; when neither
//! is available every host reads as unreachable, and a single warning
//! suggests `--no-ping`.

use crate::scanner::traits::ReachabilityProbe;
use crate::types::Address;
use async_trait::async_trait;
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use surge_ping::SurgeError;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Echo payload size, matching the classic `ping` default.
const PAYLOAD_SIZE: usize = 56;

/// Reachability probe that sends a single ICMP echo request.
#[derive(Debug)]
pub struct IcmpProbe {
    timeout: Duration,
    privilege_warned: AtomicBool,
}

impl IcmpProbe {
    /// Create a probe that waits at most `timeout` for the echo reply.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            privilege_warned: AtomicBool::new(false),
        }
    }

    fn warn_privileges_once(&self) {
        if self
            .privilege_warned
            .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            warn!(
                "ICMP echo is not permitted; every host will look unreachable. \
                 Run with elevated privileges or pass --no-ping"
            );
        }
    }
}

#[async_trait]
impl ReachabilityProbe for IcmpProbe {
    async fn is_reachable(&self, host: Address) -> bool {
        let target = IpAddr::V4(host.to_ipv4());
        let payload = [0u8; PAYLOAD_SIZE];

        match timeout(self.timeout, surge_ping::ping(target, &payload)).await {
            Ok(Ok((_packet, rtt))) => {
                debug!(%host, ?rtt, "host answered echo request");
                true
            }
            Ok(Err(SurgeError::IOError(e))) if e.kind() == io::ErrorKind::PermissionDenied => {
                self.warn_privileges_once();
                false
            }
            Ok(Err(e)) => {
                debug!(%host, error = %e, "echo request failed");
                false
            }
            Err(_) => {
                debug!(%host, "echo request timed out");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_latches_once() {
        let probe = IcmpProbe::new(Duration::from_millis(10));
        probe.warn_privileges_once();
        assert!(probe.privilege_warned.load(Ordering::Relaxed));
        probe.warn_privileges_once();
        assert!(probe.privilege_warned.load(Ordering::Relaxed));
    }

    #[tokio::test]
    async fn test_unroutable_host_is_not_reachable() {
        // TEST-NET-1 is reserved and never answers; the result is false
        // whether or not ICMP sockets are permitted here.
        let probe = IcmpProbe::new(Duration::from_millis(200));
        let host: Address = "192.0.2.123".parse().unwrap();
        assert!(!probe.is_reachable(host).await);
    }
}
