//! Probe trait abstractions.
//!
//! The coordinator only talks to these traits, so the network-facing
//! implementations can be swapped for instrumented stubs in tests.

use crate::types::Address;
use async_trait::async_trait;

/// Outcome of a single connection attempt.
///
/// Refusal, timeout and unreachability all mean `Closed`; no failure reason
/// is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortStatus {
    /// A connection was established.
    Open,
    /// The connection attempt failed for any reason.
    Closed,
}

/// Attempts a bounded-time connection to one (host, port) pair.
#[async_trait]
pub trait PortProbe: Send + Sync {
    /// Probe a single port. Must never fail, only classify.
    async fn probe(&self, host: Address, port: u16) -> PortStatus;
}

/// Cheap liveness check used to skip dead hosts before a full sweep.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Best effort: any failure, including missing privileges, is `false`.
    async fn is_reachable(&self, host: Address) -> bool;
}

