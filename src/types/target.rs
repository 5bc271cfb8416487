//! Target specification: the scan shape chosen on the command line.
//!
//! Every variant normalizes to a single [`AddressRange`], which is all the
//! scanner ever consumes:
//! - This machine's own primary IPv4 address
//! - A single host (10.0.0.1)
//! - An explicit inclusive range (10.0.0.1 - 10.0.0.50)
//! - A CIDR subnet (10.0.0.0/24)

use super::{Address, AddressRange};
use crate::error::ScanError;
use ipnetwork::{IpNetworkError, Ipv4Network};
use std::fmt;
use std::net::{IpAddr, UdpSocket};

/// Remote address used to pick the outbound interface. Connecting a UDP
/// socket sends nothing.
const ROUTE_PROBE_ADDR: &str = "192.0.2.1:9";

/// What to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSpec {
    /// The local machine's primary IPv4 address.
    Local,
    /// A single host.
    Single(Address),
    /// An inclusive address range.
    Range { start: Address, end: Address },
    /// A subnet given as base address and prefix length.
    Subnet { subnet: Address, prefix: u8 },
}

impl TargetSpec {
    /// Parse a subnet written as `a.b.c.d/n`.
    ///
    /// The base address is kept exactly as written, host bits included.
    pub fn parse_cidr(s: &str) -> Result<Self, ScanError> {
        let s = s.trim();
        let (_, prefix_text) = s
            .split_once('/')
            .ok_or_else(|| ScanError::InvalidAddressFormat(s.to_string()))?;

        let network: Ipv4Network = s.parse().map_err(|e| match e {
            IpNetworkError::InvalidPrefix => match prefix_text.trim().parse::<u8>() {
                Ok(prefix) => ScanError::InvalidPrefixLength(prefix),
                Err(_) => ScanError::InvalidAddressFormat(s.to_string()),
            },
            _ => ScanError::InvalidAddressFormat(s.to_string()),
        })?;

        Ok(Self::Subnet {
            subnet: network.ip().into(),
            prefix: network.prefix(),
        })
    }

    /// Normalize this target into the address range to scan.
    ///
    /// All input validation happens here, before any probe is sent.
    pub fn resolve(&self) -> Result<AddressRange, ScanError> {
        match *self {
            Self::Local => local_address().map(AddressRange::single),
            Self::Single(host) => Ok(AddressRange::single(host)),
            Self::Range { start, end } => AddressRange::new(start, end),
            Self::Subnet { subnet, prefix } => AddressRange::from_cidr(subnet, prefix),
        }
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "this device"),
            Self::Single(host) => write!(f, "{}", host),
            Self::Range { start, end } => write!(f, "{} - {}", start, end),
            Self::Subnet { subnet, prefix } => write!(f, "{}/{}", subnet, prefix),
        }
    }
}

/// Discover the IPv4 address of the interface that routes outbound traffic.
pub fn local_address() -> Result<Address, ScanError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket
        .connect(ROUTE_PROBE_ADDR)
        .map_err(|e| ScanError::LocalAddress(e.to_string()))?;

    match socket.local_addr()?.ip() {
        IpAddr::V4(v4) if !v4.is_unspecified() => Ok(v4.into()),
        other => Err(ScanError::LocalAddress(format!(
            "no usable IPv4 address (got {})",
            other
        ))),
    }
}
