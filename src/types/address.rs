//! IPv4 address newtype with a checked dotted-quad codec.
//!
//! An `Address` is a host-order `u32`. Its textual form is the canonical
//! dotted quad, and the two encodings round-trip exactly.

use crate::error::ScanError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A validated IPv4 host address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u32);

impl Address {
    /// Build an address from its host-order integer form.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }

    /// Big-endian packing of the four octets.
    #[inline]
    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// The four octets, most significant first.
    #[inline]
    pub const fn octets(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Build an address from raw octet values.
    ///
    /// Fails unless exactly four values are given and each fits in `0..=255`.
    pub fn from_octets(octets: &[u32]) -> Result<Self, ScanError> {
        let invalid = || {
            let text: Vec<String> = octets.iter().map(|o| o.to_string()).collect();
            ScanError::InvalidAddressFormat(text.join("."))
        };

        if octets.len() != 4 {
            return Err(invalid());
        }

        let mut packed = 0u32;
        for &octet in octets {
            let octet = u8::try_from(octet).map_err(|_| invalid())?;
            packed = (packed << 8) | u32::from(octet);
        }
        Ok(Self(packed))
    }

    /// The equivalent standard library address, for socket APIs.
    #[inline]
    pub const fn to_ipv4(self) -> Ipv4Addr {
        Ipv4Addr::from_bits(self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}", a, b, c, d)
    }
}

impl FromStr for Address {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        s.parse::<Ipv4Addr>()
            .map(Self::from)
            .map_err(|_| ScanError::InvalidAddressFormat(s.to_string()))
    }
}

impl From<Ipv4Addr> for Address {
    fn from(ip: Ipv4Addr) -> Self {
        Self(ip.to_bits())
    }
}

impl From<Address> for Ipv4Addr {
    fn from(addr: Address) -> Self {
        addr.to_ipv4()
    }
}

impl From<u32> for Address {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<Address> for u32 {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
