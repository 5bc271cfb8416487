//! Inclusive address ranges and CIDR expansion.

use super::Address;
use crate::error::ScanError;
use ipnetwork::Ipv4Network;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::RangeInclusive;

/// An inclusive, non-empty range of IPv4 addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    start: Address,
    end: Address,
}

impl AddressRange {
    /// Create a new range. Fails if `start > end`.
    pub fn new(start: Address, end: Address) -> Result<Self, ScanError> {
        if start > end {
            Err(ScanError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            })
        } else {
            Ok(Self { start, end })
        }
    }

    /// A range containing exactly one host.
    pub const fn single(host: Address) -> Self {
        Self {
            start: host,
            end: host,
        }
    }

    /// Derive the range `subnet ..= subnet + 2^(32 - prefix) - 1`.
    ///
    /// The subnet address is used as given, it is not masked down to the
    /// network boundary. A block that would run past the top of the address
    /// space is rejected rather than wrapped.
    pub fn from_cidr(subnet: Address, prefix: u8) -> Result<Self, ScanError> {
        let network = Ipv4Network::new(subnet.to_ipv4(), prefix)
            .map_err(|_| ScanError::InvalidPrefixLength(prefix))?;

        let start = Address::from(network.ip());
        let host_count = 1u64 << (32 - u32::from(network.prefix()));
        let end = u64::from(start.to_u32()) + host_count - 1;
        let end = u32::try_from(end).map_err(|_| ScanError::RangeOverflow {
            subnet: subnet.to_string(),
            prefix,
        })?;

        Ok(Self {
            start,
            end: Address::from_u32(end),
        })
    }

    pub const fn start(&self) -> Address {
        self.start
    }

    pub const fn end(&self) -> Address {
        self.end
    }

    /// Number of addresses in the range. A full /0 holds 2^32, hence `u64`.
    pub const fn len(&self) -> u64 {
        self.end.to_u32() as u64 - self.start.to_u32() as u64 + 1
    }

    /// Never true for a constructed range.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Lazily iterate the range in increasing order.
    ///
    /// The range is `Copy`, so iteration can be restarted by calling this
    /// again.
    pub fn iter(&self) -> AddressIter {
        AddressIter {
            inner: self.start.to_u32()..=self.end.to_u32(),
        }
    }
}

impl IntoIterator for AddressRange {
    type Item = Address;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &AddressRange {
    type Item = Address;
    type IntoIter = AddressIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Iterator over the addresses of an [`AddressRange`].
///
/// Backed by an inclusive integer range so reaching `255.255.255.255`
/// terminates without wrapping.
#[derive(Debug, Clone)]
pub struct AddressIter {
    inner: RangeInclusive<u32>,
}

impl Iterator for AddressIter {
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(Address::from_u32)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl DoubleEndedIterator for AddressIter {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(Address::from_u32)
    }
}

impl FusedIterator for AddressIter {}
