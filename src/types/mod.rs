//! Core type definitions using newtype patterns for type safety.
//!
//! These types make invalid addresses and reversed ranges unrepresentable
//! once constructed.

mod address;
mod range;
mod target;

pub use address::Address;
pub use range::{AddressIter, AddressRange};
pub use target::{local_address, TargetSpec};
