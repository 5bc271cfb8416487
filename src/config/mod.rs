//! Configuration management for netsweep.
//!
//! Provides XDG-compliant storage for persisted scan defaults.

mod settings;

pub use settings::{AppSettings, Paths};
