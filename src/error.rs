//! Error types for netsweep.
//!
//! Uses `thiserror` for ergonomic error definitions. Only input and
//! configuration problems surface as errors; probe failures never do, they
//! collapse into "closed" or "unreachable".

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while validating scan input.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid IPv4 address: '{0}'")]
    InvalidAddressFormat(String),

    #[error("invalid CIDR prefix length {0} (expected 0-32)")]
    InvalidPrefixLength(u8),

    #[error("invalid address range: start {start} is greater than end {end}")]
    InvalidRange { start: String, end: String },

    #[error("subnet {subnet}/{prefix} extends past 255.255.255.255")]
    RangeOverflow { subnet: String, prefix: u8 },

    #[error("concurrency limit must be greater than zero (got {0})")]
    InvalidConcurrency(usize),

    #[error("could not determine local IPv4 address: {0}")]
    LocalAddress(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors related to configuration management.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine configuration directory")]
    DirectoryNotFound,

    #[error("failed to read config file '{path}': {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write config file '{path}': {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid settings format: {0}")]
    InvalidFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error type for command handlers.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for command handlers.
pub type CliResult<T> = Result<T, CliError>;
