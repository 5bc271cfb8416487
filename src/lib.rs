//! # netsweep - A Concurrent TCP Port Scanner
//!
//! netsweep discovers which TCP ports are open on a single host, an
//! explicit address range, or a CIDR subnet, by attempting a plain
//! connection to each candidate port.
//!
//! ## Features
//!
//! - **Flexible Targeting**: this device, single IPs, inclusive ranges, and CIDR subnets
//! - **Liveness Gating**: ICMP echo skips dead hosts before the port sweep (can be disabled)
//! - **Bounded Concurrency**: probe and host fan-out are limited independently
//! - **Deterministic Output**: ports ascending per host, one uninterrupted block per host
//! - **Multiple Output Formats**: Plain text, JSON lines, and CSV
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use netsweep::scanner::{ScanConfig, Scanner};
//! use netsweep::services::PortRegistry;
//! use netsweep::types::AddressRange;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ScanConfig::new(false, true, 256).unwrap();
//!     let scanner = Scanner::new(config, PortRegistry::global());
//!
//!     let range = AddressRange::from_cidr("192.168.1.0".parse().unwrap(), 24).unwrap();
//!     for host in scanner.scan_range(range).await {
//!         println!("{}: {:?}", host.host, host.open_ports);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Addresses, ranges, and target specifications
//! - [`services`] - Well-known port registry and port selection
//! - [`scanner`] - Probes and the scan coordinator
//! - [`output`] - Per-host result rendering
//! - [`config`] - Persisted settings
//! - [`cli`] - Command-line definitions
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError};
pub use scanner::{HostScanResult, PortStatus, ScanConfig, ScanSummary, Scanner};
pub use services::PortRegistry;
pub use types::{Address, AddressRange, TargetSpec};
