//! CLI subcommand definitions.
//!
//! Each subcommand selects a scan shape:
//! - `netsweep this` - Scan this machine's own address
//! - `netsweep device <IP>` - Scan a single host
//! - `netsweep range <START> <END>` - Scan an inclusive address range
//! - `netsweep subnet <IP> <PREFIX>` - Scan a CIDR subnet
//!
//! The chosen command is resolved once into a [`TargetSpec`]; the scanner
//! never sees the command itself.

mod scan;

pub use scan::ScanOptions;

use crate::error::{CliResult, ScanError};
use crate::types::{Address, TargetSpec};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// netsweep - discover open TCP ports on hosts, ranges and subnets.
///
/// By default only well-known ports are probed and hosts that do not answer
/// an ICMP echo request are skipped.
#[derive(Parser, Debug)]
#[command(name = "netsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress the scan header
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file (defaults to the XDG config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan this device's own IPv4 address
    This {
        #[command(flatten)]
        options: ScanOptions,
    },

    /// Scan a single host
    #[command(alias = "d")]
    Device {
        /// Host to scan
        #[arg(value_name = "IP")]
        host: Address,

        #[command(flatten)]
        options: ScanOptions,
    },

    /// Scan every host in an inclusive address range
    #[command(alias = "r")]
    Range {
        /// First address of the range
        #[arg(value_name = "START_IP")]
        start: Address,

        /// Last address of the range
        #[arg(value_name = "END_IP")]
        end: Address,

        #[command(flatten)]
        options: ScanOptions,
    },

    /// Scan every host in a CIDR subnet
    ///
    /// Accepts either `subnet 10.0.0.0 24` or `subnet 10.0.0.0/24`.
    #[command(alias = "s")]
    Subnet {
        /// Subnet base address, optionally with a /PREFIX suffix
        #[arg(value_name = "IP")]
        subnet: String,

        /// Prefix length (0-32)
        #[arg(value_name = "PREFIX")]
        prefix: Option<u8>,

        #[command(flatten)]
        options: ScanOptions,
    },
}

impl Commands {
    /// Resolve the command into a target specification.
    pub fn target(&self) -> Result<TargetSpec, ScanError> {
        match self {
            Self::This { .. } => Ok(TargetSpec::Local),
            Self::Device { host, .. } => Ok(TargetSpec::Single(*host)),
            Self::Range { start, end, .. } => Ok(TargetSpec::Range {
                start: *start,
                end: *end,
            }),
            Self::Subnet { subnet, prefix, .. } => match prefix {
                Some(prefix) => Ok(TargetSpec::Subnet {
                    subnet: subnet.parse()?,
                    prefix: *prefix,
                }),
                None => TargetSpec::parse_cidr(subnet),
            },
        }
    }

    pub fn options(&self) -> &ScanOptions {
        match self {
            Self::This { options }
            | Self::Device { options, .. }
            | Self::Range { options, .. }
            | Self::Subnet { options, .. } => options,
        }
    }
}

impl Cli {
    /// Execute the selected command.
    pub async fn execute(&self) -> CliResult<()> {
        let target = self.command.target()?;
        self.command
            .options()
            .execute(target, self.config.as_deref(), self.quiet)
            .await
    }
}

/// Output format for results.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// One JSON object per host
    Json,
    /// CSV rows of host, port, service
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}
