//! Plain text output formatting.
//!
//! Host blocks are written without styling so they stay clean when piped.
//! The surrounding status messages go to the terminal with colors.

use crate::scanner::{HostScanResult, ScanConfig};
use crate::services::PortRegistry;
use console::style;
use std::io::{self, Write};
use std::time::Duration;

/// Format one host's open ports.
pub(super) fn render_host(
    out: &mut impl Write,
    result: &HostScanResult,
    registry: &PortRegistry,
) -> io::Result<()> {
    if !result.has_open_ports() {
        return writeln!(out, "\nNo open ports on {}", result.host);
    }

    writeln!(out, "\nOpen ports on {}:", result.host)?;
    for &port in &result.open_ports {
        match registry.service_name(port) {
            Some(name) => writeln!(out, "\t{}\t{}", port, name)?,
            None => writeln!(out, "\t{}", port)?,
        }
    }
    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, hosts: u64, ports: usize, config: &ScanConfig) {
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("netsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {} ({} host{})",
        style("•").dim(),
        style(target).white().bold(),
        hosts,
        if hosts == 1 { "" } else { "s" }
    );
    println!(
        "{} Scanning {} ports per host with up to {} concurrent probes",
        style("•").dim(),
        style(ports).white().bold(),
        config.max_concurrency
    );
    if config.ping_prohibited {
        println!(
            "{} Liveness check disabled, every host is swept",
            style("•").dim()
        );
    }
}

/// Report the total elapsed time. Goes to stderr when stdout carries
/// machine-readable output.
pub fn print_completed(elapsed: Duration, to_stderr: bool) {
    let line = format!(
        "{} Scanning completed in {:.2?}",
        style("✓").green().bold(),
        elapsed
    );
    if to_stderr {
        eprintln!("{}", line);
    } else {
        println!("\n{}", line);
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}
