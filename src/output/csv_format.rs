//! CSV output formatting.

use crate::scanner::HostScanResult;
use crate::services::PortRegistry;
use std::io::{self, Write};

pub(super) fn write_header(out: &mut impl Write) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["host", "port", "service"])?;
    wtr.flush()
}

/// One row per open port. Hosts without open ports produce no rows.
pub(super) fn render_host(
    out: &mut impl Write,
    result: &HostScanResult,
    registry: &PortRegistry,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    let host = result.host.to_string();
    for &port in &result.open_ports {
        wtr.write_record([
            host.as_str(),
            port.to_string().as_str(),
            registry.service_name(port).unwrap_or(""),
        ])?;
    }

    wtr.flush()
}
