//! JSON lines output: one object per swept host.

use crate::scanner::HostScanResult;
use crate::services::PortRegistry;
use crate::types::Address;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct HostRecord {
    host: Address,
    open_ports: Vec<OpenPort>,
}

#[derive(Serialize)]
struct OpenPort {
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<&'static str>,
}

pub(super) fn render_host(
    out: &mut impl Write,
    result: &HostScanResult,
    registry: &PortRegistry,
) -> io::Result<()> {
    let record = HostRecord {
        host: result.host,
        open_ports: result
            .open_ports
            .iter()
            .map(|&port| OpenPort {
                port,
                service: registry.service_name(port),
            })
            .collect(),
    };

    serde_json::to_writer(&mut *out, &record).map_err(io::Error::other)?;
    writeln!(out)
}
