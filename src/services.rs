//! Well-known port registry and port selection.
//!
//! The registry is built once from a fixed table and is read-only after
//! that. It drives both the reduced "common ports" sweep and the service
//! names shown next to open ports.

use crate::scanner::ScanConfig;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Well-known TCP ports and their display names.
const WELL_KNOWN_PORTS: &[(u16, &str)] = &[
    (20, "FTP-data"),
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (67, "DHCP (server)"),
    (68, "DHCP (client)"),
    (69, "TFTP"),
    (80, "HTTP"),
    (88, "Kerberos"),
    (110, "POP3"),
    (111, "rpcbind / portmapper"),
    (123, "NTP"),
    (135, "MS RPC / DCOM"),
    (137, "NetBIOS Name"),
    (138, "NetBIOS Datagram"),
    (139, "NetBIOS Session / SMB (older)"),
    (143, "IMAP"),
    (161, "SNMP"),
    (162, "SNMP trap"),
    (179, "BGP"),
    (389, "LDAP"),
    (443, "HTTPS"),
    (445, "SMB / Microsoft-DS"),
    (465, "SMTPS (deprecated)"),
    (512, "rexec"),
    (513, "rlogin"),
    (514, "syslog / rsh"),
    (515, "LPD / printer"),
    (548, "AFP (Apple Filing Protocol)"),
    (631, "IPP (printing)"),
    (636, "LDAPS"),
    (993, "IMAPS"),
    (995, "POP3S"),
    (1080, "SOCKS (proxy)"),
    (1194, "OpenVPN"),
    (1433, "MSSQL"),
    (1434, "MSSQL (UDP)"),
    (1521, "Oracle DB (listener)"),
    (1723, "PPTP"),
    (2049, "NFS"),
    (2082, "cPanel (HTTP)"),
    (2083, "cPanel (HTTPS)"),
    (2375, "Docker API (unsecured)"),
    (2376, "Docker API (TLS)"),
    (27017, "MongoDB"),
    (3000, "Dev servers / web apps"),
    (3306, "MySQL / MariaDB"),
    (3389, "RDP (Windows Remote Desktop)"),
    (37017, "Example DB abuse port (seen in the wild)"),
    (5000, "Dev / UPnP / admin UIs"),
    (5060, "SIP (VoIP)"),
    (5061, "SIP TLS"),
    (5432, "PostgreSQL"),
    (5560, "App-specific (often seen in networks)"),
    (5900, "VNC"),
    (6379, "Redis"),
    (8000, "Alternate HTTP / admin"),
    (8006, "Proxmox VE web GUI"),
    (8008, "Alternate HTTP"),
    (8080, "Alternate HTTP / proxy"),
    (8443, "HTTPS-alt / admin"),
    (9000, "Dev/admin (e.g. php-fpm, dev UIs)"),
    (9200, "Elasticsearch HTTP"),
    (9300, "Elasticsearch clustering"),
    (11211, "memcached"),
];

static REGISTRY: LazyLock<PortRegistry> =
    LazyLock::new(|| PortRegistry::from_entries(WELL_KNOWN_PORTS));

/// Immutable mapping from port number to service name.
#[derive(Debug, Clone, Default)]
pub struct PortRegistry {
    entries: BTreeMap<u16, &'static str>,
}

impl PortRegistry {
    /// The process-wide registry built from the well-known port table.
    pub fn global() -> &'static PortRegistry {
        &REGISTRY
    }

    /// Build a registry from a literal table. Later duplicates win.
    pub fn from_entries(entries: &[(u16, &'static str)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// Look up the display name for a port.
    ///
    /// Returns `None` for unregistered ports, which is not an error.
    pub fn service_name(&self, port: u16) -> Option<&'static str> {
        self.entries.get(&port).copied()
    }

    /// Registered ports in ascending order.
    pub fn ports(&self) -> impl Iterator<Item = u16> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Select the ports to probe on every host.
///
/// The full port space `0..=65535` when `scan_all_ports` is set, otherwise
/// exactly the registry's keys. Either way ascending and duplicate-free.
pub fn select_ports(config: &ScanConfig, registry: &PortRegistry) -> Vec<u16> {
    if config.scan_all_ports {
        (0..=u16::MAX).collect()
    } else {
        registry.ports().collect()
    }
}
