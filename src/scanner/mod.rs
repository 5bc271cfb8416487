//! Scanner module - coordinates liveness checks and port probes.
//!
//! Host fan-out and port fan-out are bounded independently. Each host task
//! holds a slot from a host semaphore for its whole lifetime, while port
//! probes each hold a permit from a separate probe semaphore only for the
//! duration of one connection attempt. A host task waiting on its probes
//! therefore never holds a probe permit, so no amount of host concurrency
//! can starve the probes it is waiting for.

pub mod icmp;
pub mod tcp;
pub mod traits;

use crate::error::{ScanError, ScanResult};
use crate::output::Reporter;
use crate::services::{select_ports, PortRegistry};
use crate::types::{Address, AddressRange};
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

pub use icmp::IcmpProbe;
pub use tcp::TcpConnectProbe;
pub use traits::{PortProbe, PortStatus, ReachabilityProbe};

/// How long to wait for an echo reply before calling a host dead.
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_millis(1000);
/// How long a single connection attempt may take.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(3000);
/// Default number of probes in flight at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 512;
/// Default number of hosts swept at once.
pub const DEFAULT_MAX_HOSTS_IN_FLIGHT: usize = 256;

/// Immutable scan configuration, validated once and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Probe every port `0..=65535` instead of the well-known set.
    pub scan_all_ports: bool,
    /// Skip the liveness check and treat every host as reachable.
    pub ping_prohibited: bool,
    /// Upper bound on simultaneously running probes.
    pub max_concurrency: usize,
    /// Liveness check timeout.
    pub ping_timeout: Duration,
    /// Per-port connection timeout.
    pub connect_timeout: Duration,
    /// Upper bound on hosts being swept at once.
    pub max_hosts_in_flight: usize,
}

impl ScanConfig {
    /// Create a new scan configuration. Fails if `max_concurrency` is zero.
    pub fn new(
        scan_all_ports: bool,
        ping_prohibited: bool,
        max_concurrency: usize,
    ) -> ScanResult<Self> {
        if max_concurrency == 0 {
            return Err(ScanError::InvalidConcurrency(max_concurrency));
        }

        Ok(Self {
            scan_all_ports,
            ping_prohibited,
            max_concurrency,
            ping_timeout: DEFAULT_PING_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_hosts_in_flight: DEFAULT_MAX_HOSTS_IN_FLIGHT,
        })
    }

    /// Set the liveness check timeout.
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Set the per-port connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set how many hosts may be swept at once (at least one).
    pub fn with_max_hosts_in_flight(mut self, hosts: usize) -> Self {
        self.max_hosts_in_flight = hosts.max(1);
        self
    }
}

/// Open ports found on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostScanResult {
    pub host: Address,
    /// False when the host failed its liveness check and was never probed.
    pub reachable: bool,
    /// Ascending and duplicate-free.
    pub open_ports: Vec<u16>,
}

impl HostScanResult {
    /// Result for a host that was skipped by the liveness check.
    pub fn skipped(host: Address) -> Self {
        Self {
            host,
            reachable: false,
            open_ports: Vec::new(),
        }
    }

    /// Build a result from probe completions, in any order.
    pub fn from_open_ports(host: Address, mut open_ports: Vec<u16>) -> Self {
        open_ports.sort_unstable();
        open_ports.dedup();
        Self {
            host,
            reachable: true,
            open_ports,
        }
    }

    pub fn has_open_ports(&self) -> bool {
        !self.open_ports.is_empty()
    }
}

/// Running totals over a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub hosts: u64,
    pub reachable: u64,
    pub hosts_with_open_ports: u64,
    pub open_ports: u64,
}

impl ScanSummary {
    pub fn record(&mut self, result: &HostScanResult) {
        self.hosts += 1;
        if result.reachable {
            self.reachable += 1;
        }
        if result.has_open_ports() {
            self.hosts_with_open_ports += 1;
            self.open_ports += result.open_ports.len() as u64;
        }
    }
}

/// The scan coordinator.
///
/// Cheap to clone: every field is shared.
#[derive(Clone)]
pub struct Scanner {
    config: Arc<ScanConfig>,
    ports: Arc<[u16]>,
    port_probe: Arc<dyn PortProbe>,
    reachability: Arc<dyn ReachabilityProbe>,
    probe_permits: Arc<Semaphore>,
    reporter: Option<Arc<Reporter>>,
    progress: Option<ProgressBar>,
}

impl Scanner {
    /// Create a scanner using TCP connect probes and ICMP liveness checks.
    pub fn new(config: ScanConfig, registry: &PortRegistry) -> Self {
        let ports = select_ports(&config, registry);
        let port_probe = Arc::new(TcpConnectProbe::new(config.connect_timeout));
        let reachability = Arc::new(IcmpProbe::new(config.ping_timeout));
        Self::with_probes(config, ports, port_probe, reachability)
    }

    /// Create a scanner with explicit probe implementations.
    pub fn with_probes(
        config: ScanConfig,
        ports: Vec<u16>,
        port_probe: Arc<dyn PortProbe>,
        reachability: Arc<dyn ReachabilityProbe>,
    ) -> Self {
        let probe_permits = Arc::new(Semaphore::new(
            config.max_concurrency.min(Semaphore::MAX_PERMITS),
        ));
        Self {
            config: Arc::new(config),
            ports: ports.into(),
            port_probe,
            reachability,
            probe_permits,
            reporter: None,
            progress: None,
        }
    }

    /// Render each host's result through `reporter` as soon as its sweep ends.
    pub fn with_reporter(mut self, reporter: Arc<Reporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Advance `progress` by one per finished host.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Ports probed on every reachable host, ascending.
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Sweep one host.
    ///
    /// A host that fails its liveness check (when pinging is allowed) is
    /// skipped without a single port probe.
    pub async fn scan_host(&self, host: Address) -> HostScanResult {
        if !self.config.ping_prohibited && !self.check_reachable(host).await {
            debug!(%host, "no echo reply, skipping host");
            return HostScanResult::skipped(host);
        }

        let mut probes = JoinSet::new();
        for &port in self.ports.iter() {
            // Acquired before spawning, so a host never has more pending
            // probe tasks than there are free permits.
            let Ok(permit) = Arc::clone(&self.probe_permits).acquire_owned().await else {
                break;
            };
            let probe = Arc::clone(&self.port_probe);
            probes.spawn(async move {
                let status = probe.probe(host, port).await;
                drop(permit);
                (port, status)
            });
        }

        let mut open_ports = Vec::new();
        while let Some(joined) = probes.join_next().await {
            match joined {
                Ok((port, PortStatus::Open)) => {
                    debug!(%host, port, "open");
                    open_ports.push(port);
                }
                Ok((_, PortStatus::Closed)) => {}
                Err(e) => warn!(%host, error = %e, "probe task failed, counting port as closed"),
            }
        }

        HostScanResult::from_open_ports(host, open_ports)
    }

    /// Sweep every address in `range` and wait for all of them.
    ///
    /// Results come back ordered by address. Each host is rendered (if a
    /// reporter is attached) the moment its own sweep completes.
    pub async fn scan_range(&self, range: AddressRange) -> Vec<HostScanResult> {
        let mut results = Vec::new();
        self.drive(range, |result| results.push(result)).await;

        results.sort_unstable_by_key(|r| r.host);
        info!(
            hosts = results.len(),
            reachable = results.iter().filter(|r| r.reachable).count(),
            "scan finished"
        );
        results
    }

    /// Sweep every address in `range`, keeping only running totals.
    ///
    /// Memory stays flat however large the range is; per-host output goes
    /// through the attached reporter.
    pub async fn sweep_range(&self, range: AddressRange) -> ScanSummary {
        let mut summary = ScanSummary::default();
        self.drive(range, |result| summary.record(&result)).await;

        info!(
            hosts = summary.hosts,
            reachable = summary.reachable,
            "scan finished"
        );
        summary
    }

    async fn drive<F>(&self, range: AddressRange, mut on_result: F)
    where
        F: FnMut(HostScanResult),
    {
        info!(
            %range,
            hosts = range.len(),
            ports = self.ports.len(),
            concurrency = self.config.max_concurrency,
            "starting scan"
        );

        let host_slots = Arc::new(Semaphore::new(
            self.config.max_hosts_in_flight.min(Semaphore::MAX_PERMITS),
        ));
        let mut hosts = JoinSet::new();

        for host in range.iter() {
            let Ok(slot) = Arc::clone(&host_slots).acquire_owned().await else {
                break;
            };
            let scanner = self.clone();
            hosts.spawn(async move {
                let result = scanner.scan_host(host).await;
                scanner.finish_host(&result);
                drop(slot);
                result
            });

            while let Some(joined) = hosts.try_join_next() {
                collect_host(joined, &mut on_result);
            }
        }

        while let Some(joined) = hosts.join_next().await {
            collect_host(joined, &mut on_result);
        }
    }

    /// Sweep the subnet `subnet/prefix`.
    pub async fn scan_cidr(&self, subnet: Address, prefix: u8) -> ScanResult<Vec<HostScanResult>> {
        let range = AddressRange::from_cidr(subnet, prefix)?;
        Ok(self.scan_range(range).await)
    }

    async fn check_reachable(&self, host: Address) -> bool {
        let Ok(_permit) = self.probe_permits.acquire().await else {
            return false;
        };
        self.reachability.is_reachable(host).await
    }

    fn finish_host(&self, result: &HostScanResult) {
        if result.reachable {
            info!(host = %result.host, open = result.open_ports.len(), "host swept");
        }

        if let Some(reporter) = &self.reporter {
            let render = || reporter.render(result);
            let rendered = match &self.progress {
                Some(pb) => pb.suspend(render),
                None => render(),
            };
            if let Err(e) = rendered {
                warn!(host = %result.host, error = %e, "failed to write results");
            }
        }

        if let Some(pb) = &self.progress {
            pb.inc(1);
            if result.has_open_ports() {
                pb.set_message(format!("{} has open ports", result.host));
            }
        }
    }
}

fn collect_host<F>(joined: Result<HostScanResult, JoinError>, on_result: &mut F)
where
    F: FnMut(HostScanResult),
{
    match joined {
        Ok(result) => on_result(result),
        Err(e) => warn!(error = %e, "host task failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn addr(s: &str) -> Address {
        s.parse().unwrap()
    }

    struct StubReachability {
        reachable: bool,
        calls: AtomicUsize,
    }

    impl StubReachability {
        fn new(reachable: bool) -> Arc<Self> {
            Arc::new(Self {
                reachable,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ReachabilityProbe for StubReachability {
        async fn is_reachable(&self, _host: Address) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reachable
        }
    }

    /// Records every probe and how many ran at once.
    #[derive(Default)]
    struct RecordingProbe {
        open: HashSet<u16>,
        panic_on: Option<u16>,
        delay: Duration,
        probed: Mutex<Vec<(Address, u16)>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl RecordingProbe {
        fn with_open(open: &[u16]) -> Self {
            Self {
                open: open.iter().copied().collect(),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.probed.lock().unwrap().len()
        }

        fn probed_ports(&self) -> HashSet<u16> {
            self.probed.lock().unwrap().iter().map(|&(_, p)| p).collect()
        }
    }

    #[async_trait]
    impl PortProbe for RecordingProbe {
        async fn probe(&self, host: Address, port: u16) -> PortStatus {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            self.probed.lock().unwrap().push((host, port));

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on == Some(port) {
                panic!("probe blew up on port {port}");
            }
            if self.open.contains(&port) {
                PortStatus::Open
            } else {
                PortStatus::Closed
            }
        }
    }

    fn scanner(
        config: ScanConfig,
        probe: &Arc<RecordingProbe>,
        reachability: &Arc<StubReachability>,
    ) -> Scanner {
        let ports = select_ports(&config, PortRegistry::global());
        Scanner::with_probes(config, ports, probe.clone(), reachability.clone())
    }

    #[tokio::test]
    async fn test_unreachable_host_is_skipped_without_probes() {
        let probe = Arc::new(RecordingProbe::with_open(&[22]));
        let reachability = StubReachability::new(false);
        let config = ScanConfig::new(false, false, 16).unwrap();

        let result = scanner(config, &probe, &reachability)
            .scan_host(addr("10.0.0.1"))
            .await;

        assert_eq!(result, HostScanResult::skipped(addr("10.0.0.1")));
        assert_eq!(reachability.calls.load(Ordering::SeqCst), 1);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_ping_prohibited_bypasses_liveness_check() {
        let probe = Arc::new(RecordingProbe::with_open(&[22]));
        let reachability = StubReachability::new(false);
        let config = ScanConfig::new(false, true, 16).unwrap();

        let result = scanner(config, &probe, &reachability)
            .scan_host(addr("10.0.0.1"))
            .await;

        assert!(result.reachable);
        assert_eq!(result.open_ports, vec![22]);
        assert_eq!(reachability.calls.load(Ordering::SeqCst), 0);
        assert_eq!(probe.calls(), PortRegistry::global().len());
    }

    #[tokio::test]
    async fn test_common_port_scan_probes_exactly_registry_keys() {
        let expected: HashSet<u16> = PortRegistry::global().ports().collect();

        for concurrency in [1, 3, 64, 1024] {
            let probe = Arc::new(RecordingProbe::default());
            let reachability = StubReachability::new(true);
            let config = ScanConfig::new(false, false, concurrency).unwrap();

            scanner(config, &probe, &reachability)
                .scan_host(addr("10.0.0.2"))
                .await;

            assert_eq!(probe.probed_ports(), expected);
            assert_eq!(probe.calls(), expected.len());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_open_ports_are_sorted_and_unique() {
        let probe = Arc::new(RecordingProbe::with_open(&[8080, 22, 443, 80, 3306]));
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 32).unwrap();

        let result = scanner(config, &probe, &reachability)
            .scan_host(addr("10.0.0.3"))
            .await;

        assert_eq!(result.open_ports, vec![22, 80, 443, 3306, 8080]);
    }

    #[test]
    fn test_result_normalizes_port_order() {
        let result = HostScanResult::from_open_ports(addr("10.0.0.4"), vec![443, 22, 443, 80]);
        assert_eq!(result.open_ports, vec![22, 80, 443]);
        assert!(result.reachable);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_probe_concurrency_never_exceeds_limit() {
        let probe = Arc::new(RecordingProbe {
            delay: Duration::from_millis(2),
            ..RecordingProbe::default()
        });
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, true, 4).unwrap().with_max_hosts_in_flight(8);

        let range = AddressRange::from_cidr(addr("10.0.0.0"), 29).unwrap();
        let results = scanner(config, &probe, &reachability).scan_range(range).await;

        assert_eq!(results.len(), 8);
        let peak = probe.max_in_flight.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 4, "peak in-flight probes was {peak}");
        assert_eq!(probe.calls(), 8 * PortRegistry::global().len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_many_hosts_with_single_permit_do_not_deadlock() {
        let probe = Arc::new(RecordingProbe::with_open(&[22]));
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 1).unwrap().with_max_hosts_in_flight(64);

        let range = AddressRange::from_cidr(addr("10.0.0.0"), 27).unwrap();
        let results = tokio::time::timeout(
            Duration::from_secs(30),
            scanner(config, &probe, &reachability).scan_range(range),
        )
        .await
        .expect("scan stalled");

        assert_eq!(results.len(), 32);
        assert!(results.iter().all(|r| r.open_ports == vec![22]));
        assert_eq!(probe.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_scan_range_orders_results_by_host() {
        let probe = Arc::new(RecordingProbe::default());
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 64).unwrap();

        let range = AddressRange::new(addr("10.0.0.250"), addr("10.0.1.3")).unwrap();
        let results = scanner(config, &probe, &reachability).scan_range(range).await;

        let hosts: Vec<Address> = results.iter().map(|r| r.host).collect();
        let expected: Vec<Address> = range.iter().collect();
        assert_eq!(hosts, expected);
    }

    #[tokio::test]
    async fn test_sweep_range_keeps_totals() {
        let probe = Arc::new(RecordingProbe::with_open(&[22, 443]));
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 16).unwrap();

        let range = AddressRange::from_cidr(addr("10.0.0.0"), 29).unwrap();
        let summary = scanner(config, &probe, &reachability)
            .sweep_range(range)
            .await;

        assert_eq!(
            summary,
            ScanSummary {
                hosts: 8,
                reachable: 8,
                hosts_with_open_ports: 8,
                open_ports: 16,
            }
        );
    }

    #[tokio::test]
    async fn test_sweep_range_counts_skipped_hosts() {
        let probe = Arc::new(RecordingProbe::with_open(&[22]));
        let reachability = StubReachability::new(false);
        let config = ScanConfig::new(false, false, 16).unwrap();

        let range = AddressRange::from_cidr(addr("10.0.0.0"), 30).unwrap();
        let summary = scanner(config, &probe, &reachability)
            .sweep_range(range)
            .await;

        assert_eq!(summary.hosts, 4);
        assert_eq!(summary.reachable, 0);
        assert_eq!(summary.open_ports, 0);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_scan_cidr_rejects_bad_prefix() {
        let probe = Arc::new(RecordingProbe::default());
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 4).unwrap();

        let result = scanner(config, &probe, &reachability)
            .scan_cidr(addr("10.0.0.0"), 33)
            .await;

        assert!(matches!(result, Err(ScanError::InvalidPrefixLength(33))));
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_panicking_probe_counts_as_closed() {
        let probe = Arc::new(RecordingProbe {
            open: [22, 80].into_iter().collect(),
            panic_on: Some(80),
            ..RecordingProbe::default()
        });
        let reachability = StubReachability::new(true);
        let config = ScanConfig::new(false, false, 8).unwrap();

        let result = scanner(config, &probe, &reachability)
            .scan_host(addr("10.0.0.5"))
            .await;

        assert_eq!(result.open_ports, vec![22]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reporter_receives_only_reachable_hosts() {
        let probe = Arc::new(RecordingProbe::with_open(&[22, 443]));
        let reachability = StubReachability::new(false);
        let buffer = crate::output::SharedBuffer::default();
        let reporter = Arc::new(Reporter::new(
            OutputFormat::Plain,
            PortRegistry::global(),
            Box::new(buffer.clone()),
        ));

        let skipped = ScanConfig::new(false, false, 8).unwrap();
        let range = AddressRange::from_cidr(addr("10.0.0.0"), 30).unwrap();
        scanner(skipped, &probe, &reachability)
            .with_reporter(Arc::clone(&reporter))
            .scan_range(range)
            .await;
        assert!(buffer.contents().is_empty());

        let forced = ScanConfig::new(false, true, 8).unwrap();
        scanner(forced, &probe, &reachability)
            .with_reporter(reporter)
            .scan_range(range)
            .await;
        let text = buffer.contents();
        assert_eq!(text.matches("Open ports on").count(), 4);
        assert_eq!(text.matches("\t22\tSSH").count(), 4);
    }

    #[test]
    fn test_config_rejects_zero_concurrency() {
        assert!(matches!(
            ScanConfig::new(false, false, 0),
            Err(ScanError::InvalidConcurrency(0))
        ));
    }

    #[test]
    fn test_config_builders() {
        let config = ScanConfig::new(true, true, 10)
            .unwrap()
            .with_ping_timeout(Duration::from_millis(500))
            .with_connect_timeout(Duration::from_secs(1))
            .with_max_hosts_in_flight(0);

        assert_eq!(config.ping_timeout, Duration::from_millis(500));
        assert_eq!(config.connect_timeout, Duration::from_secs(1));
        assert_eq!(config.max_hosts_in_flight, 1);
    }
}
