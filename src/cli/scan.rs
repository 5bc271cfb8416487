//! Scan options shared by every subcommand, and the scan handler.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::{self, Reporter};
use crate::scanner::{ScanConfig, ScanSummary, Scanner};
use crate::services::PortRegistry;
use crate::types::TargetSpec;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// Options controlling how hosts are swept.
#[derive(Args, Debug, Clone, Default)]
pub struct ScanOptions {
    /// Scan all 65536 ports instead of only well-known ones (slow)
    #[arg(short = 'a', long = "all-ports")]
    pub all_ports: bool,

    /// Skip the ICMP liveness check and sweep every host
    #[arg(short = 'p', long = "no-ping")]
    pub no_ping: bool,

    /// Maximum number of concurrent probes
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Liveness check timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub ping_timeout: Option<u64>,

    /// Per-port connection timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub connect_timeout: Option<u64>,

    /// Maximum number of hosts swept at once
    #[arg(long = "hosts", value_name = "N")]
    pub max_hosts: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Show a progress bar over hosts
    #[arg(long)]
    pub progress: bool,
}

impl ScanOptions {
    /// Build the validated scan configuration. Flags win over settings.
    pub fn scan_config(&self, settings: &AppSettings) -> CliResult<ScanConfig> {
        let concurrency = self.threads.unwrap_or(settings.default_concurrency);
        let ping_timeout = self.ping_timeout.unwrap_or(settings.ping_timeout_ms);
        let connect_timeout = self.connect_timeout.unwrap_or(settings.connect_timeout_ms);

        let config = ScanConfig::new(self.all_ports, self.no_ping, concurrency)?
            .with_ping_timeout(Duration::from_millis(ping_timeout))
            .with_connect_timeout(Duration::from_millis(connect_timeout))
            .with_max_hosts_in_flight(self.max_hosts.unwrap_or(settings.max_hosts_in_flight));

        Ok(config)
    }

    /// Validate all input, then run the scan to completion.
    pub async fn execute(
        &self,
        target: TargetSpec,
        config_path: Option<&Path>,
        quiet: bool,
    ) -> CliResult<()> {
        let settings = match config_path {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load().unwrap_or_else(|e| {
                output::print_warning(&format!("ignoring settings file: {}", e));
                AppSettings::default()
            }),
        };

        let range = target.resolve()?;
        let config = self.scan_config(&settings)?;
        let format = self.output.unwrap_or(settings.default_output_format);
        let registry = PortRegistry::global();

        let reporter = Arc::new(Reporter::stdout(format));
        let mut scanner = Scanner::new(config, registry).with_reporter(reporter);

        if !quiet && format == OutputFormat::Plain {
            output::print_scan_header(
                &target.to_string(),
                range.len(),
                scanner.ports().len(),
                scanner.config(),
            );
        }

        let progress = self.progress.then(|| progress_bar(range.len()));
        if let Some(pb) = &progress {
            scanner = scanner.with_progress(pb.clone());
        }

        let started = Instant::now();
        let summary = scanner.sweep_range(range).await;
        let elapsed = started.elapsed();

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        log_summary(&summary);
        output::print_completed(elapsed, format != OutputFormat::Plain);

        Ok(())
    }
}

fn progress_bar(hosts: u64) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} hosts {msg}",
    )
    .map(|style| style.progress_chars("=>-"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let pb = ProgressBar::new(hosts);
    pb.set_style(style);
    pb
}

fn log_summary(summary: &ScanSummary) {
    info!(
        hosts = summary.hosts,
        reachable = summary.reachable,
        hosts_with_open_ports = summary.hosts_with_open_ports,
        open_ports = summary.open_ports,
        "scan summary"
    );
}
