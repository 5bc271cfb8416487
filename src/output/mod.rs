//! Output formatting module.
//!
//! The [`Reporter`] renders one host's result at a time in plain text,
//! JSON lines, or CSV. Each host's block is formatted into a buffer first
//! and then written to the shared sink under a single lock, so blocks from
//! concurrently finishing hosts never interleave.

mod csv_format;
mod json_format;
mod plain;

pub use plain::{print_completed, print_error, print_scan_header, print_warning};

use crate::cli::OutputFormat;
use crate::scanner::HostScanResult;
use crate::services::PortRegistry;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Sink {
    out: Box<dyn Write + Send>,
    header_written: bool,
}

/// Renders host results to a shared output sink.
pub struct Reporter {
    format: OutputFormat,
    registry: &'static PortRegistry,
    sink: Mutex<Sink>,
}

impl Reporter {
    /// Create a reporter writing to `out`.
    pub fn new(
        format: OutputFormat,
        registry: &'static PortRegistry,
        out: Box<dyn Write + Send>,
    ) -> Self {
        Self {
            format,
            registry,
            sink: Mutex::new(Sink {
                out,
                header_written: false,
            }),
        }
    }

    /// Create a reporter writing to standard output.
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, PortRegistry::global(), Box::new(io::stdout()))
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render one host's result.
    ///
    /// Hosts skipped by the liveness check produce no output.
    pub fn render(&self, result: &HostScanResult) -> io::Result<()> {
        if !result.reachable {
            return Ok(());
        }

        let mut block = Vec::new();
        match self.format {
            OutputFormat::Plain => plain::render_host(&mut block, result, self.registry)?,
            OutputFormat::Json => json_format::render_host(&mut block, result, self.registry)?,
            OutputFormat::Csv => csv_format::render_host(&mut block, result, self.registry)?,
        }

        let mut sink = self.lock();
        if !sink.header_written {
            if self.format == OutputFormat::Csv {
                let mut header = Vec::new();
                csv_format::write_header(&mut header)?;
                sink.out.write_all(&header)?;
            }
            sink.header_written = true;
        }
        sink.out.write_all(&block)?;
        sink.out.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        // A panic mid-write leaves at worst a partial block; keep going.
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// An in-memory, cloneable output sink for capturing rendered results.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedBuffer(std::sync::Arc<Mutex<Vec<u8>>>);

#[cfg(test)]
impl SharedBuffer {
    /// Everything written so far, lossily decoded.
    pub(crate) fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

#[cfg(test)]
impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
