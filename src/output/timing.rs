//! Thread-count timing report
//!
//! Records the wall time of the same batch run at several worker counts and
//! the speedup of each run against the single-worker baseline.

use crate::output::traits::{OutputError, OutputResult};
use std::fmt::Write as _;
use std::path::Path;
use std::time::Duration;

/// One measured run
#[derive(Debug, Clone, PartialEq)]
pub struct TimingEntry {
    pub threads: usize,
    pub elapsed: Duration,
    /// Baseline time divided by this run's time
    pub speedup: f64,
}

/// Timings for one batch at several worker counts
#[derive(Debug, Clone, PartialEq)]
pub struct TimingReport {
    pub url_count: usize,
    pub entries: Vec<TimingEntry>,
}

impl TimingReport {
    /// Builds a report from `(threads, elapsed)` runs in execution order
    ///
    /// The baseline is the 1-thread run, or the first run when no 1-thread
    /// run was measured.
    pub fn new(url_count: usize, runs: Vec<(usize, Duration)>) -> Self {
        let baseline = runs
            .iter()
            .find(|(threads, _)| *threads == 1)
            .or_else(|| runs.first())
            .map(|(_, elapsed)| elapsed.as_secs_f64())
            .unwrap_or(0.0);

        let entries = runs
            .into_iter()
            .map(|(threads, elapsed)| {
                let secs = elapsed.as_secs_f64();
                let speedup = if secs > 0.0 { baseline / secs } else { 1.0 };
                TimingEntry {
                    threads,
                    elapsed,
                    speedup,
                }
            })
            .collect();

        Self { url_count, entries }
    }

    /// The entry with the highest speedup
    pub fn fastest(&self) -> Option<&TimingEntry> {
        self.entries
            .iter()
            .max_by(|a, b| a.speedup.total_cmp(&b.speedup))
    }
}

/// Renders the report as a plain-text table
pub fn format_timing_report(report: &TimingReport) -> String {
    let mut out = String::new();
    out.push_str("=== Parallel Web Crawler Performance Test ===\n\n");
    let _ = writeln!(out, "Number of Tested URLs: {}\n", report.url_count);
    out.push_str("Thread Count | Elapsed Time (seconds) | Speedup Ratio\n");
    out.push_str("------------------------------------------------\n");

    for entry in &report.entries {
        let _ = writeln!(
            out,
            "{:>12} | {:.2} | {:.2}x",
            entry.threads,
            entry.elapsed.as_secs_f64(),
            entry.speedup
        );
    }
    out
}

/// Writes the report table to `path`
pub fn write_timing_report(report: &TimingReport, path: &Path) -> OutputResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, format_timing_report(report))
        .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))?;
    tracing::info!("Timing results saved to {}", path.display());
    Ok(())
}
