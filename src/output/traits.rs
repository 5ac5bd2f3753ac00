//! Output sink trait and error types
//!
//! A report sink turns a finished batch of crawl results into files.

use crate::crawler::CrawlResult;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes crawl results somewhere durable
pub trait ReportSink {
    /// Writes the results and returns the paths of every file produced
    ///
    /// Companion files that cannot be written are skipped rather than
    /// failing the whole report; the returned list only names files that
    /// were written.
    fn write_results(&self, results: &[CrawlResult], extended: bool)
        -> OutputResult<Vec<PathBuf>>;
}
