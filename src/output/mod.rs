//! Output module for crawl reports
//!
//! This module handles:
//! - Writing crawl results as CSV, with companion files for extended fields
//! - Summarizing a batch into statistics
//! - Recording thread-count timing comparisons

mod csv;
pub mod stats;
mod timing;
mod traits;

pub use csv::{
    escape_csv_field, format_url_for_csv, render_headings, render_images, render_links,
    render_results, CsvReport,
};
pub use stats::{print_statistics, CrawlStatistics};
pub use timing::{format_timing_report, write_timing_report, TimingEntry, TimingReport};
pub use traits::{OutputError, OutputResult, ReportSink};
