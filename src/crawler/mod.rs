//! Crawler module for batch fetching and extraction
//!
//! This module contains the core crawling logic, including:
//! - Static partitioning of the URL batch across workers
//! - The HTTP transport and its process-wide lifecycle
//! - Pattern-based field extraction with per-domain overrides
//! - Ordered, lock-protected result aggregation
//! - The worker-pool dispatcher and the bounded fan-out crawler

mod aggregator;
mod dispatcher;
mod fanout;
pub mod fetcher;
mod parser;
mod partition;
mod result;
pub mod rules;

pub use aggregator::ResultAggregator;
pub use dispatcher::{process_url, CrawlDispatcher, LogProgress, ProgressSink, PARSE_FAILURE};
pub use fanout::{
    asset_file_name, compare_fanout, find_asset_urls, find_link_urls, run_fanout,
    sanitize_file_name, seed_directory, unique_file_name, FanoutCrawler, FanoutRun,
    FanoutSnapshot, SeedOutcome,
};
pub use fetcher::{build_http_client, HttpTransport, Transport};
pub use parser::{Extraction, ExtractionEngine};
pub use partition::PartitionPlan;
pub use result::{CrawlResult, CrawlTask, PageFields};
pub use rules::{Cardinality, ExtractionRule, Field};

use crate::config::Config;
use crate::CrawlerError;
use std::sync::Arc;

/// Builds an extraction engine with every override from the configuration
pub fn build_engine(config: &Config) -> Result<ExtractionEngine, CrawlerError> {
    let mut engine = ExtractionEngine::new();
    for entry in &config.overrides {
        engine.set_override(&entry.domain, &entry.field, &entry.pattern)?;
    }
    Ok(engine)
}

/// Runs a complete batch crawl as configured
///
/// This is the main entry point for a crawl. It will:
/// 1. Build the extraction engine with configured overrides
/// 2. Build the HTTP transport
/// 3. Dispatch the batch (threaded or single-threaded)
///
/// # Returns
///
/// * `Ok(Vec<CrawlResult>)` - One result per URL, in input order
/// * `Err(CrawlerError)` - Setup failed before any URL was fetched
pub fn crawl(config: &Config, urls: &[String]) -> Result<Vec<CrawlResult>, CrawlerError> {
    let engine = Arc::new(build_engine(config)?);
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.http)?);
    let dispatcher = CrawlDispatcher::new(engine, transport);

    if config.crawler.single_threaded {
        Ok(dispatcher.run_single_threaded(urls, config.crawler.extended))
    } else {
        dispatcher.run(urls, config.crawler.workers, config.crawler.extended)
    }
}
