//! Crawl dispatcher - fixed worker pool over a static partition
//!
//! The dispatcher coordinates a batch crawl:
//! - Partitioning the URL list into per-worker index ranges
//! - Spawning one OS thread per range and joining them all
//! - Running fetch, extraction and write-back for every task
//! - Reporting progress from worker 0
//!
//! A slow URL only stalls the worker that drew it; the dispatcher adds no
//! timeout of its own beyond the transport's.

use crate::crawler::aggregator::ResultAggregator;
use crate::crawler::fetcher::Transport;
use crate::crawler::parser::ExtractionEngine;
use crate::crawler::partition::PartitionPlan;
use crate::crawler::result::{CrawlResult, CrawlTask};
use crate::output::TimingReport;
use crate::CrawlerError;
use std::ops::Range;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

/// Error text recorded when a page was fetched but yielded no fields of interest
pub const PARSE_FAILURE: &str = "Failed to parse HTML content";

/// Receives progress updates during a crawl
pub trait ProgressSink: Send + Sync {
    fn update(&self, completed: usize, total: usize);
}

/// Progress sink that logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn update(&self, completed: usize, total: usize) {
        tracing::info!("Progress: {}/{} URLs processed", completed, total);
    }
}

/// Crawls one URL: fetch, extract, and record failures on the result
pub fn process_url(
    engine: &ExtractionEngine,
    transport: &dyn Transport,
    url: &str,
    extended: bool,
) -> CrawlResult {
    let body = match transport.fetch(url) {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!("Fetch failed for {}: {}", url, e);
            return CrawlResult::failed(url, e.to_string());
        }
    };

    let extraction = engine.extract(&body, url, extended);
    let mut result = CrawlResult::new(url).with_fields(extraction.fields);
    result.success = extraction.success;
    if !extraction.success {
        tracing::debug!("No fields of interest found at {}", url);
        result.error = PARSE_FAILURE.to_string();
    }
    result
}

/// Runs batch crawls on a fixed pool of worker threads
pub struct CrawlDispatcher {
    engine: Arc<ExtractionEngine>,
    transport: Arc<dyn Transport>,
    progress: Arc<dyn ProgressSink>,
}

impl CrawlDispatcher {
    /// Creates a dispatcher that logs progress through `tracing`
    pub fn new(engine: Arc<ExtractionEngine>, transport: Arc<dyn Transport>) -> Self {
        Self {
            engine,
            transport,
            progress: Arc::new(LogProgress),
        }
    }

    /// Replaces the progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Crawls `urls` on `worker_count` threads
    ///
    /// The worker count is clamped to the number of URLs. Results come back
    /// in input order regardless of which worker finishes first.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<CrawlResult>)` - One result per input URL
    /// * `Err(CrawlerError)` - Zero workers, or a worker thread could not be spawned
    pub fn run(
        &self,
        urls: &[String],
        worker_count: usize,
        extended: bool,
    ) -> Result<Vec<CrawlResult>, CrawlerError> {
        if worker_count == 0 {
            return Err(CrawlerError::InvalidWorkerCount(worker_count));
        }
        if urls.is_empty() {
            return Ok(Vec::new());
        }

        let plan = PartitionPlan::new(urls.len(), worker_count);
        let aggregator = ResultAggregator::new(urls);

        tracing::info!(
            "Starting crawl of {} URLs with {} workers{}",
            urls.len(),
            plan.worker_count(),
            if extended { " (extended)" } else { "" }
        );

        thread::scope(|scope| -> Result<(), CrawlerError> {
            for (worker_id, range) in plan.iter() {
                let aggregator = &aggregator;
                thread::Builder::new()
                    .name(format!("crawl-worker-{}", worker_id))
                    .spawn_scoped(scope, move || {
                        self.run_worker(worker_id, range, urls, aggregator, extended)
                    })?;
            }
            Ok(())
        })?;

        tracing::info!("All {} workers finished", plan.worker_count());
        Ok(aggregator.into_results())
    }

    /// Crawls `urls` one at a time on the calling thread
    ///
    /// Produces the same results as [`run`](Self::run) for the same input.
    pub fn run_single_threaded(&self, urls: &[String], extended: bool) -> Vec<CrawlResult> {
        tracing::info!("Starting single-threaded crawl of {} URLs", urls.len());

        let aggregator = ResultAggregator::new(urls);
        self.run_worker(0, 0..urls.len(), urls, &aggregator, extended);
        aggregator.into_results()
    }

    /// Runs the batch once per worker count and records wall time for each
    pub fn compare_thread_counts(
        &self,
        urls: &[String],
        counts: &[usize],
        extended: bool,
    ) -> Result<TimingReport, CrawlerError> {
        let mut runs = Vec::with_capacity(counts.len());
        for &count in counts {
            tracing::info!("{} thread test starting", count);
            let start = Instant::now();
            self.run(urls, count, extended)?;
            let elapsed = start.elapsed();
            tracing::info!(
                "{} thread test completed in {:.2}s",
                count,
                elapsed.as_secs_f64()
            );
            runs.push((count, elapsed));
        }

        Ok(TimingReport::new(urls.len(), runs))
    }

    fn run_worker(
        &self,
        worker_id: usize,
        range: Range<usize>,
        urls: &[String],
        aggregator: &ResultAggregator,
        extended: bool,
    ) {
        tracing::debug!("Worker {} processing indices {:?}", worker_id, range);

        let tasks = range.map(|index| CrawlTask {
            index,
            url: urls[index].clone(),
        });

        for task in tasks {
            let result = process_url(&self.engine, self.transport.as_ref(), &task.url, extended);

            match aggregator.store(task.index, result) {
                Ok(completed) => {
                    if worker_id == 0 {
                        self.progress.update(completed, aggregator.len());
                    }
                }
                Err(e) => tracing::error!("Worker {} could not store {}: {}", worker_id, task.url, e),
            }
        }
    }
}
