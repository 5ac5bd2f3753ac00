//! Parallel-Crawler main entry point
//!
//! This is the command-line interface for the Parallel-Crawler batch harvester.

use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use parallel_crawler::config::{load_config_with_hash, read_url_list, Config};
use parallel_crawler::crawler::{
    build_engine, compare_fanout, fetcher, run_fanout, CrawlDispatcher, HttpTransport,
    LogProgress, ProgressSink, SeedOutcome, Transport,
};
use parallel_crawler::output::{
    print_statistics, write_timing_report, CrawlStatistics, CsvReport, ReportSink,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Parallel-Crawler: a batch page harvester
///
/// Fetches every URL in the input list on a fixed pool of worker threads,
/// extracts title, description, price and date (plus links, images and
/// headings in extended mode), and writes the results as CSV.
#[derive(Parser, Debug)]
#[command(name = "parallel-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A parallel batch page harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Input file containing URLs, one per line
    #[arg(short, long, default_value = "data/urls.txt")]
    input: PathBuf,

    /// Output file for results (overrides the configured results path)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of worker threads
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
    threads: Option<u64>,

    /// Extract keywords, author, logo, links, images and headings as well
    #[arg(long)]
    extended: bool,

    /// Process URLs one at a time on the main thread
    #[arg(long, conflicts_with_all = ["fanout", "compare"])]
    single_threaded: bool,

    /// Snapshot each URL with a bounded set of assets and linked pages
    #[arg(long)]
    fanout: bool,

    /// Compare wall time across thread counts, e.g. --compare 1,2,4,8
    /// (times fan-out runs when combined with --fanout)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    compare: Option<Vec<usize>>,

    /// Where to write the timing comparison table
    #[arg(long, default_value = "data/timeelapsed.txt")]
    timing_output: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load_configuration(&cli)?;

    let urls = read_url_list(&cli.input)
        .with_context(|| format!("Failed to read URL list {}", cli.input.display()))?;
    if urls.is_empty() {
        bail!("No URLs found in {}", cli.input.display());
    }
    tracing::info!("Loaded {} URLs from {}", urls.len(), cli.input.display());

    fetcher::init();
    let outcome = if let Some(counts) = &cli.compare {
        handle_compare(&config, &urls, counts, &cli)
    } else if cli.fanout {
        handle_fanout(&config, &urls)
    } else {
        handle_crawl(&config, &urls, cli.quiet)
    };
    fetcher::shutdown();

    if let Err(e) = &outcome {
        tracing::error!("Run failed: {:#}", e);
    }
    outcome
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("parallel_crawler=info,warn"),
            1 => EnvFilter::new("parallel_crawler=debug,info"),
            2 => EnvFilter::new("parallel_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file (or defaults) and applies CLI overrides
fn load_configuration(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(threads) = cli.threads {
        config.crawler.workers = usize::try_from(threads).context("Thread count is too large")?;
    }
    if let Some(output) = &cli.output {
        config.output.results_path = output.display().to_string();
    }
    config.crawler.extended |= cli.extended;
    config.crawler.single_threaded |= cli.single_threaded;

    Ok(config)
}

fn build_dispatcher(config: &Config, quiet: bool) -> anyhow::Result<CrawlDispatcher> {
    let engine = Arc::new(build_engine(config)?);
    if engine.override_count() > 0 {
        tracing::info!("Loaded {} extraction overrides", engine.override_count());
    }
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(&config.http)?);
    let progress: Arc<dyn ProgressSink> = if quiet {
        Arc::new(LogProgress)
    } else {
        Arc::new(BarProgress::default())
    };
    Ok(CrawlDispatcher::new(engine, transport).with_progress(progress))
}

/// Handles the main batch crawl
fn handle_crawl(config: &Config, urls: &[String], quiet: bool) -> anyhow::Result<()> {
    let dispatcher = build_dispatcher(config, quiet)?;
    let extended = config.crawler.extended;

    let start = Instant::now();
    let results = if config.crawler.single_threaded {
        dispatcher.run_single_threaded(urls, extended)
    } else {
        dispatcher.run(urls, config.crawler.workers, extended)?
    };
    tracing::info!(
        "Crawling completed in {:.3} seconds",
        start.elapsed().as_secs_f64()
    );

    let report = CsvReport::new(&config.output.results_path);
    for path in report.write_results(&results, extended)? {
        tracing::debug!("Wrote {}", path.display());
    }

    if !quiet {
        print_statistics(&CrawlStatistics::from_results(&results));
    }
    Ok(())
}

/// Handles --compare: one run per thread count, then the timing table
///
/// Times batch crawls, or fan-out runs when --fanout is also given.
fn handle_compare(
    config: &Config,
    urls: &[String],
    counts: &[usize],
    cli: &Cli,
) -> anyhow::Result<()> {
    let report = if cli.fanout {
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.http.with_browser_headers())?);
        compare_fanout(urls, transport, counts, &config.fanout)?
    } else {
        let dispatcher = build_dispatcher(config, cli.quiet)?;
        dispatcher.compare_thread_counts(urls, counts, config.crawler.extended)?
    };

    for entry in &report.entries {
        tracing::info!(
            "{} threads: {:.2}s (speedup {:.2}x)",
            entry.threads,
            entry.elapsed.as_secs_f64(),
            entry.speedup
        );
    }
    if let Some(best) = report.fastest() {
        tracing::info!(
            "Fastest: {} threads, {:.2}s ({:.2}x)",
            best.threads,
            best.elapsed.as_secs_f64(),
            best.speedup
        );
    }
    write_timing_report(&report, &cli.timing_output)?;
    Ok(())
}

/// Handles --fanout: snapshots every seed under a timestamped run directory
fn handle_fanout(config: &Config, urls: &[String]) -> anyhow::Result<()> {
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(&config.http.with_browser_headers())?);

    let run = run_fanout(urls, transport, config.crawler.workers, &config.fanout)?;

    for outcome in &run.outcomes {
        if let SeedOutcome::Failed { seed_url, error } = outcome {
            tracing::warn!("Snapshot of {} failed: {}", seed_url, error);
        }
    }
    tracing::info!(
        "Saved {}/{} snapshots under {}",
        run.saved_count(),
        run.outcomes.len(),
        run.run_dir.display()
    );
    Ok(())
}

/// Progress sink drawing an indicatif bar on stderr
///
/// A fresh bar is started for each run and finished once every URL is done.
#[derive(Default)]
struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    const TEMPLATE: &'static str = "[{bar:50}] {percent}% ({pos}/{len})";

    fn start(total: usize) -> ProgressBar {
        let style = ProgressStyle::with_template(Self::TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::new(total as u64);
        bar.set_style(style);
        bar
    }
}

impl ProgressSink for BarProgress {
    fn update(&self, completed: usize, total: usize) {
        if total == 0 {
            return;
        }
        let mut slot = self.bar.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let bar = slot.get_or_insert_with(|| Self::start(total));
        bar.set_position(completed as u64);
        if completed >= total {
            bar.finish();
            *slot = None;
        }
    }
}
