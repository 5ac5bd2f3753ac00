//! Bounded one-hop snapshots of seed pages
//!
//! For each seed the fan-out crawler saves the page itself, up to a fixed
//! number of its assets (stylesheets, scripts, images) and up to a fixed
//! number of the pages it links to. Linked pages are never followed further.
//!
//! Layout on disk:
//!
//! ```text
//! <output-dir>/run_<timestamp>_threads_<W>/
//!     thread_<i>/<domain>/index.html
//!     thread_<i>/<domain>/<asset file name>
//!     thread_<i>/<domain>/linked_<n>.html
//!     thread_<i>/log.txt
//! ```

use crate::config::FanoutConfig;
use crate::crawler::fetcher::Transport;
use crate::crawler::partition::PartitionPlan;
use crate::output::TimingReport;
use crate::url::{domain_of, normalize};
use crate::CrawlerError;
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use url::Url;

const STYLE_OR_SCRIPT: &[&str] = &["css", "js"];
const SCRIPT: &[&str] = &["js"];
const IMAGE: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Files written for one seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanoutSnapshot {
    /// The seed URL
    pub seed_url: String,

    /// Directory holding the snapshot
    pub directory: PathBuf,

    /// Saved assets, in download order
    pub assets: Vec<PathBuf>,

    /// Saved `linked_<n>.html` pages
    pub linked_pages: Vec<PathBuf>,
}

/// Outcome for one seed of a fan-out run
#[derive(Debug)]
pub enum SeedOutcome {
    Saved(FanoutSnapshot),
    Failed { seed_url: String, error: String },
}

/// Result of a whole fan-out run, one outcome per seed in input order
#[derive(Debug)]
pub struct FanoutRun {
    pub run_dir: PathBuf,
    pub outcomes: Vec<SeedOutcome>,
}

impl FanoutRun {
    pub fn saved_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, SeedOutcome::Saved(_)))
            .count()
    }
}

/// Downloads a seed page plus a capped set of its assets and linked pages
pub struct FanoutCrawler {
    transport: Arc<dyn Transport>,
    max_assets: usize,
    max_links: usize,
}

impl FanoutCrawler {
    pub fn new(transport: Arc<dyn Transport>, config: &FanoutConfig) -> Self {
        Self {
            transport,
            max_assets: config.max_assets,
            max_links: config.max_links,
        }
    }

    /// Snapshots `seed_url` into `directory`
    ///
    /// Failing to fetch the seed aborts this seed with an error. Failures on
    /// individual assets or linked pages are logged and skipped.
    pub fn crawl(&self, seed_url: &str, directory: &Path) -> Result<FanoutSnapshot, CrawlerError> {
        let body = self
            .transport
            .fetch(seed_url)
            .map_err(|source| CrawlerError::Fetch {
                url: seed_url.to_string(),
                source,
            })?;
        fs::create_dir_all(directory)?;
        fs::write(directory.join("index.html"), &body)?;
        tracing::debug!("Saved {} to {}", seed_url, directory.display());

        let mut snapshot = FanoutSnapshot {
            seed_url: seed_url.to_string(),
            directory: directory.to_path_buf(),
            assets: Vec::new(),
            linked_pages: Vec::new(),
        };

        let mut taken = HashSet::from(["index.html".to_string()]);
        for (n, asset_url) in find_asset_urls(&body, seed_url, self.max_assets)
            .iter()
            .enumerate()
        {
            let name = unique_file_name(asset_file_name(asset_url, n + 1), &taken);
            let path = directory.join(&name);
            match self.save(asset_url, &path) {
                Ok(()) => {
                    taken.insert(name);
                    snapshot.assets.push(path);
                }
                Err(e) => tracing::warn!("Failed to download asset {}: {}", asset_url, e),
            }
        }

        for (n, link_url) in find_link_urls(&body, seed_url, self.max_links)
            .iter()
            .enumerate()
        {
            let path = directory.join(format!("linked_{}.html", n + 1));
            match self.save(link_url, &path) {
                Ok(()) => snapshot.linked_pages.push(path),
                Err(e) => tracing::warn!("Failed to download linked page {}: {}", link_url, e),
            }
        }

        tracing::info!(
            "Snapshot of {}: {} assets, {} linked pages",
            seed_url,
            snapshot.assets.len(),
            snapshot.linked_pages.len()
        );
        Ok(snapshot)
    }

    fn save(&self, url: &str, path: &Path) -> Result<(), CrawlerError> {
        let bytes = self
            .transport
            .fetch_bytes(url)
            .map_err(|source| CrawlerError::Fetch {
                url: url.to_string(),
                source,
            })?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

/// Snapshots every seed on a fixed pool of workers
///
/// Creates a timestamped run directory under `config.output_dir` with one
/// `thread_<i>` directory per worker; each worker snapshots its share of the
/// seeds into `thread_<i>/<domain>/` and records them in `thread_<i>/log.txt`.
pub fn run_fanout(
    urls: &[String],
    transport: Arc<dyn Transport>,
    workers: usize,
    config: &FanoutConfig,
) -> Result<FanoutRun, CrawlerError> {
    if workers == 0 {
        return Err(CrawlerError::InvalidWorkerCount(workers));
    }

    let plan = PartitionPlan::new(urls.len(), workers);
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    let run_dir = config
        .output_dir
        .join(format!("run_{}_threads_{}", timestamp, plan.worker_count()));

    for (worker_id, _) in plan.iter() {
        fs::create_dir_all(run_dir.join(format!("thread_{}", worker_id)))?;
    }
    tracing::info!(
        "Fan-out of {} seeds with {} workers into {}",
        urls.len(),
        plan.worker_count(),
        run_dir.display()
    );

    let crawler = FanoutCrawler::new(transport, config);
    let mut indexed: Vec<(usize, SeedOutcome)> = thread::scope(|scope| {
        let handles: Vec<_> = plan
            .iter()
            .map(|(worker_id, range)| {
                let crawler = &crawler;
                let thread_dir = run_dir.join(format!("thread_{}", worker_id));
                scope.spawn(move || {
                    let mut log = String::new();
                    let outcomes = range
                        .map(|index| {
                            let seed = &urls[index];
                            let outcome = snapshot_seed(crawler, worker_id, &thread_dir, seed);
                            log.push_str(&log_line(seed, &outcome));
                            (index, outcome)
                        })
                        .collect::<Vec<_>>();

                    let log_path = thread_dir.join("log.txt");
                    if let Err(e) = fs::write(&log_path, log) {
                        tracing::warn!("Failed to write {}: {}", log_path.display(), e);
                    }
                    outcomes
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|handle| {
                handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    });

    indexed.sort_by_key(|(index, _)| *index);
    Ok(FanoutRun {
        run_dir,
        outcomes: indexed.into_iter().map(|(_, outcome)| outcome).collect(),
    })
}

/// Times one fan-out run per worker count over the same seeds
///
/// Each run gets its own run directory, so earlier snapshots are kept.
pub fn compare_fanout(
    urls: &[String],
    transport: Arc<dyn Transport>,
    counts: &[usize],
    config: &FanoutConfig,
) -> Result<TimingReport, CrawlerError> {
    let mut runs = Vec::with_capacity(counts.len());
    for &count in counts {
        tracing::info!("{} thread fan-out test starting", count);
        let start = Instant::now();
        let run = run_fanout(urls, Arc::clone(&transport), count, config)?;
        let elapsed = start.elapsed();
        tracing::info!(
            "{} thread fan-out test completed in {:.2}s ({} saved)",
            count,
            elapsed.as_secs_f64(),
            run.saved_count()
        );
        runs.push((count, elapsed));
    }

    Ok(TimingReport::new(urls.len(), runs))
}

fn log_line(seed: &str, outcome: &SeedOutcome) -> String {
    match outcome {
        SeedOutcome::Saved(snapshot) => format!(
            "Processing URL: {} -> saved ({} assets, {} linked pages)\n",
            seed,
            snapshot.assets.len(),
            snapshot.linked_pages.len()
        ),
        SeedOutcome::Failed { error, .. } => {
            format!("Processing URL: {} -> failed: {}\n", seed, error)
        }
    }
}

fn snapshot_seed(
    crawler: &FanoutCrawler,
    worker_id: usize,
    thread_dir: &Path,
    seed: &str,
) -> SeedOutcome {
    match crawler.crawl(seed, &seed_directory(thread_dir, seed)) {
        Ok(snapshot) => SeedOutcome::Saved(snapshot),
        Err(e) => {
            tracing::error!("Worker {} failed on {}: {}", worker_id, seed, e);
            SeedOutcome::Failed {
                seed_url: seed.to_string(),
                error: e.to_string(),
            }
        }
    }
}

/// Directory for one seed inside a worker's directory
pub fn seed_directory(thread_dir: &Path, seed_url: &str) -> PathBuf {
    let domain = sanitize_file_name(domain_of(seed_url));
    if domain.is_empty() {
        thread_dir.join("unknown")
    } else {
        thread_dir.join(domain)
    }
}

/// Replaces every character outside `[A-Za-z0-9._-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for a downloaded asset, from the last segment of its path
///
/// Falls back to `asset_<n>` when the URL has no usable last segment.
pub fn asset_file_name(asset_url: &str, n: usize) -> String {
    let segment = match Url::parse(asset_url) {
        Ok(url) => url
            .path_segments()
            .and_then(|segments| segments.last())
            .map(str::to_string),
        Err(_) => strip_query(asset_url)
            .rsplit('/')
            .next()
            .map(str::to_string),
    };

    match segment.filter(|s| !s.is_empty()) {
        Some(segment) => sanitize_file_name(&segment),
        None => format!("asset_{}", n),
    }
}

/// Returns `name`, or `<stem>_<k><.ext>` with the smallest `k >= 2` not in `taken`
pub fn unique_file_name(name: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&name) {
        return name;
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), format!(".{}", ext)),
        _ => (name.clone(), String::new()),
    };
    (2..)
        .map(|k| format!("{}_{}{}", stem, k, ext))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or(name)
}

/// Asset URLs referenced by `markup`, resolved against `seed_url`
///
/// Stylesheet/script `<link>` tags come first, then `<script src>`, then
/// `<img src>`. Duplicates are dropped and at most `cap` URLs are returned.
pub fn find_asset_urls(markup: &str, seed_url: &str, cap: usize) -> Vec<String> {
    let document = Html::parse_document(markup);
    let sources = [
        ("link[href]", "href", STYLE_OR_SCRIPT),
        ("script[src]", "src", SCRIPT),
        ("img[src]", "src", IMAGE),
    ];

    let mut seen = HashSet::new();
    let mut assets = Vec::new();
    if cap == 0 {
        return assets;
    }

    for (css, attr, extensions) in sources {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(reference) = element.value().attr(attr).map(str::trim) else {
                continue;
            };
            if !has_extension(reference, extensions) {
                continue;
            }

            let resolved = normalize(reference, seed_url);
            if !resolved.is_empty() && seen.insert(resolved.clone()) {
                assets.push(resolved);
                if assets.len() >= cap {
                    return assets;
                }
            }
        }
    }

    assets
}

/// The first `cap` fetchable anchor targets in `markup`, resolved against `seed_url`
pub fn find_link_urls(markup: &str, seed_url: &str, cap: usize) -> Vec<String> {
    let document = Html::parse_document(markup);
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && is_fetchable(href))
        .map(|href| normalize(href, seed_url))
        .take(cap)
        .collect()
}

fn is_fetchable(href: &str) -> bool {
    !(href.starts_with('#')
        || href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:"))
}

fn strip_query(reference: &str) -> &str {
    reference
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(reference)
}

fn has_extension(reference: &str, extensions: &[&str]) -> bool {
    let path = strip_query(reference).to_ascii_lowercase();
    match path.rsplit_once('.') {
        Some((_, ext)) => extensions.contains(&ext),
        None => false,
    }
}
