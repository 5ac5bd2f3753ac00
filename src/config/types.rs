use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Parallel-Crawler
///
/// Every section is optional in the file; missing sections take their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub http: HttpConfig,
    pub fanout: FanoutConfig,
    pub output: OutputConfig,
    #[serde(rename = "override")]
    pub overrides: Vec<OverrideEntry>,
}

/// Batch crawl behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Number of worker threads
    pub workers: usize,

    /// Extract the extended field set (keywords, links, images, ...)
    pub extended: bool,

    /// Process the batch sequentially on the calling thread
    #[serde(rename = "single-threaded")]
    pub single_threaded: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            extended: false,
            single_threaded: false,
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Total request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Extra headers sent with every request
    pub headers: BTreeMap<String, String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "ParallelCrawler/1.0".to_string(),
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_redirects: 10,
            headers: BTreeMap::new(),
        }
    }
}

impl HttpConfig {
    /// Returns a copy that also sends the headers a desktop browser would
    ///
    /// Headers already configured are kept as they are.
    pub fn with_browser_headers(&self) -> Self {
        let mut config = self.clone();
        let browser = [
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
        ];
        for (name, value) in browser {
            config
                .headers
                .entry(name.to_string())
                .or_insert_with(|| value.to_string());
        }
        config
    }
}

/// Fan-out snapshot limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FanoutConfig {
    /// Maximum number of assets saved per seed page
    #[serde(rename = "max-assets")]
    pub max_assets: usize,

    /// Maximum number of outbound pages saved per seed page
    #[serde(rename = "max-links")]
    pub max_links: usize,

    /// Directory under which run directories are created
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,
}

impl Default for FanoutConfig {
    fn default() -> Self {
        Self {
            max_assets: 10,
            max_links: 2,
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the main results CSV file
    #[serde(rename = "results-path")]
    pub results_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            results_path: "data/results.csv".to_string(),
        }
    }
}

/// Per-domain extraction pattern override
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideEntry {
    /// Domain the override applies to (e.g., "shop.example.com")
    pub domain: String,

    /// Field name, e.g. "price"
    pub field: String,

    /// Regular expression replacing the default pattern
    pub pattern: String,
}
