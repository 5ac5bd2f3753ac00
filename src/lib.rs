//! Parallel-Crawler: a batch page harvester
//!
//! This crate fetches a list of URLs on a fixed pool of worker threads,
//! extracts structured fields (title, description, price, links, ...) from
//! each page with a pattern-based rule engine, and aggregates the results in
//! input order. A separate fan-out mode snapshots a seed page together with a
//! bounded number of its assets and outbound links.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for Parallel-Crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Fetch error for {url}: {source}")]
    Fetch { url: String, source: FetchError },

    #[error("Worker count must be at least 1, got {0}")]
    InvalidWorkerCount(usize),

    #[error("Result slot {index} is out of range (batch size {len})")]
    SlotOutOfRange { index: usize, len: usize },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while registering extraction patterns
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Unknown extraction field: {0}")]
    UnknownField(String),

    #[error("Invalid pattern for field '{field}': {source}")]
    Invalid {
        field: String,
        source: regex::Error,
    },
}

/// Transport failures, surfaced as text on a failed crawl result
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to read response body: {0}")]
    Body(String),
}

/// Result type alias for Parallel-Crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlDispatcher, CrawlResult, ExtractionEngine, FanoutCrawler, Transport};
pub use crate::url::{classify_link, domain_of, normalize, LinkKind};
