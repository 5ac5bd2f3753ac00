//! Configuration module for Parallel-Crawler
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and reading the URL list a batch crawl runs over.
//!
//! # Example
//!
//! ```no_run
//! use parallel_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, FanoutConfig, HttpConfig, OutputConfig, OverrideEntry};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_url_list,
};
pub use validation::validate;
