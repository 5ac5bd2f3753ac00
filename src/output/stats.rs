//! Statistics over a finished batch
//!
//! This module summarizes crawl results for display at the end of a run.

use crate::crawler::{CrawlResult, PARSE_FAILURE};
use crate::url::domain_of;
use std::collections::HashSet;

/// Crawl statistics summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of URLs in the batch
    pub total_urls: usize,

    /// Results marked successful
    pub succeeded: usize,

    /// Results whose fetch failed
    pub fetch_failures: usize,

    /// Pages fetched but yielding no fields of interest
    pub extraction_failures: usize,

    pub total_links: usize,
    pub total_images: usize,
    pub total_headings: usize,

    /// Distinct domains among the input URLs
    pub unique_domains: usize,
}

impl CrawlStatistics {
    /// Computes statistics from a batch of results
    pub fn from_results(results: &[CrawlResult]) -> Self {
        let mut stats = Self {
            total_urls: results.len(),
            ..Self::default()
        };
        let mut domains = HashSet::new();

        for result in results {
            domains.insert(domain_of(&result.url));

            if result.success {
                stats.succeeded += 1;
            } else if result.error == PARSE_FAILURE {
                stats.extraction_failures += 1;
            } else {
                stats.fetch_failures += 1;
            }

            stats.total_links += result.links.len();
            stats.total_images += result.images.len();
            stats.total_headings += result.headings.len();
        }

        stats.unique_domains = domains.len();
        stats
    }

    /// Share of URLs processed successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_urls > 0 {
            (self.succeeded as f64 / self.total_urls as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs: {}", stats.total_urls);
    println!("  Unique domains: {}", stats.unique_domains);
    println!();

    println!("Outcomes:");
    println!("  Succeeded: {}", stats.succeeded);
    println!("  Fetch failures: {}", stats.fetch_failures);
    println!("  Extraction failures: {}", stats.extraction_failures);
    println!();

    if stats.total_links + stats.total_images + stats.total_headings > 0 {
        println!("Extended Fields:");
        println!("  Links found: {}", stats.total_links);
        println!("  Images found: {}", stats.total_images);
        println!("  Headings found: {}", stats.total_headings);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} URLs successfully processed)",
        stats.success_rate(),
        stats.succeeded,
        stats.total_urls
    );
}
