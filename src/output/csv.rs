//! CSV report writer
//!
//! Cells are separated by `", "`. The extended report also produces
//! companion files next to the main one for links, images and headings.

use crate::crawler::CrawlResult;
use crate::output::traits::{OutputError, OutputResult, ReportSink};
use crate::url::{classify_link, domain_of};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const BASIC_HEADER: &str = "URL, Title, Description, Price, Date, Success, Error";
const EXTENDED_HEADER: &str = "URL, Title, Description, Price, Date, Keywords, Author, Logo, \
                               Links Count, Images Count, Headings Count, Success, Error";
const LINKS_HEADER: &str = "Source URL, Link URL, Link Type";
const IMAGES_HEADER: &str = "Source URL, Image URL, Is Relative";
const HEADINGS_HEADER: &str = "Source URL, Heading Text";

/// Quotes a field when it contains a comma, newline or double quote
///
/// Embedded quotes are doubled.
///
/// # Example
///
/// ```
/// use parallel_crawler::output::escape_csv_field;
///
/// assert_eq!(escape_csv_field("plain"), "plain");
/// assert_eq!(escape_csv_field("a, b"), "\"a, b\"");
/// assert_eq!(escape_csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
/// ```
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '\n', '"']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Strips leading `@` and whitespace control characters, then escapes
pub fn format_url_for_csv(url: &str) -> String {
    escape_csv_field(url.trim_start_matches(['@', ' ', '\t', '\r', '\n']))
}

/// Path of a companion file: `<stem><suffix>.csv` next to `path`
fn companion_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}.csv", stem, suffix))
}

fn flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Renders the main results table
pub fn render_results(results: &[CrawlResult], extended: bool) -> String {
    let mut out = String::new();
    out.push_str(if extended { EXTENDED_HEADER } else { BASIC_HEADER });
    out.push('\n');

    for result in results {
        let mut cells = vec![
            format_url_for_csv(&result.url),
            escape_csv_field(&result.title),
            escape_csv_field(&result.description),
            escape_csv_field(&result.price),
            escape_csv_field(&result.date),
        ];
        if extended {
            cells.push(escape_csv_field(&result.keywords));
            cells.push(escape_csv_field(&result.author));
            cells.push(escape_csv_field(&result.logo));
            cells.push(result.links.len().to_string());
            cells.push(result.images.len().to_string());
            cells.push(result.headings.len().to_string());
        }
        cells.push(flag(result.success).to_string());
        cells.push(escape_csv_field(&result.error));

        out.push_str(&cells.join(", "));
        out.push('\n');
    }
    out
}

/// Renders one row per link with its classification against the source page
pub fn render_links(results: &[CrawlResult]) -> String {
    let mut out = format!("{}\n", LINKS_HEADER);
    for result in results {
        let source_domain = domain_of(&result.url);
        for link in &result.links {
            let _ = writeln!(
                out,
                "{}, {}, {}",
                format_url_for_csv(&result.url),
                format_url_for_csv(link),
                classify_link(link, source_domain)
            );
        }
    }
    out
}

/// Renders one row per image; an image is relative when it has no scheme
pub fn render_images(results: &[CrawlResult]) -> String {
    let mut out = format!("{}\n", IMAGES_HEADER);
    for result in results {
        for image in &result.images {
            let relative = if image.contains("://") { "No" } else { "Yes" };
            let _ = writeln!(
                out,
                "{}, {}, {}",
                format_url_for_csv(&result.url),
                format_url_for_csv(image),
                relative
            );
        }
    }
    out
}

/// Renders one row per heading
pub fn render_headings(results: &[CrawlResult]) -> String {
    let mut out = format!("{}\n", HEADINGS_HEADER);
    for result in results {
        for heading in &result.headings {
            let _ = writeln!(
                out,
                "{}, {}",
                format_url_for_csv(&result.url),
                escape_csv_field(heading)
            );
        }
    }
    out
}

/// CSV report rooted at a main results file
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn links_path(&self) -> PathBuf {
        companion_path(&self.path, "_links")
    }

    pub fn images_path(&self) -> PathBuf {
        companion_path(&self.path, "_images")
    }

    pub fn headings_path(&self) -> PathBuf {
        companion_path(&self.path, "_headings")
    }

    /// Writes one file, creating its parent directory if needed
    fn write_file(path: &Path, content: &str) -> OutputResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)
            .map_err(|e| OutputError::Write(format!("{}: {}", path.display(), e)))
    }

    /// Writes a companion file; failures are logged and the file is skipped
    fn write_companion(path: PathBuf, content: &str, written: &mut Vec<PathBuf>) {
        match Self::write_file(&path, content) {
            Ok(()) => {
                tracing::info!("Saved {}", path.display());
                written.push(path);
            }
            Err(e) => tracing::error!("Skipping {}: {}", path.display(), e),
        }
    }
}

impl ReportSink for CsvReport {
    fn write_results(
        &self,
        results: &[CrawlResult],
        extended: bool,
    ) -> OutputResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        match Self::write_file(&self.path, &render_results(results, extended)) {
            Ok(()) => {
                tracing::info!("Results saved to {}", self.path.display());
                written.push(self.path.clone());
            }
            Err(e) => {
                tracing::error!("Failed to write {}: {}", self.path.display(), e);
                return Err(e);
            }
        }

        if !extended {
            return Ok(written);
        }

        if results.iter().any(|r| !r.links.is_empty()) {
            Self::write_companion(self.links_path(), &render_links(results), &mut written);
        }
        if results.iter().any(|r| !r.images.is_empty()) {
            Self::write_companion(self.images_path(), &render_images(results), &mut written);
        }
        if results.iter().any(|r| !r.headings.is_empty()) {
            Self::write_companion(
                self.headings_path(),
                &render_headings(results),
                &mut written,
            );
        }

        Ok(written)
    }
}
