//! Pattern-based field extraction from page markup
//!
//! The [`ExtractionEngine`] runs one rule per field over the raw markup.
//! Rules can be overridden per `(domain, field)` pair; overrides are checked
//! before the defaults on every extraction.

use crate::crawler::result::PageFields;
use crate::crawler::rules::{compile_pattern, default_rules, Cardinality, ExtractionRule, Field};
use crate::url::{domain_of, normalize};
use crate::PatternError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));

/// Fields found in a page plus the mode-specific success flag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub fields: PageFields,
    pub success: bool,
}

/// Rule engine that pulls structured fields out of markup
///
/// The engine is immutable during a crawl and shared by reference between
/// workers.
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    rules: Vec<ExtractionRule>,
    /// Domain, then field
    overrides: HashMap<String, HashMap<Field, Regex>>,
}

impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionEngine {
    /// Creates an engine with the default rule for every field
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
            overrides: HashMap::new(),
        }
    }

    /// Registers a replacement pattern for one field on one domain
    ///
    /// The pattern is compiled immediately, so malformed patterns are
    /// reported here rather than during extraction.
    ///
    /// # Example
    ///
    /// ```
    /// use parallel_crawler::crawler::ExtractionEngine;
    ///
    /// let mut engine = ExtractionEngine::new();
    /// engine
    ///     .set_override("shop.example.com", "price", r#"class="price">([^<]+)<"#)
    ///     .unwrap();
    ///
    /// let html = r#"<title>Item</title><span class="price">12 EUR</span>"#;
    /// let extraction = engine.extract(html, "https://shop.example.com/item", false);
    /// assert_eq!(extraction.fields.price, "12 EUR");
    /// ```
    pub fn set_override(
        &mut self,
        domain: &str,
        field: &str,
        pattern: &str,
    ) -> Result<(), PatternError> {
        let field: Field = field.parse()?;
        self.set_field_override(domain, field, pattern)
    }

    /// Typed variant of [`set_override`](Self::set_override)
    pub fn set_field_override(
        &mut self,
        domain: &str,
        field: Field,
        pattern: &str,
    ) -> Result<(), PatternError> {
        let regex = compile_pattern(field, pattern)?;
        tracing::debug!("Registered {} override for {}", field, domain);
        self.overrides
            .entry(domain.to_string())
            .or_default()
            .insert(field, regex);
        Ok(())
    }

    /// Number of registered overrides
    pub fn override_count(&self) -> usize {
        self.overrides.values().map(HashMap::len).sum()
    }

    /// Extracts fields from `markup` found at `source_url`
    ///
    /// Basic mode collects title, description, price and date; extended mode
    /// collects every field. Links and images are resolved against
    /// `source_url`, sorted and deduplicated.
    pub fn extract(&self, markup: &str, source_url: &str, extended: bool) -> Extraction {
        let domain_overrides = self.overrides.get(domain_of(source_url));
        let mut fields = PageFields::default();

        for rule in &self.rules {
            if !extended && rule.field.is_extended() {
                continue;
            }

            let pattern = domain_overrides
                .and_then(|overrides| overrides.get(&rule.field))
                .unwrap_or(&rule.pattern);
            match rule.cardinality {
                Cardinality::Single => {
                    let raw = first_match(pattern, markup);
                    let value = clean_single(rule.field, raw, source_url);
                    if let Some(slot) = single_slot(&mut fields, rule.field) {
                        *slot = value;
                    }
                }
                Cardinality::Multi => {
                    let raw = all_matches(pattern, markup);
                    let values = clean_multi(rule.field, raw, source_url);
                    if let Some(slot) = multi_slot(&mut fields, rule.field) {
                        *slot = values;
                    }
                }
            }
        }

        let success = if extended {
            fields.extended_success()
        } else {
            fields.basic_success()
        };

        Extraction { fields, success }
    }
}

/// Value of a match: first participating capture group, else the whole match
fn match_value<'h>(caps: &Captures<'h>) -> &'h str {
    if caps.len() > 1 {
        return (1..caps.len())
            .find_map(|i| caps.get(i))
            .map(|m| m.as_str())
            .unwrap_or("");
    }
    caps.get(0).map(|m| m.as_str()).unwrap_or("")
}

fn first_match<'h>(pattern: &Regex, markup: &'h str) -> &'h str {
    pattern
        .captures(markup)
        .map(|caps| match_value(&caps))
        .unwrap_or("")
}

fn all_matches<'h>(pattern: &Regex, markup: &'h str) -> Vec<&'h str> {
    pattern
        .captures_iter(markup)
        .map(|caps| match_value(&caps))
        .collect()
}

fn strip_tags(text: &str) -> String {
    TAG_PATTERN.replace_all(text, "").into_owned()
}

fn clean_text(field: Field, raw: &str) -> String {
    if field.strips_markup() {
        strip_tags(raw).trim().to_string()
    } else {
        raw.trim().to_string()
    }
}

fn clean_single(field: Field, raw: &str, source_url: &str) -> String {
    let value = clean_text(field, raw);
    if field == Field::Logo && !value.is_empty() {
        normalize(&value, source_url)
    } else {
        value
    }
}

fn clean_multi(field: Field, raw: Vec<&str>, source_url: &str) -> Vec<String> {
    match field {
        Field::Links | Field::Images => {
            let mut urls: Vec<String> = raw
                .into_iter()
                .map(str::trim)
                .filter(|href| field != Field::Links || !is_non_navigational(href))
                .map(|href| normalize(href, source_url))
                .filter(|url| !url.is_empty())
                .collect();
            urls.sort();
            urls.dedup();
            urls
        }
        _ => raw.into_iter().map(|text| clean_text(field, text)).collect(),
    }
}

/// Links that never lead to another document
fn is_non_navigational(href: &str) -> bool {
    href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with('#')
}

fn single_slot(fields: &mut PageFields, field: Field) -> Option<&mut String> {
    match field {
        Field::Title => Some(&mut fields.title),
        Field::Description => Some(&mut fields.description),
        Field::Price => Some(&mut fields.price),
        Field::Date => Some(&mut fields.date),
        Field::Keywords => Some(&mut fields.keywords),
        Field::Author => Some(&mut fields.author),
        Field::Logo => Some(&mut fields.logo),
        Field::Links | Field::Images | Field::Headings => None,
    }
}

fn multi_slot(fields: &mut PageFields, field: Field) -> Option<&mut Vec<String>> {
    match field {
        Field::Links => Some(&mut fields.links),
        Field::Images => Some(&mut fields.images),
        Field::Headings => Some(&mut fields.headings),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "http://x.com/p/q";

    fn extract(html: &str, extended: bool) -> Extraction {
        ExtractionEngine::new().extract(html, SOURCE, extended)
    }

    #[test]
    fn test_extract_title() {
        let result = extract("<html><head><title>Test Page</title></head></html>", false);
        assert_eq!(result.fields.title, "Test Page");
        assert!(result.success);
    }

    #[test]
    fn test_title_tags_stripped_and_trimmed() {
        let result = extract("<title>  <b>Bold</b> Title \n</title>", false);
        assert_eq!(result.fields.title, "Bold Title");
    }

    #[test]
    fn test_title_case_insensitive_and_multiline() {
        let result = extract("<TITLE lang=\"en\">Line one\nline two</TITLE>", false);
        assert_eq!(result.fields.title, "Line one\nline two");
    }

    #[test]
    fn test_extract_description() {
        let html = r#"<meta name="description" content="A <em>fine</em> page">"#;
        let result = extract(html, false);
        assert_eq!(result.fields.description, "A fine page");
        assert!(result.success);
    }

    #[test]
    fn test_extract_price_and_date() {
        let html = "<title>Shop</title><p>Now $ 1,299.50 until 2024-03-01</p>";
        let result = extract(html, false);
        assert_eq!(result.fields.price, "1,299.50");
        assert_eq!(result.fields.date, "2024-03-01");
    }

    #[test]
    fn test_trailing_dollar_price_uses_second_group() {
        let result = extract("<p>costs 45.00$</p>", false);
        assert_eq!(result.fields.price, "45.00");
    }

    #[test]
    fn test_basic_success_title_only() {
        let result = extract("<title>Only title</title>", false);
        assert!(result.success);
        assert!(result.fields.description.is_empty());
    }

    #[test]
    fn test_image_only_success_differs_by_mode() {
        let html = r#"<body><img src="/logo.png"></body>"#;
        assert!(!extract(html, false).success);

        let extended = extract(html, true);
        assert!(extended.success);
        assert_eq!(extended.fields.images, vec!["http://x.com/logo.png"]);
    }

    #[test]
    fn test_basic_mode_skips_extended_fields() {
        let html = r#"<title>T</title><a href="/a">A</a><h1>Head</h1>"#;
        let result = extract(html, false);
        assert!(result.fields.links.is_empty());
        assert!(result.fields.headings.is_empty());
    }

    #[test]
    fn test_links_deduplicated_and_sorted() {
        let html = r#"
            <a href="/b">B</a>
            <a href="/a">A</a>
            <a class="x" href="/a">A again</a>
        "#;
        let result = extract(html, true);
        assert_eq!(result.fields.links, vec!["http://x.com/a", "http://x.com/b"]);
    }

    #[test]
    fn test_links_skip_non_navigational() {
        let html = r##"
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:a@x.com">Mail</a>
            <a href="tel:+1">Call</a>
            <a href="#top">Top</a>
            <a href="">Empty</a>
            <a href="next.html">Next</a>
        "##;
        let result = extract(html, true);
        assert_eq!(result.fields.links, vec!["http://x.com/p/next.html"]);
    }

    #[test]
    fn test_absolute_links_unchanged() {
        let html = r#"<a href="https://other.com/page">Other</a>"#;
        let result = extract(html, true);
        assert_eq!(result.fields.links, vec!["https://other.com/page"]);
    }

    #[test]
    fn test_images_normalized_sorted() {
        let html = r#"<img src="z.png"><img alt="" src="/a.jpg"><img src="z.png">"#;
        let result = extract(html, true);
        assert_eq!(
            result.fields.images,
            vec!["http://x.com/a.jpg", "http://x.com/p/z.png"]
        );
    }

    #[test]
    fn test_headings_in_document_order() {
        let html = "<h2>Second <small>level</small></h2><h1> First </h1>";
        let result = extract(html, true);
        assert_eq!(result.fields.headings, vec!["Second level", "First"]);
    }

    #[test]
    fn test_logo_from_shortcut_icon() {
        let html = r#"<link rel="shortcut icon" href="/favicon.ico">"#;
        let result = extract(html, true);
        assert_eq!(result.fields.logo, "http://x.com/favicon.ico");
    }

    #[test]
    fn test_logo_from_icon() {
        let html = r#"<link type="image/png" rel="icon" href="img/icon.png">"#;
        let result = extract(html, true);
        assert_eq!(result.fields.logo, "http://x.com/p/img/icon.png");
    }

    #[test]
    fn test_meta_keywords_and_author() {
        let html = r#"<meta name="keywords" content="rust, crawler"><meta name="author" content=" Jo ">"#;
        let result = extract(html, true);
        assert_eq!(result.fields.keywords, "rust, crawler");
        assert_eq!(result.fields.author, "Jo");
        assert!(result.success);
    }

    #[test]
    fn test_empty_markup_fails() {
        assert!(!extract("", false).success);
        assert!(!extract("", true).success);
    }

    #[test]
    fn test_override_applies_only_to_its_domain() {
        let mut engine = ExtractionEngine::new();
        engine
            .set_override("x.com", "title", r"<h1>([^<]+)</h1>")
            .unwrap();

        let html = "<title>Default</title><h1>Override</h1>";
        assert_eq!(
            engine.extract(html, "http://x.com/", false).fields.title,
            "Override"
        );
        assert_eq!(
            engine.extract(html, "http://y.com/", false).fields.title,
            "Default"
        );
    }

    #[test]
    fn test_override_without_groups_uses_whole_match() {
        let mut engine = ExtractionEngine::new();
        engine
            .set_field_override("x.com", Field::Date, r"\d{2}\.\d{2}\.\d{4}")
            .unwrap();

        let result = engine.extract("<p>31.12.2023</p>", "http://x.com/a", false);
        assert_eq!(result.fields.date, "31.12.2023");
    }

    #[test]
    fn test_invalid_override_rejected_at_registration() {
        let mut engine = ExtractionEngine::new();
        let result = engine.set_override("x.com", "price", "([0-9]+");
        assert!(matches!(result, Err(PatternError::Invalid { .. })));
        assert_eq!(engine.override_count(), 0);
    }

    #[test]
    fn test_unknown_override_field_rejected() {
        let mut engine = ExtractionEngine::new();
        let result = engine.set_override("x.com", "colour", ".*");
        assert!(matches!(result, Err(PatternError::UnknownField(_))));
    }

    #[test]
    fn test_several_overrides_on_one_domain() {
        let mut engine = ExtractionEngine::new();
        engine
            .set_override("x.com", "title", r"<h1>([^<]+)</h1>")
            .unwrap();
        engine
            .set_override("x.com", "price", r#"data-cost="([^"]+)""#)
            .unwrap();
        engine
            .set_override("x.com", "price", r#"data-price="([^"]+)""#)
            .unwrap();
        engine
            .set_override("y.com", "title", r"<h2>([^<]+)</h2>")
            .unwrap();
        assert_eq!(engine.override_count(), 3);

        let html = r#"<title>T</title><h1>Head</h1><h2>Sub</h2><b data-price="7"></b>"#;
        let x = engine.extract(html, "http://x.com/item", false).fields;
        assert_eq!(x.title, "Head");
        assert_eq!(x.price, "7");

        let y = engine.extract(html, "http://y.com/item", false).fields;
        assert_eq!(y.title, "Sub");
        assert!(y.price.is_empty());
    }
}
