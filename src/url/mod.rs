//! URL handling module for Parallel-Crawler
//!
//! This module provides domain extraction, relative-to-absolute URL
//! resolution, and link classification for reports.

mod domain;
mod normalize;

use std::fmt;

// Re-export main functions
pub use domain::domain_of;
pub use normalize::normalize;

/// Link classification types, derived per link at report time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkKind {
    /// `javascript:` pseudo-link
    JavaScript,
    /// `mailto:` link
    Email,
    /// `tel:` link
    Telephone,
    /// In-page anchor (`#section`)
    Anchor,
    /// Root-relative path (`/about`)
    RelativeRoot,
    /// Document-relative path (`about.html`)
    Relative,
    /// Absolute link to the source page's domain
    Internal,
    /// Absolute link to another domain
    External,
}

impl LinkKind {
    /// Returns the label used in link reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::JavaScript => "JavaScript",
            Self::Email => "Email",
            Self::Telephone => "Telephone",
            Self::Anchor => "Anchor",
            Self::RelativeRoot => "Relative (Root)",
            Self::Relative => "Relative",
            Self::Internal => "Internal",
            Self::External => "External",
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a link relative to the domain of the page it was found on
///
/// Checks are applied in the following priority order:
/// 1. `javascript:` prefix
/// 2. `mailto:` prefix
/// 3. `tel:` prefix
/// 4. Leading `#`
/// 5. Leading `/`
/// 6. No `://` separator
/// 7. Same domain as the source page (Internal) or not (External)
///
/// # Examples
///
/// ```
/// use parallel_crawler::url::{classify_link, LinkKind};
///
/// assert_eq!(classify_link("#top", "x.com"), LinkKind::Anchor);
/// assert_eq!(classify_link("http://x.com/a", "x.com"), LinkKind::Internal);
/// assert_eq!(classify_link("http://y.com/a", "x.com"), LinkKind::External);
/// ```
pub fn classify_link(link: &str, source_domain: &str) -> LinkKind {
    if link.starts_with("javascript:") {
        LinkKind::JavaScript
    } else if link.starts_with("mailto:") {
        LinkKind::Email
    } else if link.starts_with("tel:") {
        LinkKind::Telephone
    } else if link.starts_with('#') {
        LinkKind::Anchor
    } else if link.starts_with('/') {
        LinkKind::RelativeRoot
    } else if !link.contains("://") {
        LinkKind::Relative
    } else if domain_of(link) == source_domain {
        LinkKind::Internal
    } else {
        LinkKind::External
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_anchor() {
        assert_eq!(classify_link("#top", "x.com"), LinkKind::Anchor);
    }

    #[test]
    fn test_classify_internal() {
        assert_eq!(classify_link("http://x.com/a", "x.com"), LinkKind::Internal);
    }

    #[test]
    fn test_classify_external() {
        assert_eq!(classify_link("http://y.com/a", "x.com"), LinkKind::External);
    }

    #[test]
    fn test_classify_schemes() {
        assert_eq!(
            classify_link("javascript:void(0)", "x.com"),
            LinkKind::JavaScript
        );
        assert_eq!(classify_link("mailto:a@x.com", "x.com"), LinkKind::Email);
        assert_eq!(classify_link("tel:+123", "x.com"), LinkKind::Telephone);
    }

    #[test]
    fn test_classify_relative() {
        assert_eq!(classify_link("/about", "x.com"), LinkKind::RelativeRoot);
        assert_eq!(classify_link("about.html", "x.com"), LinkKind::Relative);
    }

    #[test]
    fn test_priority_javascript_over_relative() {
        // No "://" in either, but the scheme prefix wins
        assert_eq!(
            classify_link("javascript:go('/x')", "x.com"),
            LinkKind::JavaScript
        );
    }

    #[test]
    fn test_subdomain_is_external() {
        assert_eq!(
            classify_link("https://blog.x.com/post", "x.com"),
            LinkKind::External
        );
    }

    #[test]
    fn test_port_changes_domain() {
        assert_eq!(
            classify_link("http://x.com:8080/a", "x.com"),
            LinkKind::External
        );
    }

    #[test]
    fn test_labels() {
        assert_eq!(LinkKind::RelativeRoot.to_string(), "Relative (Root)");
        assert_eq!(LinkKind::Internal.label(), "Internal");
    }
}
