use crate::url::domain::domain_of;

const DEFAULT_PROTOCOL: &str = "http://";

/// Resolves a possibly-relative URL against the URL of the page it was found on
///
/// # Resolution Rules
///
/// 1. Empty input resolves to an empty string
/// 2. Anything containing `://` is already absolute and returned unchanged
/// 3. Root-relative input (`/a/b`) is joined to the base's protocol and domain
/// 4. Anything else is document-relative and appended to the base's
///    directory (the base truncated after its last `/` past the domain)
///
/// The base protocol defaults to `http://` when the base has none.
///
/// # Examples
///
/// ```
/// use parallel_crawler::url::normalize;
///
/// assert_eq!(normalize("/a/b", "http://x.com/p/q"), "http://x.com/a/b");
/// assert_eq!(normalize("a/b", "http://x.com/p/q"), "http://x.com/p/a/b");
/// assert_eq!(normalize("http://y.com/z", "http://x.com/p"), "http://y.com/z");
/// assert_eq!(normalize("", "http://x.com/"), "");
/// ```
pub fn normalize(url: &str, base_url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }

    if url.contains("://") {
        return url.to_string();
    }

    let scheme_end = base_url.find("://").map(|pos| pos + 3);
    let protocol = match scheme_end {
        Some(end) => &base_url[..end],
        None => DEFAULT_PROTOCOL,
    };

    if url.starts_with('/') {
        return format!("{}{}{}", protocol, domain_of(base_url), url);
    }

    format!("{}{}", base_path(base_url, scheme_end.unwrap_or(0)), url)
}

/// Returns the directory part of `base_url`, always ending in `/`
fn base_path(base_url: &str, domain_start: usize) -> String {
    let Some(domain_end) = base_url[domain_start..].find('/').map(|i| i + domain_start) else {
        return format!("{}/", base_url);
    };

    match base_url.rfind('/') {
        Some(last_slash) if last_slash >= domain_end => base_url[..=last_slash].to_string(),
        _ => format!("{}/", base_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_relative() {
        assert_eq!(normalize("/a/b", "http://x.com/p/q"), "http://x.com/a/b");
    }

    #[test]
    fn test_document_relative() {
        assert_eq!(normalize("a/b", "http://x.com/p/q"), "http://x.com/p/a/b");
    }

    #[test]
    fn test_absolute_unchanged() {
        assert_eq!(normalize("http://y.com/z", "http://x.com/p"), "http://y.com/z");
        assert_eq!(
            normalize("https://y.com/z?q=1", "http://x.com/p"),
            "https://y.com/z?q=1"
        );
    }

    #[test]
    fn test_empty_url() {
        assert_eq!(normalize("", "http://x.com/p/q"), "");
        assert_eq!(normalize("", ""), "");
    }

    #[test]
    fn test_base_without_path() {
        assert_eq!(normalize("a.html", "http://x.com"), "http://x.com/a.html");
        assert_eq!(normalize("/a.html", "http://x.com"), "http://x.com/a.html");
    }

    #[test]
    fn test_base_with_trailing_slash() {
        assert_eq!(normalize("a.html", "http://x.com/"), "http://x.com/a.html");
        assert_eq!(
            normalize("c.png", "https://x.com/dir/sub/"),
            "https://x.com/dir/sub/c.png"
        );
    }

    #[test]
    fn test_protocol_preserved() {
        assert_eq!(normalize("/img.png", "https://secure.com/a"), "https://secure.com/img.png");
    }

    #[test]
    fn test_base_without_scheme_defaults_to_http() {
        assert_eq!(normalize("/a", "x.com/p"), "http:///a");
        assert_eq!(normalize("b", "x.com/p/q"), "x.com/p/b");
    }

    #[test]
    fn test_query_string_in_relative_url() {
        assert_eq!(
            normalize("page?id=2", "http://x.com/list/index.html"),
            "http://x.com/list/page?id=2"
        );
    }
}
