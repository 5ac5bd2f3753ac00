/// Extracts the domain portion of a URL string
///
/// The domain is everything between the `://` scheme separator and the next
/// `/` (or the end of the string). No case folding or port stripping is
/// applied. Strings without a scheme separator have no domain.
///
/// # Examples
///
/// ```
/// use parallel_crawler::url::domain_of;
///
/// assert_eq!(domain_of("https://example.com/path"), "example.com");
/// assert_eq!(domain_of("http://Example.COM:8080"), "Example.COM:8080");
/// assert_eq!(domain_of("/relative/path"), "");
/// ```
pub fn domain_of(url: &str) -> &str {
    let Some(pos) = url.find("://") else {
        return "";
    };

    let rest = &url[pos + 3..];
    match rest.find('/') {
        Some(end) => &rest[..end],
        None => rest,
    }
}
