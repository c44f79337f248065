use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitequery::url::extract_domain;
///
/// let url = Url::parse("https://example.org/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.org".to_string()));
///
/// let url = Url::parse("https://EXAMPLE.ORG:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.org".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns true if both URLs carry the same hostname
///
/// Only the hostname is compared: scheme and port may differ. Subdomains are
/// different hosts, so `blog.example.org` is not the same domain as
/// `example.org`.
pub fn is_same_domain(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
