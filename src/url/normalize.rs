use crate::{UrlError, UrlResult};
use url::Url;

/// Canonicalizes a URL into the form used as a page store key
///
/// # Canonicalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject anything that is not HTTP or HTTPS
/// 3. Reject URLs without a host
/// 4. Remove the fragment (everything after #)
///
/// Parsing already lowercases the host and turns an empty path into `/`, so
/// `https://Example.org` and `https://example.org/#top` share one key. Paths,
/// query strings and trailing slashes are kept as written: two spellings of a
/// path are two pages as far as the site is concerned.
///
/// # Examples
///
/// ```
/// use sitequery::url::canonicalize_url;
///
/// let url = canonicalize_url("https://EXAMPLE.org#intro").unwrap();
/// assert_eq!(url.as_str(), "https://example.org/");
/// ```
pub fn canonicalize_url(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    canonicalize_parsed(url)
}

/// Applies the canonicalization rules to an already parsed URL
pub fn canonicalize_parsed(mut url: Url) -> UrlResult<Url> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}
