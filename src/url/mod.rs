//! URL handling module for sitequery
//!
//! This module provides URL canonicalization and the same-domain test that
//! scopes the crawl to the seed's hostname.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, is_same_domain};
pub use normalize::{canonicalize_parsed, canonicalize_url};

/// Canonicalizes a URL string, falling back to the trimmed input
///
/// Store keys must be stable even for URLs that fail to parse: such a URL
/// still becomes an error page under its literal spelling.
pub fn store_key(url_str: &str) -> String {
    canonicalize_url(url_str)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| url_str.trim().to_string())
}
