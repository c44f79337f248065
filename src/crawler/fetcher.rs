//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent and redirect bound
//! - GET requests to fetch page content
//! - Turning every failure into a stored error page

use crate::config::CrawlerConfig;
use crate::crawler::parser::parse_html;
use crate::state::PageStatus;
use crate::storage::{Page, PageMetadata};
use crate::url::{canonicalize_url, store_key};
use chrono::Utc;
use reqwest::{header, redirect::Policy, Client};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Builds an HTTP client with proper configuration
///
/// Redirects are followed up to `max_redirects` hops. No timeout is set
/// unless `request_timeout_secs` is configured.
///
/// # Example
///
/// ```no_run
/// use sitequery::config::CrawlerConfig;
/// use sitequery::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlerConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlerConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.as_str())
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true);

    if let Some(secs) = config.request_timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    builder.build()
}

/// Fetches pages and turns them into page records
///
/// The fetcher holds no state besides its HTTP client and never touches
/// the store.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    /// Creates a fetcher with a client built from the crawler config
    pub fn new(config: &CrawlerConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches a URL and builds its page record
    ///
    /// Never fails: network errors, non-2xx/3xx final statuses and
    /// unparseable URLs all come back as a page with status `error`, empty
    /// content and links, and the message in `metadata.error`.
    ///
    /// # Request Flow
    ///
    /// 1. Canonicalize the URL; a malformed URL becomes an error page
    /// 2. Send GET request, following redirects up to the configured bound
    /// 3. Treat any final 2xx or 3xx status as success
    /// 4. Extract title, main text and same-domain links
    ///
    /// # Arguments
    ///
    /// * `url` - URL to fetch; its canonical form becomes the store key
    /// * `parent_id` - Id of the page linking here, `None` for a seed
    /// * `depth` - Link distance from the seed
    pub async fn fetch(&self, url: &str, parent_id: Option<&str>, depth: u32) -> Page {
        let id = Uuid::new_v4().to_string();

        let target = match canonicalize_url(url) {
            Ok(target) => target,
            Err(e) => {
                warn!("Skipping malformed URL {}: {}", url, e);
                return Page::error_page(id, &store_key(url), parent_id, depth, e.to_string());
            }
        };
        let key = target.to_string();

        debug!("Fetching {} (depth {})", key, depth);

        let response = match self
            .client
            .get(target.clone())
            .header(header::ACCEPT, "text/html,application/xhtml+xml,*/*;q=0.8")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let message = describe_request_error(&e);
                warn!("Failed to fetch {}: {}", key, message);
                return Page::error_page(id, &key, parent_id, depth, message);
            }
        };

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            warn!("Failed to fetch {}: HTTP {}", key, status.as_u16());
            return Page::error_page(
                id,
                &key,
                parent_id,
                depth,
                format!("HTTP {}", status.as_u16()),
            );
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to read body of {}: {}", key, e);
                return Page::error_page(id, &key, parent_id, depth, e.to_string());
            }
        };

        let parsed = parse_html(&body, &target);
        debug!(
            "Parsed {}: {} chars of text, {} links",
            key,
            parsed.content.len(),
            parsed.links.len()
        );

        Page {
            id,
            title: parsed.title.unwrap_or_else(|| key.clone()),
            url: key,
            content: parsed.content,
            is_root: parent_id.is_none(),
            is_leaf: parsed.links.is_empty(),
            links: parsed.links,
            parent_id: parent_id.map(str::to_string),
            relevance_score: 0.0,
            metadata: PageMetadata {
                last_visited: Utc::now(),
                depth,
                status: PageStatus::Processed,
                error: None,
            },
        }
    }
}

/// Classifies a transport error into a short message
fn describe_request_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_redirect() {
        format!("Too many redirects: {}", e)
    } else if e.is_connect() {
        format!("Connection failed: {}", e)
    } else {
        e.to_string()
    }
}
