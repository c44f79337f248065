//! HTML parser for extracting page text, title and links
//!
//! This module turns a fetched document into the three things a page record
//! needs:
//! - The title (first `<title>` element)
//! - The main text (`<main>` when present and non-empty, else `<body>`),
//!   whitespace-collapsed
//! - Same-domain links from `<a href>` tags, resolved and deduplicated

use crate::url::{canonicalize_parsed, is_same_domain};
use scraper::{node::Node, ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Elements whose text is never page content
const SKIPPED_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    /// The page title (from the `<title>` tag)
    pub title: Option<String>,

    /// Whitespace-collapsed main text
    pub content: String,

    /// Same-domain links found on the page, in document order
    pub links: Vec<String>,
}

/// Parses HTML content and extracts title, text and links
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags anywhere in the document, resolved against
///   `base_url`, fragment removed
///
/// **Exclude:**
/// - Fragment-only hrefs (`#section`)
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - Non-HTTP(S) URLs after resolution
/// - Any URL whose host differs from `base_url`'s host
/// - Repeats of a URL already collected
///
/// # Example
///
/// ```
/// use sitequery::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        content: extract_content(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| collapse_whitespace(&element.text().collect::<String>()))
        .filter(|s| !s.is_empty())
}

/// Extracts the main text of the document
fn extract_content(document: &Html) -> String {
    for region in ["main", "body"] {
        let Ok(selector) = Selector::parse(region) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return text;
            }
        }
    }

    element_text(document.root_element())
}

/// Collects the visible text below an element, whitespace-collapsed
fn element_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(element, &mut raw);
    collapse_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                // adjacent block elements must not glue their words together
                out.push(' ');
            }
            Node::Element(el) if SKIPPED_TEXT_ELEMENTS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts all same-domain links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();
    let mut seen = HashSet::new();

    let Ok(a_selector) = Selector::parse("a[href]") else {
        return links;
    };

    for element in document.select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(absolute_url) = resolve_link(href, base_url) else {
            continue;
        };
        if !is_same_domain(&absolute_url, base_url) {
            continue;
        }

        let link = absolute_url.to_string();
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}

/// Resolves a link href to a canonical absolute URL
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if ["javascript:", "mailto:", "tel:", "data:"]
        .iter()
        .any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    canonicalize_parsed(absolute_url).ok()
}
