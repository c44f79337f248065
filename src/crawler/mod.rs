//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching that encodes failures as error pages
//! - HTML parsing: title, main text and same-domain link extraction
//! - The breadth-first frontier with its visited set
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{run_crawl, CrawlReport, Crawler};
pub use fetcher::{build_http_client, PageFetcher};
pub use frontier::{Frontier, FrontierEntry};
pub use parser::{parse_html, ParsedPage};
