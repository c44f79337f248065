//! Configuration module for sitequery
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and resolving credentials from the process environment.
//!
//! # Example
//!
//! ```no_run
//! use sitequery::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitequery.toml")).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    AnswerConfig, Config, CrawlerConfig, OracleConfig, ReportConfig, StoreConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, require_credential,
};
