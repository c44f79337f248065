//! Sitequery: crawl a website, rank its pages against questions, and ask an
//! answer oracle to extract the answers.
//!
//! The crate has two phases. The crawl phase walks a site breadth-first and
//! persists every visited page in a [`storage::PageStore`]. The answer phase
//! ranks the stored pages per question with a [`scoring::RelevanceScorer`]
//! and asks an [`oracle::AnswerOracle`] to confirm an answer page by page.

pub mod answer;
pub mod config;
pub mod crawler;
pub mod oracle;
pub mod output;
pub mod report;
pub mod scoring;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for sitequery operations
#[derive(Debug, Error)]
pub enum SiteQueryError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] oracle::OracleError),

    #[error("Invalid question transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::QuestionStatus,
        to: state::QuestionStatus,
    },

    #[error("Invalid question batch: {0}")]
    QuestionBatch(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Report rejected with HTTP {status}: {message}")]
    Report { status: u16, message: String },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Missing [{0}] section in configuration")]
    MissingSection(&'static str),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for sitequery operations
pub type Result<T> = std::result::Result<T, SiteQueryError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use answer::{AnswerSheet, Question, QuestionAnswerer};
pub use config::Config;
pub use crawler::{Crawler, PageFetcher};
pub use scoring::RelevanceScorer;
pub use state::{PageStatus, QuestionStatus};
pub use storage::{Page, PageStore, SqliteStorage};
