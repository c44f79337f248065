//! Storage module for persisting crawled pages
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Insert-or-replace persistence of pages keyed by URL
//! - Point lookups by URL and id, parent/child queries, full scans
//! - Crawl run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{PageStore, StorageError, StorageResult};

use crate::state::PageStatus;
use crate::SiteQueryError;
use chrono::{DateTime, Utc};
use std::path::Path;

/// Opens (or creates) the page store at the given path
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Store ready for reads and writes
/// * `Err(SiteQueryError)` - Failed to open database
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SiteQueryError> {
    Ok(SqliteStorage::new(path)?)
}

/// A crawled page, the central record of the store
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Opaque identifier assigned at fetch time
    pub id: String,

    /// Canonical absolute URL; unique within the store
    pub url: String,

    /// Extracted title, or the URL when the page has none
    pub title: String,

    /// Whitespace-collapsed main text; empty for error pages
    pub content: String,

    /// Deduplicated same-domain outbound links, in document order
    pub links: Vec<String>,

    pub is_root: bool,
    pub is_leaf: bool,

    /// Page that led the crawl here; absent for roots
    pub parent_id: Option<String>,

    /// Last computed relevance, in [0, 1]
    pub relevance_score: f64,

    pub metadata: PageMetadata,
}

/// Fetch bookkeeping attached to every page
#[derive(Debug, Clone, PartialEq)]
pub struct PageMetadata {
    pub last_visited: DateTime<Utc>,
    pub depth: u32,
    pub status: PageStatus,
    pub error: Option<String>,
}

impl Page {
    /// Builds the record stored for a page whose fetch failed
    ///
    /// Error pages are persisted like any other page so that a restarted
    /// crawl does not fetch them again.
    pub fn error_page(
        id: String,
        url: &str,
        parent_id: Option<&str>,
        depth: u32,
        error: impl Into<String>,
    ) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: url.to_string(),
            content: String::new(),
            links: Vec::new(),
            is_root: parent_id.is_none(),
            is_leaf: true,
            parent_id: parent_id.map(str::to_string),
            relevance_score: 0.0,
            metadata: PageMetadata {
                last_visited: Utc::now(),
                depth,
                status: PageStatus::Error,
                error: Some(error.into()),
            },
        }
    }

    pub fn depth(&self) -> u32 {
        self.metadata.depth
    }

    pub fn status(&self) -> PageStatus {
        self.metadata.status
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_fetched: u64,
    pub pages_reused: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
