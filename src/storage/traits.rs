//! Storage traits and error types
//!
//! This module defines the trait interface for page store backends and
//! associated error types.

use crate::state::PageStatus;
use crate::storage::{Page, RunRecord, RunStatus};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    PageNotFound(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for page store implementations
///
/// The crawl loop is the only writer, so implementations need no locking
/// beyond what their backend already provides.
pub trait PageStore {
    // ===== Pages =====

    /// Inserts a page, replacing any stored page with the same URL
    ///
    /// # Arguments
    ///
    /// * `page` - The page to persist; every field is written
    ///
    /// Putting the same URL twice leaves a single record holding the
    /// second page.
    fn put(&mut self, page: &Page) -> StorageResult<()>;

    /// Gets a page by URL
    ///
    /// # Arguments
    ///
    /// * `url` - The store key, as produced by `url::store_key`
    ///
    /// # Returns
    ///
    /// The stored page, or `None` if the URL was never stored
    fn get_by_url(&self, url: &str) -> StorageResult<Option<Page>>;

    /// Gets a page by id
    fn get_by_id(&self, id: &str) -> StorageResult<Option<Page>>;

    /// Gets every page whose parent is `parent_id`
    fn get_children(&self, parent_id: &str) -> StorageResult<Vec<Page>>;

    /// Gets every page that was a crawl seed
    fn get_root_pages(&self) -> StorageResult<Vec<Page>>;

    /// Gets every stored page, in store order
    fn get_all(&self) -> StorageResult<Vec<Page>>;

    /// Overwrites the relevance score of one page, leaving every other field alone
    ///
    /// # Arguments
    ///
    /// * `id` - Identifier of the stored page
    /// * `score` - New relevance score
    ///
    /// Fails with `StorageError::PageNotFound` when no page has that id.
    fn update_relevance(&mut self, id: &str, score: f64) -> StorageResult<()>;

    // ===== Statistics =====

    /// Gets total page count
    fn count_pages(&self) -> StorageResult<u64>;

    /// Counts pages by fetch status
    fn count_pages_by_status(&self, status: PageStatus) -> StorageResult<u64>;

    /// Counts pages without outbound links
    fn count_leaf_pages(&self) -> StorageResult<u64>;

    /// Gets page count breakdown by depth
    fn get_depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `seed_url` - URL the run starts from
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run, marked running
    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64>;

    /// Records the final status and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u64,
        pages_reused: u64,
    ) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
