//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the PageStore trait.

use crate::state::PageStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStore, StorageError, StorageResult};
use crate::storage::{Page, PageMetadata, RunRecord, RunStatus};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;

const PAGE_COLUMNS: &str = "id, url, title, content, links, is_root, is_leaf, parent_id,
     relevance_score, last_visited, depth, status, error";

const RUN_COLUMNS: &str =
    "id, seed_url, started_at, finished_at, config_hash, status, pages_fetched, pages_reused";

/// SQLite storage backend
///
/// Pages live in the `pages` table keyed by URL, with their links kept as a
/// JSON array. Crawl runs live in `crawl_runs`.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Opens or creates the database and initializes the schema.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database or create the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn query_pages<P: rusqlite::Params>(&self, sql: &str, params: P) -> StorageResult<Vec<Page>> {
        let mut stmt = self.conn.prepare(sql)?;
        let pages = stmt
            .query_map(params, row_to_page)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(pages)
    }

    fn query_page<P: rusqlite::Params>(&self, sql: &str, params: P) -> StorageResult<Option<Page>> {
        let page = self.conn.query_row(sql, params, row_to_page).optional()?;
        Ok(page)
    }
}

fn conversion_error<E>(index: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

/// Maps a `PAGE_COLUMNS` row back to a page
fn row_to_page(row: &Row<'_>) -> rusqlite::Result<Page> {
    let links_json: String = row.get(4)?;
    let links: Vec<String> =
        serde_json::from_str(&links_json).map_err(|e| conversion_error(4, e))?;

    let last_visited: String = row.get(9)?;
    let last_visited = DateTime::parse_from_rfc3339(&last_visited)
        .map_err(|e| conversion_error(9, e))?
        .with_timezone(&Utc);

    Ok(Page {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        links,
        is_root: row.get(5)?,
        is_leaf: row.get(6)?,
        parent_id: row.get(7)?,
        relevance_score: row.get(8)?,
        metadata: PageMetadata {
            last_visited,
            depth: row.get(10)?,
            status: PageStatus::from_db_string(&row.get::<_, String>(11)?)
                .unwrap_or(PageStatus::Error),
            error: row.get(12)?,
        },
    })
}

fn row_to_run(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?).unwrap_or(RunStatus::Failed),
        pages_fetched: row.get::<_, i64>(6)? as u64,
        pages_reused: row.get::<_, i64>(7)? as u64,
    })
}

impl PageStore for SqliteStorage {
    // ===== Pages =====

    fn put(&mut self, page: &Page) -> StorageResult<()> {
        let links = serde_json::to_string(&page.links)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO web_pages
             (id, url, title, content, links, is_root, is_leaf, parent_id,
              relevance_score, last_visited, depth, status, error)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                page.id,
                page.url,
                page.title,
                page.content,
                links,
                page.is_root,
                page.is_leaf,
                page.parent_id,
                page.relevance_score,
                page.metadata.last_visited.to_rfc3339(),
                page.metadata.depth,
                page.metadata.status.to_db_string(),
                page.metadata.error,
            ],
        )?;
        Ok(())
    }

    fn get_by_url(&self, url: &str) -> StorageResult<Option<Page>> {
        self.query_page(
            &format!("SELECT {} FROM web_pages WHERE url = ?1", PAGE_COLUMNS),
            params![url],
        )
    }

    fn get_by_id(&self, id: &str) -> StorageResult<Option<Page>> {
        self.query_page(
            &format!("SELECT {} FROM web_pages WHERE id = ?1", PAGE_COLUMNS),
            params![id],
        )
    }

    fn get_children(&self, parent_id: &str) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!(
                "SELECT {} FROM web_pages WHERE parent_id = ?1 ORDER BY rowid",
                PAGE_COLUMNS
            ),
            params![parent_id],
        )
    }

    fn get_root_pages(&self) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!(
                "SELECT {} FROM web_pages WHERE is_root = 1 ORDER BY rowid",
                PAGE_COLUMNS
            ),
            [],
        )
    }

    fn get_all(&self) -> StorageResult<Vec<Page>> {
        self.query_pages(
            &format!("SELECT {} FROM web_pages ORDER BY rowid", PAGE_COLUMNS),
            [],
        )
    }

    fn update_relevance(&mut self, id: &str, score: f64) -> StorageResult<()> {
        let changed = self.conn.execute(
            "UPDATE web_pages SET relevance_score = ?1 WHERE id = ?2",
            params![score, id],
        )?;
        if changed == 0 {
            return Err(StorageError::PageNotFound(id.to_string()));
        }
        Ok(())
    }

    // ===== Statistics =====

    fn count_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM web_pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_pages_by_status(&self, status: PageStatus) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM web_pages WHERE status = ?1",
            params![status.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_leaf_pages(&self) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM web_pages WHERE is_leaf = 1",
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn get_depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT depth, COUNT(*) FROM web_pages GROUP BY depth ORDER BY depth")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
        })?;

        let mut breakdown = BTreeMap::new();
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count);
        }

        Ok(breakdown)
    }

    // ===== Run Management =====

    fn create_run(&mut self, seed_url: &str, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (seed_url, started_at, config_hash, status) VALUES (?1, ?2, ?3, ?4)",
            params![seed_url, now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_fetched: u64,
        pages_reused: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3, pages_reused = ?4
             WHERE id = ?5",
            params![
                status.to_db_string(),
                now,
                pages_fetched as i64,
                pages_reused as i64,
                run_id
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                row_to_run,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                row_to_run,
            )
            .optional()?;
        Ok(run)
    }
}
