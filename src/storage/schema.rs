//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the sitequery page store.

/// SQL schema for the database
///
/// `parent_id` is a plain column rather than a foreign key: re-fetching a
/// parent replaces its row, and children must survive that.
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    pages_reused INTEGER NOT NULL DEFAULT 0
);

-- One row per crawled page
CREATE TABLE IF NOT EXISTS web_pages (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    links TEXT NOT NULL DEFAULT '[]',
    is_root INTEGER NOT NULL,
    is_leaf INTEGER NOT NULL,
    parent_id TEXT,
    relevance_score REAL NOT NULL DEFAULT 0,
    last_visited TEXT NOT NULL,
    depth INTEGER NOT NULL,
    status TEXT NOT NULL,
    error TEXT
);

CREATE INDEX IF NOT EXISTS idx_web_pages_parent ON web_pages(parent_id);
CREATE INDEX IF NOT EXISTS idx_web_pages_status ON web_pages(status);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
