//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that ties the frontier, the fetcher
//! and the page store together:
//! - Recording a crawl run
//! - Walking the site breadth-first up to the depth bound
//! - Reusing stored pages instead of fetching them again
//! - Scoring fresh pages against an optional question batch

use crate::config::Config;
use crate::crawler::frontier::Frontier;
use crate::crawler::PageFetcher;
use crate::scoring::batch_relevance;
use crate::storage::{open_storage, PageStore, RunStatus};
use crate::url::store_key;
use crate::Result;
use std::path::Path;
use std::time::Instant;

/// Counters of a finished crawl run
///
/// Returned by [`Crawler::crawl`] and mirrored in the run record stored
/// for the same `run_id`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    pub run_id: i64,

    /// Pages fetched over the network and stored
    pub pages_fetched: u64,

    /// Pages taken from the store without fetching
    pub pages_reused: u64,

    /// Fetched pages that came back as error pages
    pub pages_failed: u64,
}

impl CrawlReport {
    /// Total number of URLs visited
    pub fn pages_visited(&self) -> u64 {
        self.pages_fetched + self.pages_reused
    }
}

/// Breadth-first crawler over a page store
///
/// The crawler owns its store and fetcher for the length of a run. The
/// frontier and visited set live only inside [`Crawler::crawl`], so two
/// runs over the same store share nothing but the stored pages.
pub struct Crawler<S> {
    store: S,
    fetcher: PageFetcher,
    max_depth: u32,
    questions: Vec<String>,
    config_hash: String,
}

impl<S: PageStore> Crawler<S> {
    /// Creates a crawler writing into `store`
    ///
    /// # Arguments
    ///
    /// * `store` - Page store the crawl reads from and writes into
    /// * `fetcher` - Fetcher used for every URL missing from the store
    /// * `max_depth` - Deepest link level visited; the seed is depth 0
    pub fn new(store: S, fetcher: PageFetcher, max_depth: u32) -> Self {
        Self {
            store,
            fetcher,
            max_depth,
            questions: Vec::new(),
            config_hash: String::new(),
        }
    }

    /// Scores every freshly fetched page against these questions
    pub fn with_questions(mut self, questions: Vec<String>) -> Self {
        self.questions = questions;
        self
    }

    /// Sets the config fingerprint recorded on each run
    pub fn with_config_hash(mut self, config_hash: impl Into<String>) -> Self {
        self.config_hash = config_hash.into();
        self
    }

    /// Gets the underlying page store
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Crawls the site reachable from `seed_url`
    ///
    /// The run is recorded in the store as completed on success. A store
    /// failure aborts the crawl and marks the run failed; fetch failures
    /// never do.
    ///
    /// # Arguments
    ///
    /// * `seed_url` - First URL to visit; it is stored as the root page
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Counters of the completed run
    /// * `Err(SiteQueryError)` - The store failed and the run was aborted
    pub async fn crawl(&mut self, seed_url: &str) -> Result<CrawlReport> {
        let seed = store_key(seed_url);
        let run_id = self.store.create_run(&seed, &self.config_hash)?;
        tracing::info!(
            "Starting crawl run {} from {} (max depth {})",
            run_id,
            seed,
            self.max_depth
        );

        let mut report = CrawlReport {
            run_id,
            ..CrawlReport::default()
        };

        match self.run_frontier(&seed, &mut report).await {
            Ok(()) => {
                self.store.finish_run(
                    run_id,
                    RunStatus::Completed,
                    report.pages_fetched,
                    report.pages_reused,
                )?;
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Crawl run {} aborted: {}", run_id, e);
                if let Err(finish_err) = self.store.finish_run(
                    run_id,
                    RunStatus::Failed,
                    report.pages_fetched,
                    report.pages_reused,
                ) {
                    tracing::warn!("Could not mark run {} failed: {}", run_id, finish_err);
                }
                Err(e)
            }
        }
    }

    /// Drains the frontier, fetching or reusing one page per entry
    ///
    /// This method:
    /// 1. Takes the next unvisited entry within the depth bound
    /// 2. Reuses the stored page for that URL, or fetches and stores it
    /// 3. Scores fresh pages against the question batch, if any
    /// 4. Enqueues the page's links one level deeper
    async fn run_frontier(&mut self, seed: &str, report: &mut CrawlReport) -> Result<()> {
        let mut frontier = Frontier::with_seed(seed);
        let start_time = Instant::now();

        while let Some(entry) = frontier.next(self.max_depth) {
            let page = match self.store.get_by_url(&entry.url)? {
                Some(stored) => {
                    tracing::debug!("Reusing stored page {}", entry.url);
                    report.pages_reused += 1;
                    stored
                }
                None => {
                    let mut page = self
                        .fetcher
                        .fetch(&entry.url, entry.parent_id.as_deref(), entry.depth)
                        .await;

                    if page.status().is_error() {
                        report.pages_failed += 1;
                    } else if !self.questions.is_empty() {
                        page.relevance_score =
                            batch_relevance(&page.content, &page.url, &self.questions);
                    }

                    self.store.put(&page)?;
                    report.pages_fetched += 1;
                    page
                }
            };

            frontier.enqueue_links(&page.links, &page.id, entry.depth + 1);

            let visited = report.pages_visited();
            if visited % 10 == 0 {
                tracing::info!(
                    "Progress: {} pages visited, {} in frontier, {:.1}s elapsed",
                    visited,
                    frontier.len(),
                    start_time.elapsed().as_secs_f64()
                );
            }
        }

        tracing::info!(
            "Crawl completed: {} fetched ({} failed), {} reused in {:?}",
            report.pages_fetched,
            report.pages_failed,
            report.pages_reused,
            start_time.elapsed()
        );

        Ok(())
    }
}

/// Runs a complete crawl against the store named in the config
///
/// This is the entry point used by the `crawl` command.
///
/// # Arguments
///
/// * `config` - Loaded configuration; supplies the store path, fetcher
///   settings and depth bound
/// * `config_hash` - Fingerprint recorded on the crawl run
/// * `seed_url` - URL the crawl starts from
/// * `questions` - Question texts for crawl-time scoring; may be empty
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Counters of the completed run
/// * `Err(SiteQueryError)` - The store could not be opened or failed mid-run
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    seed_url: &str,
    questions: Vec<String>,
) -> Result<CrawlReport> {
    let store = open_storage(Path::new(&config.store.database_path))?;
    let fetcher = PageFetcher::new(&config.crawler)?;

    let mut crawler = Crawler::new(store, fetcher, config.crawler.max_depth)
        .with_questions(questions)
        .with_config_hash(config_hash);

    crawler.crawl(seed_url).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::state::PageStatus;
    use crate::storage::{Page, PageMetadata, SqliteStorage};
    use chrono::Utc;

    fn stored_page(id: &str, url: &str, links: &[&str], parent: Option<&str>, depth: u32) -> Page {
        Page {
            id: id.to_string(),
            url: url.to_string(),
            title: url.to_string(),
            content: "stored".to_string(),
            links: links.iter().map(|l| l.to_string()).collect(),
            is_root: parent.is_none(),
            is_leaf: links.is_empty(),
            parent_id: parent.map(str::to_string),
            relevance_score: 0.0,
            metadata: PageMetadata {
                last_visited: Utc::now(),
                depth,
                status: PageStatus::Processed,
                error: None,
            },
        }
    }

    fn crawler(store: SqliteStorage, max_depth: u32) -> Crawler<SqliteStorage> {
        let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
        Crawler::new(store, fetcher, max_depth).with_config_hash("test")
    }

    #[tokio::test]
    async fn test_crawl_reuses_stored_pages_without_network() {
        let mut store = SqliteStorage::open_in_memory().unwrap();
        store
            .put(&stored_page(
                "root",
                "http://site.invalid/",
                &["http://site.invalid/a"],
                None,
                0,
            ))
            .unwrap();
        store
            .put(&stored_page("a", "http://site.invalid/a", &[], Some("root"), 1))
            .unwrap();

        let mut crawler = crawler(store, 5);
        let report = crawler.crawl("http://site.invalid").await.unwrap();

        assert_eq!(report.pages_fetched, 0);
        assert_eq!(report.pages_reused, 2);

        let run = crawler.store().get_run(report.run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.seed_url, "http://site.invalid/");
        assert_eq!(run.config_hash, "test");
    }

    #[tokio::test]
    async fn test_crawl_handles_link_cycles() {
        let mut store = SqliteStorage::open_in_memory().unwrap();
        store
            .put(&stored_page(
                "root",
                "http://site.invalid/",
                &["http://site.invalid/a"],
                None,
                0,
            ))
            .unwrap();
        store
            .put(&stored_page(
                "a",
                "http://site.invalid/a",
                &["http://site.invalid/"],
                Some("root"),
                1,
            ))
            .unwrap();

        let mut crawler = crawler(store, 10);
        let report = crawler.crawl("http://site.invalid/").await.unwrap();

        assert_eq!(report.pages_visited(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_seed_is_stored_as_error_page() {
        let store = SqliteStorage::open_in_memory().unwrap();
        let mut crawler = crawler(store, 0);
        let report = crawler.crawl("not a url").await.unwrap();

        assert_eq!(report.pages_fetched, 1);
        assert_eq!(report.pages_failed, 1);

        let page = crawler.store().get_by_url("not a url").unwrap().unwrap();
        assert_eq!(page.status(), PageStatus::Error);
        assert!(page.is_root);
    }
}
