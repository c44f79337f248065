//! Link-following mode: per question, walk forward from a start page and
//! let the oracle pick one link per hop
//!
//! Pages met on the way are fetched only when the store does not have them
//! yet, and stored once fetched.

use crate::answer::answerer::record_failure;
use crate::answer::{AnswerSheet, Question};
use crate::crawler::PageFetcher;
use crate::oracle::AnswerOracle;
use crate::storage::{Page, PageStore};
use crate::url::store_key;
use crate::Result;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Default hop limit of the link-following mode
pub const DEFAULT_FOLLOW_DEPTH: u32 = 3;

/// Failure when the oracle offers no usable link
pub const NO_LINK_TO_FOLLOW: &str = "no link to follow";

/// Failure when the chosen link leads back to a page seen for this question
pub const LINK_CYCLE: &str = "link cycle";

/// Failure when the hop limit runs out
pub const MAX_DEPTH_REACHED: &str = "Maximum depth reached without finding answer";

/// Walks links from a start page, one question at a time
pub struct LinkFollower<'a> {
    store: &'a mut dyn PageStore,
    fetcher: &'a PageFetcher,
    oracle: &'a dyn AnswerOracle,
    max_depth: u32,
}

impl<'a> LinkFollower<'a> {
    /// Creates a follower allowing `DEFAULT_FOLLOW_DEPTH` hops
    ///
    /// # Arguments
    ///
    /// * `store` - Store consulted before fetching; fetched pages are added
    /// * `fetcher` - Fetcher for pages missing from the store
    /// * `oracle` - Oracle that checks pages and picks the next link
    pub fn new(
        store: &'a mut dyn PageStore,
        fetcher: &'a PageFetcher,
        oracle: &'a dyn AnswerOracle,
    ) -> Self {
        Self {
            store,
            fetcher,
            oracle,
            max_depth: DEFAULT_FOLLOW_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Gets a page from the store, fetching and storing it when absent
    async fn load_page(&mut self, url: &str, parent_id: Option<&str>, depth: u32) -> Result<Page> {
        if let Some(page) = self.store.get_by_url(url)? {
            debug!("Using stored page {}", url);
            return Ok(page);
        }

        let page = self.fetcher.fetch(url, parent_id, depth).await;
        self.store.put(&page)?;
        Ok(page)
    }

    /// Asks the oracle for the next link, keeping only links the page has
    async fn next_link(&self, page: &Page, question: &Question) -> Option<String> {
        let choice = match self
            .oracle
            .select_next_link(&page.content, &question.text, &page.links)
            .await
        {
            Ok(choice) => choice?,
            Err(e) => {
                warn!("Oracle failed to pick a link on {}: {}", page.url, e);
                return None;
            }
        };

        let link = store_key(&choice);
        if page.links.contains(&link) {
            Some(link)
        } else {
            warn!("Oracle picked {:?}, which is not a link of {}", choice, page.url);
            None
        }
    }

    /// Follows links for one question until it is answered or fails
    ///
    /// Store errors propagate; every other outcome is recorded on the
    /// question.
    ///
    /// # Arguments
    ///
    /// * `start_url` - Page the walk starts from, at hop 0
    /// * `question` - Question to answer; left alone if already terminal
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The question is now answered or failed
    /// * `Err(SiteQueryError)` - The store failed mid-walk
    pub async fn follow(&mut self, start_url: &str, question: &mut Question) -> Result<()> {
        if question.status().is_terminal() {
            return Ok(());
        }

        info!("Following links for question {}: {}", question.id, question.text);

        let mut visited = HashSet::new();
        let mut current = store_key(start_url);
        let mut parent_id: Option<String> = None;

        for depth in 0..self.max_depth {
            if !visited.insert(current.clone()) {
                info!("Question {} led back to {}", question.id, current);
                record_failure(question, LINK_CYCLE);
                return Ok(());
            }

            let page = self.load_page(&current, parent_id.as_deref(), depth).await?;

            match self
                .oracle
                .check_for_answer(&page.content, &question.text)
                .await
            {
                Ok(check) => {
                    if let Some(answer) = check.into_answer() {
                        info!(
                            "Answer for {} at hop {}: {:?} [from: {}]",
                            question.id, depth, answer, page.url
                        );
                        question.mark_answered(answer)?;
                        return Ok(());
                    }
                }
                Err(e) => warn!("Oracle failed on {}: {}", page.url, e),
            }

            match self.next_link(&page, question).await {
                Some(link) => {
                    debug!("Question {}: hop {} -> {}", question.id, depth + 1, link);
                    parent_id = Some(page.id);
                    current = link;
                }
                None => {
                    info!("No link to follow from {} for {}", page.url, question.id);
                    record_failure(question, NO_LINK_TO_FOLLOW);
                    return Ok(());
                }
            }
        }

        info!("Question {} ran out of hops", question.id);
        record_failure(question, MAX_DEPTH_REACHED);
        Ok(())
    }

    /// Follows links for every question of a batch
    ///
    /// A store error fails only the question it happened on. The returned
    /// sheet holds every question id.
    pub async fn follow_all(&mut self, start_url: &str, questions: &mut [Question]) -> AnswerSheet {
        for question in questions.iter_mut() {
            if let Err(e) = self.follow(start_url, question).await {
                warn!("Following links for {} failed: {}", question.id, e);
                record_failure(question, format!("store error: {}", e));
            }
        }
        AnswerSheet::from_questions(questions)
    }
}
