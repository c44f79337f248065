//! Breadth-first crawl frontier
//!
//! This module handles:
//! - The FIFO queue of `(url, parent, depth)` entries
//! - The visited set that keeps cyclic link graphs from queueing forever
//! - Discarding entries beyond the depth bound

use std::collections::{HashSet, VecDeque};

/// A URL queued for visiting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// Store key of the URL to visit
    pub url: String,

    /// Id of the page that linked here; None for the seed
    pub parent_id: Option<String>,

    /// Hops from the seed
    pub depth: u32,
}

impl FrontierEntry {
    /// Creates the entry for a crawl seed
    pub fn seed(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            parent_id: None,
            depth: 0,
        }
    }
}

/// Frontier queue plus visited set for a single crawl run
///
/// Owned by the crawl loop; nothing else mutates it.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier holding only the seed entry
    pub fn with_seed(url: impl Into<String>) -> Self {
        let mut frontier = Self::new();
        frontier.push(FrontierEntry::seed(url));
        frontier
    }

    /// Appends an entry to the back of the queue
    pub fn push(&mut self, entry: FrontierEntry) {
        self.queue.push_back(entry);
    }

    /// Pops the next entry to visit and marks it visited
    ///
    /// Entries deeper than `max_depth` or already visited are discarded on
    /// the way. Returns None once the queue is exhausted.
    pub fn next(&mut self, max_depth: u32) -> Option<FrontierEntry> {
        while let Some(entry) = self.queue.pop_front() {
            if entry.depth > max_depth {
                tracing::trace!("Discarding {} beyond max depth", entry.url);
                continue;
            }
            if !self.visited.insert(entry.url.clone()) {
                continue;
            }
            return Some(entry);
        }
        None
    }

    /// Queues every link not visited yet as a child of `parent_id`
    ///
    /// Returns the number of entries queued.
    pub fn enqueue_links(&mut self, links: &[String], parent_id: &str, depth: u32) -> usize {
        let mut queued = 0;
        for link in links {
            if self.visited.contains(link) {
                continue;
            }
            self.push(FrontierEntry {
                url: link.clone(),
                parent_id: Some(parent_id.to_string()),
                depth,
            });
            queued += 1;
        }
        queued
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Gets the number of entries still queued
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
