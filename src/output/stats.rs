//! Statistics generation from the page store
//!
//! This module provides functionality for extracting and displaying
//! store statistics for the `stats` command.

use crate::state::PageStatus;
use crate::storage::{PageStore, RunRecord};
use crate::SiteQueryError;
use std::collections::BTreeMap;
use std::fmt;

/// Store statistics summary
#[derive(Debug, Clone)]
pub struct StoreStatistics {
    /// Total number of stored pages
    pub total_pages: u64,

    /// Count of pages by fetch status, in status order
    pub pages_by_status: Vec<(PageStatus, u64)>,

    /// Pages stored as crawl seeds
    pub root_pages: u64,

    /// Pages without outbound links
    pub leaf_pages: u64,

    /// Page count per crawl depth
    pub depth_breakdown: BTreeMap<u32, u64>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

impl StoreStatistics {
    /// Share of pages fetched successfully, in percent
    pub fn success_rate(&self) -> f64 {
        let processed = self
            .pages_by_status
            .iter()
            .find(|(status, _)| status.is_success())
            .map_or(0, |(_, count)| *count);

        if self.total_pages > 0 {
            (processed as f64 / self.total_pages as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn PageStore) -> Result<StoreStatistics, SiteQueryError> {
    let total_pages = storage.count_pages()?;

    let mut pages_by_status = Vec::new();
    for status in PageStatus::all_statuses() {
        let count = storage.count_pages_by_status(status)?;
        if count > 0 {
            pages_by_status.push((status, count));
        }
    }

    Ok(StoreStatistics {
        total_pages,
        pages_by_status,
        root_pages: storage.get_root_pages()?.len() as u64,
        leaf_pages: storage.count_leaf_pages()?,
        depth_breakdown: storage.get_depth_breakdown()?,
        latest_run: storage.get_latest_run()?,
    })
}

impl fmt::Display for StoreStatistics {
    /// Renders the text printed by `stats`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Page Store Statistics ===\n")?;

        writeln!(f, "Overview:")?;
        writeln!(f, "  Total pages: {}", self.total_pages)?;
        writeln!(f, "  Root pages: {}", self.root_pages)?;
        writeln!(f, "  Leaf pages: {}", self.leaf_pages)?;
        writeln!(f)?;

        if !self.pages_by_status.is_empty() {
            writeln!(f, "Pages by Status:")?;
            for (status, count) in &self.pages_by_status {
                let percentage = if self.total_pages > 0 {
                    (*count as f64 / self.total_pages as f64) * 100.0
                } else {
                    0.0
                };
                writeln!(f, "  {}: {} ({:.1}%)", status, count, percentage)?;
            }
            writeln!(f)?;
        }

        if !self.depth_breakdown.is_empty() {
            writeln!(f, "Pages by Depth:")?;
            for (depth, count) in &self.depth_breakdown {
                writeln!(f, "  depth {}: {}", depth, count)?;
            }
            writeln!(f)?;
        }

        match &self.latest_run {
            Some(run) => {
                writeln!(f, "Latest Run:")?;
                writeln!(f, "  Id: {}", run.id)?;
                writeln!(f, "  Seed: {}", run.seed_url)?;
                writeln!(f, "  Status: {}", run.status.to_db_string())?;
                writeln!(f, "  Started: {}", run.started_at)?;
                if let Some(finished) = &run.finished_at {
                    writeln!(f, "  Finished: {}", finished)?;
                }
                writeln!(
                    f,
                    "  Pages fetched: {}, reused: {}",
                    run.pages_fetched, run.pages_reused
                )?;
            }
            None => writeln!(f, "No crawl runs recorded")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "Success Rate: {:.1}% of {} pages fetched without error",
            self.success_rate(),
            self.total_pages
        )
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics) {
    print!("{}", stats);
}
