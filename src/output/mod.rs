//! Output module for command results
//!
//! This module handles:
//! - Store statistics for the `stats` command
//! - Writing JSON documents (answer sheets, question batches) to a file or
//!   stdout

pub mod stats;

pub use stats::{load_statistics, print_statistics, StoreStatistics};

use crate::SiteQueryError;
use std::path::Path;

/// Writes a JSON document to `path`, or to stdout when no path is given
pub fn write_json_output(json: &str, path: Option<&Path>) -> Result<(), SiteQueryError> {
    match path {
        Some(path) => {
            std::fs::write(path, format!("{}\n", json))?;
            tracing::info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
