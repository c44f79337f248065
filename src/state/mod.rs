//! State module for tracking page and question progress
//!
//! # Components
//!
//! - `PageStatus`: outcome of fetching a page (pending, processed, error)
//! - `QuestionStatus`: monotonic lifecycle of a question (pending, answered, failed)

mod page_status;
mod question_status;

// Re-export main types
pub use page_status::PageStatus;
pub use question_status::QuestionStatus;
