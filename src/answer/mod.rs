//! Question answering over crawled pages
//!
//! Two modes share the [`Question`] model and the [`AnswerSheet`] output:
//! - [`QuestionAnswerer`] ranks every stored page per question and asks the
//!   oracle page by page, best first
//! - [`LinkFollower`] walks forward from a start page, letting the oracle
//!   pick one link per hop

mod answerer;
mod follow;
mod question;

pub use answerer::{AnswerSheet, QuestionAnswerer, DEFAULT_TOP_K, NO_ANSWER_FOUND};
pub use follow::{
    LinkFollower, DEFAULT_FOLLOW_DEPTH, LINK_CYCLE, MAX_DEPTH_REACHED, NO_LINK_TO_FOLLOW,
};
pub use question::{fetch_questions, load_questions, parse_questions, questions_to_json, Question};

/// Recomputes the crawl-time relevance of every stored page for a batch
///
/// # Arguments
///
/// * `store` - Store whose pages are rescored in place
/// * `questions` - Batch the keyword heuristic is computed against
///
/// # Returns
///
/// The number of pages updated. Store errors propagate.
pub fn rescore_pages(
    store: &mut dyn crate::storage::PageStore,
    questions: &[Question],
) -> crate::Result<usize> {
    let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
    let pages = store.get_all()?;

    for page in &pages {
        let score = crate::scoring::batch_relevance(&page.content, &page.url, &texts);
        store.update_relevance(&page.id, score)?;
    }

    tracing::info!("Rescored {} pages against {} questions", pages.len(), texts.len());
    Ok(pages.len())
}
