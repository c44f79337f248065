//! Answer phase over an already crawled page store

use crate::answer::Question;
use crate::oracle::AnswerOracle;
use crate::scoring::RelevanceScorer;
use crate::storage::{Page, PageStore};
use crate::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Default number of ranked pages handed to the oracle per question
pub const DEFAULT_TOP_K: usize = 13;

/// Failure recorded when no candidate page yields an answer
pub const NO_ANSWER_FOUND: &str = "no page contained an answer";

/// Mapping from question id to answer, empty for unanswered questions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<String, String>);

impl AnswerSheet {
    /// Builds the sheet for a batch; every id is present
    pub fn from_questions(questions: &[Question]) -> Self {
        let answers = questions
            .iter()
            .map(|q| (q.id.clone(), q.answer().unwrap_or_default().to_string()))
            .collect();
        Self(answers)
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.0.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of questions with a non-empty answer
    pub fn answered_count(&self) -> usize {
        self.0.values().filter(|a| !a.is_empty()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &BTreeMap<String, String> {
        &self.0
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

impl From<BTreeMap<String, String>> for AnswerSheet {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// Answers questions from stored pages with an oracle
///
/// Reads the store only; computed scores are not written back.
pub struct QuestionAnswerer<'a> {
    store: &'a dyn PageStore,
    oracle: &'a dyn AnswerOracle,
    scorer: RelevanceScorer,
    top_k: usize,
}

impl<'a> QuestionAnswerer<'a> {
    /// Creates an answerer with the default weights and `DEFAULT_TOP_K`
    ///
    /// # Arguments
    ///
    /// * `store` - Populated page store to search
    /// * `oracle` - Oracle asked whether a page answers a question
    pub fn new(store: &'a dyn PageStore, oracle: &'a dyn AnswerOracle) -> Self {
        Self {
            store,
            oracle,
            scorer: RelevanceScorer::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_scorer(mut self, scorer: RelevanceScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// Sets how many ranked pages are shown to the oracle per question
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Gets the pages to show the oracle for a question, best first
    ///
    /// Pages scoring 0 still fill the slots left after the matching pages.
    /// Falls back to every stored page, in store order, when the ranking
    /// comes back empty.
    ///
    /// # Arguments
    ///
    /// * `question` - Question text to rank the stored pages against
    ///
    /// # Returns
    ///
    /// At most `top_k` pages, or every stored page on an empty ranking
    pub fn candidates(&self, question: &str) -> Result<Vec<Page>> {
        let pages = self.store.get_all()?;
        let ranked = self.scorer.rank(pages.clone(), question, self.top_k);

        if ranked.is_empty() {
            debug!("No ranked pages, checking all {} stored pages", pages.len());
            Ok(pages)
        } else {
            debug!("Checking {} ranked pages", ranked.len());
            Ok(ranked)
        }
    }

    /// Answers one question, moving it to answered or failed
    ///
    /// Never fails: store and oracle errors are logged and end as a failed
    /// question. Questions that are already terminal are left alone.
    pub async fn answer_question(&self, question: &mut Question) {
        if question.status().is_terminal() {
            debug!("Question {} already {}", question.id, question.status());
            return;
        }

        info!("Processing question {}: {}", question.id, question.text);

        let candidates = match self.candidates(&question.text) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Could not read pages for question {}: {}", question.id, e);
                record_failure(question, format!("store error: {}", e));
                return;
            }
        };

        for page in &candidates {
            match self
                .oracle
                .check_for_answer(&page.content, &question.text)
                .await
            {
                Ok(check) => {
                    if let Some(answer) = check.into_answer() {
                        info!(
                            "Answer for {}: {:?} [from: {} | {}]",
                            question.id, answer, page.title, page.url
                        );
                        if let Err(e) = question.mark_answered(answer) {
                            warn!("Could not record answer for {}: {}", question.id, e);
                        }
                        return;
                    }
                }
                Err(e) => {
                    warn!(
                        "Oracle failed on {} for question {}: {}",
                        page.url, question.id, e
                    );
                }
            }
        }

        info!("No answer found for question {}", question.id);
        record_failure(question, NO_ANSWER_FOUND);
    }

    /// Answers a whole batch, one question at a time
    ///
    /// # Arguments
    ///
    /// * `questions` - The batch; each question ends answered or failed
    ///
    /// # Returns
    ///
    /// A sheet holding every question id of the batch, with an empty string
    /// for each question left unanswered
    pub async fn answer_all(&self, questions: &mut [Question]) -> AnswerSheet {
        for question in questions.iter_mut() {
            self.answer_question(question).await;
        }

        let sheet = AnswerSheet::from_questions(questions);
        info!(
            "Answered {} of {} questions",
            sheet.answered_count(),
            sheet.len()
        );
        sheet
    }
}

/// Marks a question failed, logging if it was already terminal
pub(crate) fn record_failure(question: &mut Question, reason: impl Into<String>) {
    if let Err(e) = question.mark_failed(reason) {
        warn!("Could not record failure for {}: {}", question.id, e);
    }
}
