//! Relevance scoring between questions and pages
//!
//! Two heuristics live here:
//! - [`RelevanceScorer::score`] blends title, content and URL matches of a
//!   single question into a value in [0, 1]; the answer phase ranks pages
//!   with it.
//! - [`batch_relevance`] is the cheaper crawl-time heuristic: the share of
//!   each question's keywords present in a page, averaged over questions.
//!
//! Both are pure and deterministic.

mod weights;

pub use weights::ScoringWeights;

use crate::storage::Page;
use std::collections::HashSet;

/// Minimum length (in chars, exclusive) of a question token
const MIN_TOKEN_LEN: usize = 2;

/// Minimum length (in chars, exclusive) of a crawl-time keyword
const MIN_KEYWORD_LEN: usize = 3;

/// Splits text into lowercase words on every non-alphanumeric character
fn split_words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

/// Tokenizes a question into lowercase words longer than two characters
///
/// Duplicates are kept: a word asked twice weighs twice.
pub fn tokenize(question: &str) -> Vec<String> {
    split_words(question)
        .filter(|w| w.chars().count() > MIN_TOKEN_LEN)
        .collect()
}

/// Extracts crawl-time keywords: lowercase words longer than three characters
pub fn keywords(question: &str) -> Vec<String> {
    split_words(question)
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
        .collect()
}

fn fraction(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

/// Scores pages against a question
#[derive(Debug, Clone, Default)]
pub struct RelevanceScorer {
    weights: ScoringWeights,
}

impl RelevanceScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Scores a page against a question
    pub fn score(&self, page: &Page, question: &str) -> f64 {
        self.score_fields(&page.title, &page.content, &page.url, question)
    }

    /// Scores raw page fields against a question
    ///
    /// Every sub-score is a match count normalized by the question's token
    /// count (token count minus one for phrases), so a question without
    /// tokens scores 0.
    pub fn score_fields(&self, title: &str, content: &str, url: &str, question: &str) -> f64 {
        let words = tokenize(question);
        let n = words.len();
        let w = &self.weights;

        let title = title.to_lowercase();
        let title_words: HashSet<String> = split_words(&title).collect();
        let title_hits = words.iter().filter(|word| title.contains(word.as_str())).count();
        let title_exact = words
            .iter()
            .filter(|word| title.contains(word.as_str()) && title_words.contains(*word))
            .count();

        let content = content.to_lowercase();
        let content_words: HashSet<String> = split_words(&content).collect();
        let content_hits = words
            .iter()
            .filter(|word| content.contains(word.as_str()))
            .count();
        let content_exact = words
            .iter()
            .filter(|word| content.contains(word.as_str()) && content_words.contains(*word))
            .count();
        let phrase_hits = words
            .windows(2)
            .filter(|pair| content.contains(&format!("{} {}", pair[0], pair[1])))
            .count();

        let url = url.to_lowercase();
        let url_segments: HashSet<&str> = url.split(['/', '-']).collect();
        let url_hits = words.iter().filter(|word| url.contains(word.as_str())).count();
        let url_exact = words
            .iter()
            .filter(|word| url.contains(word.as_str()) && url_segments.contains(word.as_str()))
            .count();

        let score = fraction(title_hits, n) * w.title_substring
            + fraction(title_exact, n) * w.title_token
            + fraction(content_hits, n) * w.content_substring
            + fraction(content_exact, n) * w.content_token
            + fraction(phrase_hits, n.saturating_sub(1)) * w.content_phrase
            + fraction(url_hits, n) * w.url_substring
            + fraction(url_exact, n) * w.url_token;

        score.clamp(0.0, 1.0)
    }

    /// Ranks pages against a question, best first
    ///
    /// Each returned page carries its freshly computed score in
    /// `relevance_score`. Every page takes part, including those scoring 0,
    /// so they still fill the slots left after the matching pages. Ties keep
    /// store order.
    ///
    /// # Arguments
    ///
    /// * `pages` - Candidate pages, in store order
    /// * `question` - Question text to score against
    /// * `limit` - Maximum number of pages returned
    ///
    /// # Returns
    ///
    /// The first `limit` pages by descending score
    pub fn rank(&self, pages: Vec<Page>, question: &str, limit: usize) -> Vec<Page> {
        let mut scored: Vec<Page> = pages
            .into_iter()
            .map(|mut page| {
                page.relevance_score = self.score(&page, question);
                page
            })
            .collect();

        scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
        scored.truncate(limit);
        scored
    }
}

/// Crawl-time relevance of page content to a whole question batch
///
/// For each question, the share of its keywords found as substrings of the
/// content or the URL; the shares are averaged with equal weight per
/// question. Questions without keywords carry no signal and are skipped.
pub fn batch_relevance<S: AsRef<str>>(content: &str, url: &str, questions: &[S]) -> f64 {
    let content = content.to_lowercase();
    let url = url.to_lowercase();

    let ratios: Vec<f64> = questions
        .iter()
        .map(|q| keywords(q.as_ref()))
        .filter(|kw| !kw.is_empty())
        .map(|kw| {
            let matched = kw
                .iter()
                .filter(|word| content.contains(word.as_str()) || url.contains(word.as_str()))
                .count();
            fraction(matched, kw.len())
        })
        .collect();

    if ratios.is_empty() {
        0.0
    } else {
        ratios.iter().sum::<f64>() / ratios.len() as f64
    }
}
