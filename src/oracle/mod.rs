//! Answer oracle: the external judge that reads a page and either extracts
//! an answer or picks the next link to follow
//!
//! Callers treat every [`OracleError`] as a negative result; the error type
//! exists so that the failure can be logged with its cause.

mod openai;
pub mod prompts;

pub use openai::OpenAiOracle;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised while consulting an oracle
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Oracle returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

/// Outcome of asking whether a page answers a question
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnswerCheck {
    pub has_answer: bool,
    pub answer: Option<String>,
}

impl AnswerCheck {
    pub fn found(answer: impl Into<String>) -> Self {
        Self {
            has_answer: true,
            answer: Some(answer.into()),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    /// Returns the answer when one was found
    pub fn into_answer(self) -> Option<String> {
        if self.has_answer {
            self.answer
        } else {
            None
        }
    }
}

/// An external service that judges page content against a question
#[async_trait]
pub trait AnswerOracle: Send + Sync {
    /// Asks whether `content` answers `question`
    async fn check_for_answer(
        &self,
        content: &str,
        question: &str,
    ) -> Result<AnswerCheck, OracleError>;

    /// Asks which of `links` to follow next; None means no link is useful
    async fn select_next_link(
        &self,
        content: &str,
        question: &str,
        links: &[String],
    ) -> Result<Option<String>, OracleError>;
}
