//! Questions and question batches
//!
//! A batch arrives as JSON in one of two shapes:
//! - an ordered array of `{"id": ..., "text": ...}` records
//! - an object mapping ids to question text (`{"01": "..."}`), the raw shape
//!   served by the question endpoint
//!
//! Both load into the same `Vec<Question>`, in document order.

use crate::state::QuestionStatus;
use crate::{Result, SiteQueryError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A question to answer, with its monotonic status
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    /// Identifier from the question source
    pub id: String,
    pub text: String,
    status: QuestionStatus,
    answer: Option<String>,
    error: Option<String>,
}

impl Question {
    /// Creates a pending question
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            status: QuestionStatus::Pending,
            answer: None,
            error: None,
        }
    }

    pub fn status(&self) -> QuestionStatus {
        self.status
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records the answer; only a pending question can be answered
    pub fn mark_answered(&mut self, answer: impl Into<String>) -> Result<()> {
        self.transition(QuestionStatus::Answered)?;
        self.answer = Some(answer.into());
        Ok(())
    }

    /// Records why no answer was found; only a pending question can fail
    pub fn mark_failed(&mut self, error: impl Into<String>) -> Result<()> {
        self.transition(QuestionStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, to: QuestionStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(SiteQueryError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }
}

/// Wire form of a single question
#[derive(Debug, Serialize, Deserialize)]
struct QuestionRecord {
    id: Value,
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QuestionDocument {
    List(Vec<QuestionRecord>),
    Map(serde_json::Map<String, Value>),
}

fn id_to_string(id: Value) -> Result<String> {
    match id {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(SiteQueryError::QuestionBatch(format!(
            "question id must be a string or a number, got {}",
            other
        ))),
    }
}

/// Parses a question batch from JSON text
pub fn parse_questions(json: &str) -> Result<Vec<Question>> {
    let document: QuestionDocument = serde_json::from_str(json).map_err(|e| {
        SiteQueryError::QuestionBatch(format!(
            "expected an array of {{id, text}} or an object of id to text: {}",
            e
        ))
    })?;

    let questions = match document {
        QuestionDocument::List(records) => records
            .into_iter()
            .map(|record| Ok(Question::new(id_to_string(record.id)?, record.text)))
            .collect::<Result<Vec<_>>>()?,
        QuestionDocument::Map(entries) => entries
            .into_iter()
            .map(|(id, text)| match text {
                Value::String(text) => Ok(Question::new(id, text)),
                other => Err(SiteQueryError::QuestionBatch(format!(
                    "question {} must be text, got {}",
                    id, other
                ))),
            })
            .collect::<Result<Vec<_>>>()?,
    };

    if questions.is_empty() {
        tracing::warn!("Question batch is empty");
    }

    Ok(questions)
}

/// Loads a question batch from a JSON file
pub fn load_questions(path: &Path) -> Result<Vec<Question>> {
    let content = std::fs::read_to_string(path)?;
    let questions = parse_questions(&content)?;
    tracing::info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Downloads a question batch from `url`
pub async fn fetch_questions(client: &reqwest::Client, url: &str) -> Result<Vec<Question>> {
    tracing::info!("Fetching questions from {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|source| SiteQueryError::Http {
            url: url.to_string(),
            source,
        })?;

    let body = response.text().await?;
    parse_questions(&body)
}

/// Serializes questions as the normalized `[{id, text}]` array
pub fn questions_to_json(questions: &[Question]) -> Result<String> {
    let records: Vec<QuestionRecord> = questions
        .iter()
        .map(|q| QuestionRecord {
            id: Value::String(q.id.clone()),
            text: q.text.clone(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}
