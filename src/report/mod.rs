//! Answer submission to the report endpoint
//!
//! The endpoint accepts `{task, apikey, answer}` and replies with a JSON
//! object whose `message` is free text. When answers are wrong, the only
//! signal is a sentence such as "question 03 is incorrect" inside that text;
//! [`parse_incorrect_question_ids`] is the single place that reads it.

use crate::answer::AnswerSheet;
use crate::config::{require_credential, ReportConfig};
use crate::{ConfigError, Result, SiteQueryError};
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::{info, warn};

static INCORRECT_QUESTION_REGEX: OnceLock<Regex> = OnceLock::new();

fn incorrect_question_regex() -> &'static Regex {
    INCORRECT_QUESTION_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?i)\bquestion\s+(?:no\.?\s+|#\s*)?["']?([0-9a-z_-]+)["']?\s+(?:is|was)\s+(?:incorrect|wrong)\b"#,
        )
        .unwrap()
    })
}

/// Extracts the ids of questions a reply reports as incorrect
///
/// Recognized phrasings, case-insensitive, anywhere in the text:
/// - `question 03 is incorrect`
/// - `question #03 was wrong`
/// - `question no. 3 is incorrect`
/// - `question "03" is incorrect`
///
/// Ids come back in order of first mention, without repeats. Text that
/// mentions no incorrect question yields an empty list.
pub fn parse_incorrect_question_ids(message: &str) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for captures in incorrect_question_regex().captures_iter(message) {
        let id = captures[1].to_string();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

#[derive(Serialize)]
struct ReportRequest<'a> {
    task: &'a str,
    apikey: &'a str,
    answer: &'a AnswerSheet,
}

#[derive(Debug, Deserialize)]
struct ReportReply {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Structured reading of the endpoint's reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOutcome {
    /// HTTP success and no negative reply code
    pub accepted: bool,
    pub status: u16,
    /// Reply message, or the raw body when it carries none
    pub message: String,
    pub incorrect_question_ids: Vec<String>,
}

impl ReportOutcome {
    /// Builds the outcome from a status code and raw reply body
    pub fn from_reply(status: u16, body: &str) -> Self {
        let reply: Option<ReportReply> = serde_json::from_str(body).ok();
        let code = reply.as_ref().and_then(|r| r.code);
        let message = reply
            .and_then(|r| r.message)
            .unwrap_or_else(|| body.trim().to_string());

        let success_status = (200..300).contains(&status);
        let incorrect_question_ids = parse_incorrect_question_ids(&message);

        Self {
            accepted: success_status
                && code.map_or(true, |c| c >= 0)
                && incorrect_question_ids.is_empty(),
            status,
            message,
            incorrect_question_ids,
        }
    }

    /// Turns a rejected submission into an error
    pub fn into_result(self) -> Result<Self> {
        if self.accepted {
            Ok(self)
        } else {
            Err(SiteQueryError::Report {
                status: self.status,
                message: self.message,
            })
        }
    }
}

/// Client for the report endpoint
pub struct ReportClient {
    http_client: Client,
    url: String,
    task: String,
    api_key: String,
}

impl ReportClient {
    pub fn new(config: &ReportConfig, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            url: config.url.clone(),
            task: config.task.clone(),
            api_key: api_key.into(),
        }
    }

    /// Creates a client reading its key from the configured environment variable
    pub fn from_config(config: &ReportConfig) -> std::result::Result<Self, ConfigError> {
        let api_key = require_credential(&config.api_key_env)?;
        Ok(Self::new(config, api_key))
    }

    /// Posts the answers and reads the reply
    ///
    /// Transport failures are errors; any HTTP reply, including a rejection,
    /// comes back as an outcome.
    pub async fn submit(&self, answers: &AnswerSheet) -> Result<ReportOutcome> {
        let request = ReportRequest {
            task: &self.task,
            apikey: &self.api_key,
            answer: answers,
        };

        info!("Submitting {} answers to {}", answers.len(), self.url);

        let response = self
            .http_client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|source| SiteQueryError::Http {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let outcome = ReportOutcome::from_reply(status, &body);

        if outcome.accepted {
            info!("Report accepted: {}", outcome.message);
        } else {
            warn!(
                "Report rejected (HTTP {}): {}; incorrect questions: {:?}",
                status, outcome.message, outcome.incorrect_question_ids
            );
        }

        Ok(outcome)
    }
}
