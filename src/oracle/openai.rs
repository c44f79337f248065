//! Chat-completions oracle backed by the OpenAI REST API

use super::prompts::{self, NO_ANSWER, NO_LINK};
use super::{AnswerCheck, AnswerOracle, OracleError};
use crate::config::{require_credential, OracleConfig};
use crate::ConfigError;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Oracle asking a chat-completions model one prompt per call
#[derive(Clone)]
pub struct OpenAiOracle {
    http_client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    answer_max_tokens: u32,
    link_max_tokens: u32,
}

impl std::fmt::Debug for OpenAiOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiOracle")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl OpenAiOracle {
    /// Creates an oracle with an explicit API key
    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            answer_max_tokens: config.answer_max_tokens,
            link_max_tokens: config.link_max_tokens,
        }
    }

    /// Creates an oracle reading its key from the configured environment variable
    pub fn from_config(config: &OracleConfig) -> Result<Self, ConfigError> {
        let api_key = require_credential(&config.api_key_env)?;
        Ok(Self::new(config, api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends one user prompt and returns the trimmed reply text
    async fn complete(&self, prompt: String, max_tokens: u32) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: self.temperature,
            max_tokens,
        };

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key.trim()))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            warn!("Oracle returned {}: {}", status, body);
            return Err(OracleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let reply = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| normalize_reply(&content))
            .unwrap_or_default();

        debug!("Oracle replied: {}", reply);
        Ok(reply)
    }
}

/// Strips whitespace and wrapping quotes from a model reply
fn normalize_reply(reply: &str) -> String {
    reply.trim().trim_matches('"').trim().to_string()
}

#[async_trait]
impl AnswerOracle for OpenAiOracle {
    async fn check_for_answer(
        &self,
        content: &str,
        question: &str,
    ) -> Result<AnswerCheck, OracleError> {
        if content.trim().is_empty() {
            debug!("Skipping oracle call for a page without content");
            return Ok(AnswerCheck::none());
        }

        let reply = self
            .complete(prompts::answer_check(content, question), self.answer_max_tokens)
            .await?;

        if reply.is_empty() || reply == NO_ANSWER {
            Ok(AnswerCheck::none())
        } else {
            Ok(AnswerCheck::found(reply))
        }
    }

    async fn select_next_link(
        &self,
        content: &str,
        question: &str,
        links: &[String],
    ) -> Result<Option<String>, OracleError> {
        if content.trim().is_empty() || links.is_empty() {
            debug!("Skipping link selection for a page without content or links");
            return Ok(None);
        }

        let reply = self
            .complete(
                prompts::link_selection(content, question, links),
                self.link_max_tokens,
            )
            .await?;

        if reply.is_empty() || reply == NO_LINK {
            Ok(None)
        } else {
            Ok(Some(reply))
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
