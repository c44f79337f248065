use crate::config::types::{
    AnswerConfig, Config, CrawlerConfig, OracleConfig, ReportConfig, StoreConfig,
};
use crate::scoring::ScoringWeights;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_store_config(&config.store)?;
    validate_answer_config(&config.answer)?;
    validate_scoring_weights(&config.scoring)?;
    validate_oracle_config(&config.oracle)?;
    if let Some(report) = &config.report {
        validate_report_config(report)?;
    }
    Ok(())
}

fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.max_depth > 100 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= 100, got {}",
            config.max_depth
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.request_timeout_secs == Some(0) {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_answer_config(config: &AnswerConfig) -> ConfigResult<()> {
    if config.top_k < 1 {
        return Err(ConfigError::Validation(format!(
            "top_k must be >= 1, got {}",
            config.top_k
        )));
    }

    if config.follow_max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "follow_max_depth must be >= 1, got {}",
            config.follow_max_depth
        )));
    }

    Ok(())
}

fn validate_scoring_weights(weights: &ScoringWeights) -> ConfigResult<()> {
    for (name, value) in weights.named() {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "scoring weight {} must be within [0, 1], got {}",
                name, value
            )));
        }
    }
    Ok(())
}

fn validate_oracle_config(config: &OracleConfig) -> ConfigResult<()> {
    Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid oracle base_url: {}", e)))?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation("model cannot be empty".to_string()));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "oracle api_key_env cannot be empty".to_string(),
        ));
    }

    if !config.temperature.is_finite() || !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "temperature must be within [0, 2], got {}",
            config.temperature
        )));
    }

    if config.answer_max_tokens < 1 || config.link_max_tokens < 1 {
        return Err(ConfigError::Validation(
            "token limits must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_report_config(config: &ReportConfig) -> ConfigResult<()> {
    Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid report url: {}", e)))?;

    if config.task.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report task cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report api_key_env cannot be empty".to_string(),
        ));
    }

    Ok(())
}
