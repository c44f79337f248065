use crate::scoring::ScoringWeights;
use serde::Deserialize;

/// Main configuration structure for sitequery
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub answer: AnswerConfig,
    #[serde(default)]
    pub scoring: ScoringWeights,
    #[serde(default)]
    pub oracle: OracleConfig,
    #[serde(default)]
    pub report: Option<ReportConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CrawlerConfig {
    /// Maximum depth to crawl from the seed URL
    pub max_depth: u32,

    /// Maximum number of redirect hops followed per fetch
    pub max_redirects: usize,

    /// User-Agent header sent with every page request
    pub user_agent: String,

    /// Optional per-request timeout in seconds; unset means no timeout
    pub request_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_redirects: 5,
            user_agent: "Mozilla/5.0 (compatible; sitequery/0.1)".to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Page store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "webpages.db".to_string(),
        }
    }
}

/// Answer-phase configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnswerConfig {
    /// Number of top-ranked pages handed to the oracle per question
    pub top_k: usize,

    /// Hop limit for the link-following mode
    pub follow_max_depth: u32,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            top_k: 13,
            follow_max_depth: 3,
        }
    }
}

/// Chat-completions oracle configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct OracleConfig {
    /// API base URL, without the trailing `/chat/completions`
    pub base_url: String,

    /// Model name sent with every request
    pub model: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    pub temperature: f32,

    /// Token limit for answer checks
    pub answer_max_tokens: u32,

    /// Token limit for link selection
    pub link_max_tokens: u32,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            answer_max_tokens: 150,
            link_max_tokens: 50,
        }
    }
}

/// Report endpoint configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ReportConfig {
    /// Endpoint receiving the answer mapping
    pub url: String,

    /// Task name sent alongside the answers
    pub task: String,

    /// Name of the environment variable holding the report API key
    #[serde(default = "default_report_key_env")]
    pub api_key_env: String,
}

fn default_report_key_env() -> String {
    "API_KEY".to_string()
}
