use serde::Deserialize;

/// Weights of the six relevance sub-scores plus the phrase bonus
///
/// The defaults are empirical; they are exposed in the `[scoring]` config
/// section so they can be tuned per site.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ScoringWeights {
    /// Question word appears anywhere in the title
    pub title_substring: f64,
    /// Question word is a whole word of the title
    pub title_token: f64,
    /// Question word appears anywhere in the content
    pub content_substring: f64,
    /// Question word is a whole word of the content
    pub content_token: f64,
    /// Adjacent question-word pair appears in the content
    pub content_phrase: f64,
    /// Question word appears anywhere in the URL
    pub url_substring: f64,
    /// Question word is a whole `/`- or `-`-separated URL segment
    pub url_token: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title_substring: 0.2,
            title_token: 0.1,
            content_substring: 0.3,
            content_token: 0.1,
            content_phrase: 0.1,
            url_substring: 0.1,
            url_token: 0.1,
        }
    }
}

impl ScoringWeights {
    /// Returns every weight paired with its config key
    pub fn named(&self) -> [(&'static str, f64); 7] {
        [
            ("title-substring", self.title_substring),
            ("title-token", self.title_token),
            ("content-substring", self.content_substring),
            ("content-token", self.content_token),
            ("content-phrase", self.content_phrase),
            ("url-substring", self.url_substring),
            ("url-token", self.url_token),
        ]
    }
}
