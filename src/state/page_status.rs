/// Page status definitions for tracking fetch outcomes
use std::fmt;

/// Represents the fetch outcome recorded on a stored page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Page is known but has not been fetched yet
    Pending,

    /// Page was fetched and its content extracted
    Processed,

    /// Page fetch failed; content and links are empty
    Error,
}

impl PageStatus {
    /// Returns true if the page holds usable content
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if the fetch failed
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Converts the page status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
            Self::Error => "error",
        }
    }

    /// Parses a page status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processed" => Some(Self::Processed),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Returns all possible page statuses
    pub fn all_statuses() -> [Self; 3] {
        [Self::Pending, Self::Processed, Self::Error]
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
