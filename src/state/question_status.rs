/// Question lifecycle definitions
use std::fmt;

/// Represents where a question is in its lifecycle
///
/// Transitions are monotonic: `Pending` moves to exactly one of the terminal
/// states and never comes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionStatus {
    /// Question has not been resolved yet
    Pending,

    /// An answer was extracted
    Answered,

    /// No answer could be found
    Failed,
}

impl QuestionStatus {
    /// Returns true if this is a terminal status
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: QuestionStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Answered) | (Self::Pending, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Answered => "answered",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for QuestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
