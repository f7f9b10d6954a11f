//! Turn state machine.
//!
//! ```text
//! IDLE → ANALYZING → [REMEMBERING] → PROMPTING → AWAITING_REPLY → RECORDING → IDLE
//!                                                      │
//!                                                      └── backend failure ──► IDLE
//! ```

use std::fmt;

use serde::Serialize;

/// Where a session is inside a turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    /// Waiting for input.
    #[default]
    Idle,
    /// Deriving the response directive.
    Analyzing,
    /// Staging facts, preferences and keywords.
    Remembering,
    /// Assembling the prompt.
    Prompting,
    /// Completion call in flight.
    AwaitingReply,
    /// Storing the reply and its sentiment.
    Recording,
}

impl SessionState {
    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        use SessionState::{Analyzing, AwaitingReply, Idle, Prompting, Recording, Remembering};
        matches!(
            (self, next),
            (Idle, Analyzing)
                | (Analyzing, Remembering | Prompting)
                | (Remembering, Prompting)
                | (Prompting, AwaitingReply)
                | (AwaitingReply, Recording | Idle)
                | (Recording, Idle)
        )
    }

    /// Upper-case label.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Analyzing => "ANALYZING",
            Self::Remembering => "REMEMBERING",
            Self::Prompting => "PROMPTING",
            Self::AwaitingReply => "AWAITING_REPLY",
            Self::Recording => "RECORDING",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
