//! Phases of a research run

use serde::{Deserialize, Serialize};

/// Phase of a research run.
///
/// ```text
/// Planning -> Retrieving <-> Synthesizing -> Validating -> Done
///     |-> Done (direct answer)
///     |-> AwaitingUser (clarification)
/// any non-terminal phase -> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    Planning,
    Retrieving,
    Synthesizing,
    Validating,
    Done,
    AwaitingUser,
    Failed,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Planning => "planning",
            RunPhase::Retrieving => "retrieving",
            RunPhase::Synthesizing => "synthesizing",
            RunPhase::Validating => "validating",
            RunPhase::Done => "done",
            RunPhase::AwaitingUser => "awaiting_user",
            RunPhase::Failed => "failed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RunPhase::Planning => "Planning",
            RunPhase::Retrieving => "Retrieving",
            RunPhase::Synthesizing => "Synthesizing",
            RunPhase::Validating => "Validating",
            RunPhase::Done => "Done",
            RunPhase::AwaitingUser => "Awaiting user",
            RunPhase::Failed => "Failed",
        }
    }

    /// `AwaitingUser` is terminal: new user input starts a fresh run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunPhase::Done | RunPhase::AwaitingUser | RunPhase::Failed
        )
    }

    pub fn can_transition_to(&self, next: RunPhase) -> bool {
        use RunPhase::*;
        if next == Failed {
            return !self.is_terminal();
        }
        matches!(
            (self, next),
            (Planning, Retrieving)
                | (Planning, Done)
                | (Planning, AwaitingUser)
                | (Retrieving, Synthesizing)
                | (Synthesizing, Retrieving)
                | (Synthesizing, Validating)
                | (Validating, Done)
        )
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
