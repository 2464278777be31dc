//! Task value objects
//!
//! - [`TaskId`] - sequential identifier, doubles as the creation-order index
//! - [`TaskKind`] - the four kinds of queued work
//! - [`TaskStatus`] - forward-only lifecycle
//! - [`TaskOrigin`] - who asked for the task

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a task within a run.
///
/// Ids are handed out by the queue starting at 1, so ordering by id is
/// ordering by creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of a task. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Search,
    Scrape,
    Synthesize,
    Validate,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Search => "search",
            TaskKind::Scrape => "scrape",
            TaskKind::Synthesize => "synthesize",
            TaskKind::Validate => "validate",
        }
    }

    /// Search and scrape tasks are dispatched to the retrieval agent
    pub fn is_retrieval(&self) -> bool {
        matches!(self, TaskKind::Search | TaskKind::Scrape)
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be dispatched
    #[default]
    Pending,
    /// Dispatched, result not yet applied
    Running,
    /// Finished with a result
    Done,
    /// Finished without a result
    Failed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Done => "done",
            TaskStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Failed)
    }

    /// Forward-only lifecycle.
    ///
    /// `Pending -> Failed` covers tasks rejected before dispatch.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::Running)
                | (TaskStatus::Pending, TaskStatus::Failed)
                | (TaskStatus::Running, TaskStatus::Done)
                | (TaskStatus::Running, TaskStatus::Failed)
        )
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who created a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum TaskOrigin {
    /// A step of the initial plan
    Plan,
    /// An additional task requested by synthesis in the given round
    Synthesis { round: u32 },
    /// Bookkeeping task recorded by the orchestrator itself
    Orchestrator,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_id_ordering_follows_creation() {
        assert!(TaskId::new(1) < TaskId::new(2));
        assert_eq!(TaskId::new(4).to_string(), "#4");
    }

    #[test]
    fn test_status_transitions_forward_only() {
        use TaskStatus::*;
        assert!(Pending.can_transition_to(Running));
        assert!(Pending.can_transition_to(Failed));
        assert!(Running.can_transition_to(Done));
        assert!(Running.can_transition_to(Failed));

        assert!(!Running.can_transition_to(Pending));
        assert!(!Done.can_transition_to(Running));
        assert!(!Done.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Done));
        assert!(!Pending.can_transition_to(Done));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_kind_is_retrieval() {
        assert!(TaskKind::Search.is_retrieval());
        assert!(TaskKind::Scrape.is_retrieval());
        assert!(!TaskKind::Synthesize.is_retrieval());
        assert!(!TaskKind::Validate.is_retrieval());
    }
}
