//! Port for structured run transcripts.
//!
//! Defines the [`ConversationLogger`] trait for recording run events
//! (planner decisions, phase changes, task results, synthesis and
//! validation outcomes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the run
//! transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// A structured run event for logging.
///
/// Each event has a type string and a JSON payload containing
/// event-specific fields. The timestamp is added by the logger.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (e.g., "planner_decision", "task_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging run events to a structured log.
///
/// `log` is synchronous and infallible; a logger that cannot write drops
/// the event instead of disturbing the run.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
