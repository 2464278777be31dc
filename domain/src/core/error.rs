//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid status transition for task {task}: {from} -> {to}")]
    InvalidTransition {
        task: String,
        from: String,
        to: String,
    },

    #[error("Invalid run phase transition: {from} -> {to}")]
    InvalidPhaseTransition { from: String, to: String },

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Invalid synthesis result: {0}")]
    InvalidSynthesis(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl DomainError {
    /// Check if this error came from a model output that broke its schema
    pub fn is_schema_violation(&self) -> bool {
        matches!(
            self,
            DomainError::SchemaViolation(_) | DomainError::InvalidSynthesis(_)
        )
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        DomainError::SchemaViolation(message.into())
    }
}
