//! What a research run returns to its caller.

use crate::retrieval::Evidence;
use crate::task::Task;
use crate::validation::ValidationResult;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a run-fatal error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    /// The planner call failed or returned output that broke its schema
    PlannerFailed,
    /// Synthesis produced no usable summary
    SynthesisFailed,
    /// The page cache could not be read or written
    CacheCorrupted,
    /// The run was cancelled from outside
    Cancelled,
    /// The run deadline passed
    TimedOut,
    /// The state machine was asked to make an illegal move
    InvalidTransition,
}

impl RunErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunErrorKind::PlannerFailed => "planner_failed",
            RunErrorKind::SynthesisFailed => "synthesis_failed",
            RunErrorKind::CacheCorrupted => "cache_corrupted",
            RunErrorKind::Cancelled => "cancelled",
            RunErrorKind::TimedOut => "timed_out",
            RunErrorKind::InvalidTransition => "invalid_transition",
        }
    }
}

impl std::fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured error surfaced to the caller when a run fails
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
}

impl RunError {
    pub fn new(kind: RunErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(RunErrorKind::Cancelled, "Run cancelled")
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == RunErrorKind::Cancelled
    }
}

/// Final report of a complex request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchReport {
    pub objective: String,
    pub summary: String,
    /// Advisory; absent when validation itself failed
    pub validation: Option<ValidationResult>,
    pub validation_error: Option<String>,
    /// The round ceiling was hit before synthesis reported completion
    pub possibly_incomplete: bool,
    pub rounds: u32,
    pub evidence: Vec<Evidence>,
    /// Every task of the run, kept for auditing
    pub tasks: Vec<Task>,
}

impl ResearchReport {
    /// Distinct evidence sources in the order they were first retrieved
    pub fn sources(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for label in self.evidence.iter().map(|e| e.source.label()) {
            if !seen.contains(&label) {
                seen.push(label);
            }
        }
        seen
    }
}

/// Successful end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    DirectAnswer { text: String },
    Clarification { questions: Vec<String> },
    Report(ResearchReport),
}
