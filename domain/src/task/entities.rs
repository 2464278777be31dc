//! Task entity and task results

use super::payload::TaskPayload;
use super::value_objects::{TaskId, TaskKind, TaskOrigin, TaskStatus};
use crate::core::error::DomainError;
use crate::retrieval::{FetchError, PageContent, SearchHit};
use crate::synthesis::SynthesisStatus;
use crate::validation::Verdict;
use serde::{Deserialize, Serialize};

/// Result attached to a task once it is done
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskOutput {
    SearchResults {
        query: String,
        hits: Vec<SearchHit>,
    },
    /// Pages of a scrape task; URLs that failed are listed separately
    Pages {
        pages: Vec<PageContent>,
        failures: Vec<FetchError>,
    },
    Synthesis {
        status: SynthesisStatus,
        summary: String,
    },
    Validation {
        verdict: Verdict,
    },
}

/// A single unit of work in the orchestration queue.
///
/// The kind is derived from the payload, which cannot be replaced after
/// creation. Status only moves forward; see [`TaskStatus::can_transition_to`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    payload: TaskPayload,
    origin: TaskOrigin,
    status: TaskStatus,
    output: Option<TaskOutput>,
    error: Option<String>,
}

impl Task {
    pub fn new(id: TaskId, payload: TaskPayload, origin: TaskOrigin) -> Self {
        Self {
            id,
            payload,
            origin,
            status: TaskStatus::Pending,
            output: None,
            error: None,
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &TaskPayload {
        &self.payload
    }

    pub fn origin(&self) -> TaskOrigin {
        self.origin
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn output(&self) -> Option<&TaskOutput> {
        self.output.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start(&mut self) -> Result<(), DomainError> {
        self.transition(TaskStatus::Running)
    }

    pub fn complete(&mut self, output: TaskOutput) -> Result<(), DomainError> {
        self.transition(TaskStatus::Done)?;
        self.output = Some(output);
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        self.transition(TaskStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }

    fn transition(&mut self, next: TaskStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidTransition {
                task: self.id.to_string(),
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        Ok(())
    }
}
