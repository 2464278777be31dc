//! The task queue owned by the orchestrator.

use super::entities::{Task, TaskOutput};
use super::payload::TaskPayload;
use super::value_objects::{TaskId, TaskOrigin, TaskStatus};
use crate::core::error::DomainError;
use crate::retrieval::Evidence;
use serde::{Deserialize, Serialize};

/// Tasks of one run, in creation order. Tasks are never removed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending task and return its id.
    pub fn enqueue(&mut self, payload: TaskPayload, origin: TaskOrigin) -> TaskId {
        let id = TaskId::new(self.tasks.len() as u64 + 1);
        self.tasks.push(Task::new(id, payload, origin));
        id
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        let index = usize::try_from(id.value()).ok()?.checked_sub(1)?;
        self.tasks.get(index)
    }

    fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, DomainError> {
        let index = usize::try_from(id.value())
            .ok()
            .and_then(|v| v.checked_sub(1));
        index
            .and_then(|i| self.tasks.get_mut(i))
            .ok_or_else(|| DomainError::UnknownTask(id.to_string()))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Pending search and scrape tasks, in creation order.
    pub fn pending_retrieval(&self) -> Vec<TaskId> {
        self.tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Pending && t.kind().is_retrieval())
            .map(Task::id)
            .collect()
    }

    pub fn start(&mut self, id: TaskId) -> Result<(), DomainError> {
        self.get_mut(id)?.start()
    }

    pub fn complete(&mut self, id: TaskId, output: TaskOutput) -> Result<(), DomainError> {
        self.get_mut(id)?.complete(output)
    }

    pub fn fail(&mut self, id: TaskId, error: impl Into<String>) -> Result<(), DomainError> {
        self.get_mut(id)?.fail(error)
    }

    pub fn count_by_status(&self, status: TaskStatus) -> usize {
        self.tasks.iter().filter(|t| t.status() == status).count()
    }

    pub fn retrieval_count(&self, status: TaskStatus) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.kind().is_retrieval() && t.status() == status)
            .count()
    }

    /// All evidence from finished retrieval tasks, in task creation order.
    ///
    /// A scrape task contributes one item per retrieved page; a search task
    /// contributes its result set as a single item unless it came back empty.
    pub fn evidence(&self) -> Vec<Evidence> {
        let mut evidence = Vec::new();
        for task in &self.tasks {
            if task.status() != TaskStatus::Done {
                continue;
            }
            match task.output() {
                Some(TaskOutput::SearchResults { query, hits }) if !hits.is_empty() => {
                    evidence.push(Evidence::from_search(task.id(), query, hits));
                }
                Some(TaskOutput::Pages { pages, .. }) => {
                    evidence.extend(pages.iter().map(|p| Evidence::from_page(task.id(), p)));
                }
                _ => {}
            }
        }
        evidence
    }
}
