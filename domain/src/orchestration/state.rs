//! Mutable state of one research run.

use super::outcome::{ResearchReport, RunError, RunErrorKind, RunOutcome};
use super::phase::RunPhase;
use crate::core::error::DomainError;
use crate::task::TaskQueue;
use crate::validation::ValidationResult;

/// State of a single run, owned and mutated only by the orchestrator.
#[derive(Debug, Clone)]
pub struct RunState {
    phase: RunPhase,
    history: Vec<RunPhase>,
    queue: TaskQueue,
    objective: Option<String>,
    rounds: u32,
    summary: Option<String>,
    possibly_incomplete: bool,
    validation: Option<ValidationResult>,
    validation_error: Option<String>,
    error: Option<RunError>,
    outcome: Option<RunOutcome>,
}

impl Default for RunState {
    fn default() -> Self {
        Self::new()
    }
}

impl RunState {
    pub fn new() -> Self {
        Self {
            phase: RunPhase::Planning,
            history: vec![RunPhase::Planning],
            queue: TaskQueue::new(),
            objective: None,
            rounds: 0,
            summary: None,
            possibly_incomplete: false,
            validation: None,
            validation_error: None,
            error: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Every phase the run has been in, starting with `Planning`
    pub fn history(&self) -> &[RunPhase] {
        &self.history
    }

    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut TaskQueue {
        &mut self.queue
    }

    pub fn objective(&self) -> Option<&str> {
        self.objective.as_deref()
    }

    pub fn set_objective(&mut self, objective: impl Into<String>) {
        self.objective = Some(objective.into());
    }

    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// Start the next retrieving -> synthesizing round and return its number.
    pub fn begin_round(&mut self) -> u32 {
        self.rounds += 1;
        self.rounds
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    pub fn possibly_incomplete(&self) -> bool {
        self.possibly_incomplete
    }

    pub fn mark_possibly_incomplete(&mut self) {
        self.possibly_incomplete = true;
    }

    pub fn validation(&self) -> Option<&ValidationResult> {
        self.validation.as_ref()
    }

    pub fn set_validation(&mut self, result: ValidationResult) {
        self.validation = Some(result);
    }

    pub fn set_validation_error(&mut self, error: impl Into<String>) {
        self.validation_error = Some(error.into());
    }

    pub fn error(&self) -> Option<&RunError> {
        self.error.as_ref()
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn transition(&mut self, next: RunPhase) -> Result<(), DomainError> {
        if !self.phase.can_transition_to(next) {
            return Err(DomainError::InvalidPhaseTransition {
                from: self.phase.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }
        self.phase = next;
        self.history.push(next);
        Ok(())
    }

    /// Record a fatal error and move to `Failed`.
    ///
    /// Ignored once the run is terminal, so the first recorded error wins.
    pub fn fail(&mut self, error: RunError) {
        if self.transition(RunPhase::Failed).is_ok() {
            self.error = Some(error);
        }
    }

    /// Finish a simple request.
    pub fn finish_direct(&mut self, text: impl Into<String>) -> Result<(), DomainError> {
        self.transition(RunPhase::Done)?;
        self.outcome = Some(RunOutcome::DirectAnswer { text: text.into() });
        Ok(())
    }

    /// Stop and hand clarification questions back to the caller.
    pub fn await_user(&mut self, questions: Vec<String>) -> Result<(), DomainError> {
        self.transition(RunPhase::AwaitingUser)?;
        self.outcome = Some(RunOutcome::Clarification { questions });
        Ok(())
    }

    /// Finish a research run with a report built from the accumulated state.
    pub fn finish_report(&mut self) -> Result<(), DomainError> {
        self.transition(RunPhase::Done)?;
        let report = ResearchReport {
            objective: self.objective.clone().unwrap_or_default(),
            summary: self.summary.clone().unwrap_or_default(),
            validation: self.validation.clone(),
            validation_error: self.validation_error.clone(),
            possibly_incomplete: self.possibly_incomplete,
            rounds: self.rounds,
            evidence: self.queue.evidence(),
            tasks: self.queue.tasks().to_vec(),
        };
        self.outcome = Some(RunOutcome::Report(report));
        Ok(())
    }

    /// Either the outcome of the run or the structured error that ended it.
    pub fn into_result(self) -> Result<RunOutcome, RunError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        self.outcome.ok_or_else(|| {
            RunError::new(
                RunErrorKind::InvalidTransition,
                format!("run stopped in phase {} without an outcome", self.phase.as_str()),
            )
        })
    }
}
