//! Run Research use case
//!
//! The orchestrator: owns the task queue and drives a run through
//! `Planning -> Retrieving <-> Synthesizing -> Validating -> Done`.
//!
//! Agents never see the queue. They return results and this use case
//! applies them, so every status change goes through one place.

mod retrieval;

#[cfg(test)]
mod tests;

use crate::ports::agents::{Planner, Retriever, SynthesisContext, Synthesizer, Validator};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::use_cases::shared::{cancellable, check_cancelled};
use std::sync::Arc;
use thinker_domain::{
    ConversationState, DomainError, OrchestratorConfig, PlannerDecision, RunError, RunErrorKind,
    RunOutcome, RunPhase, RunState, SynthesisStatus, TaskId, TaskOrigin, TaskOutput, TaskPayload,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for running one research request end to end
pub struct RunResearchUseCase {
    planner: Arc<dyn Planner>,
    retriever: Arc<dyn Retriever>,
    synthesizer: Arc<dyn Synthesizer>,
    validator: Arc<dyn Validator>,
    config: OrchestratorConfig,
    cancellation_token: Option<CancellationToken>,
    conversation_logger: Arc<dyn ConversationLogger>,
}

impl RunResearchUseCase {
    pub fn new(
        planner: Arc<dyn Planner>,
        retriever: Arc<dyn Retriever>,
        synthesizer: Arc<dyn Synthesizer>,
        validator: Arc<dyn Validator>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            planner,
            retriever,
            synthesizer,
            validator,
            config,
            cancellation_token: None,
            conversation_logger: Arc::new(NoConversationLogger),
        }
    }

    /// Set a cancellation token for graceful interruption
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Set a conversation logger for the structured run transcript
    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.conversation_logger = logger;
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, conversation: &ConversationState) -> Result<RunOutcome, RunError> {
        self.execute_with_progress(conversation, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        conversation: &ConversationState,
        progress: &dyn ProgressNotifier,
    ) -> Result<RunOutcome, RunError> {
        self.run(conversation, progress).await.into_result()
    }

    /// Run to a terminal phase and return the full state for inspection.
    pub async fn run(
        &self,
        conversation: &ConversationState,
        progress: &dyn ProgressNotifier,
    ) -> RunState {
        let deadline = self.config.run_timeout.map(|t| Instant::now() + t);
        let mut state = RunState::new();
        progress.on_phase_change(RunPhase::Planning);

        if let Err(error) = self.drive(&mut state, conversation, deadline, progress).await {
            warn!("Run failed in phase {}: {}", state.phase().as_str(), error);
            self.conversation_logger.log(ConversationEvent::new(
                "run_failed",
                serde_json::json!({
                    "phase": state.phase().as_str(),
                    "kind": error.kind.as_str(),
                    "message": error.message,
                }),
            ));
            state.fail(error);
            progress.on_phase_change(state.phase());
        }

        state
    }

    async fn drive(
        &self,
        state: &mut RunState,
        conversation: &ConversationState,
        deadline: Option<Instant>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        // ==================== Planning ====================
        self.check_boundary(deadline)?;
        let decision = cancellable(
            &self.cancellation_token,
            deadline,
            self.planner.plan(conversation),
        )
        .await?
        .map_err(|e| {
            if e.is_cancelled() {
                RunError::cancelled()
            } else {
                RunError::new(RunErrorKind::PlannerFailed, e.to_string())
            }
        })?;

        self.conversation_logger.log(ConversationEvent::new(
            "planner_decision",
            serde_json::to_value(&decision).unwrap_or_default(),
        ));

        let (objective, steps) = match decision {
            PlannerDecision::DirectAnswer { text } => {
                info!("Simple request, answering directly");
                state.finish_direct(text).map_err(invalid_transition)?;
                progress.on_phase_change(RunPhase::Done);
                return Ok(());
            }
            PlannerDecision::Clarify { questions } => {
                info!("Planner asked {} clarification questions", questions.len());
                state.await_user(questions).map_err(invalid_transition)?;
                progress.on_phase_change(RunPhase::AwaitingUser);
                return Ok(());
            }
            PlannerDecision::Plan { objective, steps } => (objective, steps),
        };

        info!("Plan: {} ({} steps)", objective, steps.len());
        state.set_objective(&objective);
        for step in &steps {
            let payload = TaskPayload::from_plan_step(step, self.config.default_use_cache);
            debug!("Plan step '{}' -> {}", step, payload.describe());
            state.queue_mut().enqueue(payload, TaskOrigin::Plan);
        }
        self.enter(state, RunPhase::Retrieving, progress)?;

        // ==================== Retrieving <-> Synthesizing ====================
        loop {
            let round = state.begin_round();
            let pending = state.queue().pending_retrieval().len();
            info!("Round {}/{}: {} retrieval tasks", round, self.config.max_rounds, pending);
            progress.on_round_start(round, self.config.max_rounds, pending);

            self.check_boundary(deadline)?;
            self.retrieve_batch(state, deadline, progress).await?;

            self.enter(state, RunPhase::Synthesizing, progress)?;
            self.check_boundary(deadline)?;
            if !self.synthesize_round(state, conversation, round, deadline, progress).await? {
                break;
            }
            self.enter(state, RunPhase::Retrieving, progress)?;
        }

        // ==================== Validating ====================
        self.enter(state, RunPhase::Validating, progress)?;
        self.check_boundary(deadline)?;
        self.validate(state, deadline, progress).await?;

        state.finish_report().map_err(invalid_transition)?;
        progress.on_phase_change(RunPhase::Done);
        self.conversation_logger.log(ConversationEvent::new(
            "run_completed",
            serde_json::json!({
                "rounds": state.rounds(),
                "possibly_incomplete": state.possibly_incomplete(),
                "tasks": state.queue().len(),
                "verdict": state.validation().map(|v| v.verdict().as_str()),
            }),
        ));
        Ok(())
    }

    /// One synthesis call. Returns `true` when another retrieval round follows.
    async fn synthesize_round(
        &self,
        state: &mut RunState,
        conversation: &ConversationState,
        round: u32,
        deadline: Option<Instant>,
        progress: &dyn ProgressNotifier,
    ) -> Result<bool, RunError> {
        let evidence = state.queue().evidence();
        let objective = state.objective().unwrap_or_default().to_string();
        let task_id = self.start_bookkeeping_task(state, TaskPayload::Synthesize { round }, progress)?;

        let context = SynthesisContext {
            conversation,
            round,
            max_rounds: self.config.max_rounds,
        };
        let result = cancellable(
            &self.cancellation_token,
            deadline,
            self.synthesizer.synthesize(&objective, &evidence, context),
        )
        .await;
        let result = self.interrupted(state, task_id, result, progress)?;

        let result = match result {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                self.fail_task(state, task_id, e.to_string(), progress)?;
                return Err(RunError::cancelled());
            }
            Err(e) => {
                warn!("Synthesis failed in round {}: {}", round, e);
                self.fail_task(state, task_id, e.to_string(), progress)?;
                if state.summary().is_some() {
                    // Fall back to the previous round's draft
                    state.mark_possibly_incomplete();
                    return Ok(false);
                }
                return Err(RunError::new(RunErrorKind::SynthesisFailed, e.to_string()));
            }
        };

        let (status, summary, additional_tasks) = result.into_parts();
        self.conversation_logger.log(ConversationEvent::new(
            "synthesis_result",
            serde_json::json!({
                "round": round,
                "status": status.as_str(),
                "evidence": evidence.len(),
                "additional_tasks": additional_tasks,
            }),
        ));
        state
            .queue_mut()
            .complete(
                task_id,
                TaskOutput::Synthesis {
                    status,
                    summary: summary.clone(),
                },
            )
            .map_err(invalid_transition)?;
        self.notify_complete(state, task_id, progress);

        if !summary.trim().is_empty() {
            state.set_summary(summary);
        }
        if state.summary().is_none() {
            return Err(RunError::new(
                RunErrorKind::SynthesisFailed,
                format!("round {} produced no summary", round),
            ));
        }

        if status == SynthesisStatus::Complete {
            info!("Synthesis complete after {} rounds", round);
            return Ok(false);
        }

        if round >= self.config.max_rounds {
            warn!(
                "Reached max rounds ({}) with incomplete synthesis",
                self.config.max_rounds
            );
            state.mark_possibly_incomplete();
            return Ok(false);
        }

        let accepted = self.enqueue_additional(state, additional_tasks, round, progress)?;
        if accepted == 0 {
            warn!("Synthesis requested no usable retrieval tasks");
            state.mark_possibly_incomplete();
            return Ok(false);
        }
        Ok(true)
    }

    /// Queue tasks requested by synthesis. Anything that is not a search or
    /// scrape is recorded as failed and never dispatched.
    fn enqueue_additional(
        &self,
        state: &mut RunState,
        tasks: Vec<TaskPayload>,
        round: u32,
        progress: &dyn ProgressNotifier,
    ) -> Result<usize, RunError> {
        let mut accepted = 0;
        for payload in tasks {
            let retrieval = payload.is_retrieval();
            let kind = payload.kind();
            let id = state
                .queue_mut()
                .enqueue(payload, TaskOrigin::Synthesis { round });
            if retrieval {
                accepted += 1;
            } else {
                warn!("Rejecting {} task requested by synthesis", kind);
                self.fail_task(
                    state,
                    id,
                    format!("synthesis may only request retrieval tasks, not {}", kind),
                    progress,
                )?;
            }
        }
        Ok(accepted)
    }

    async fn validate(
        &self,
        state: &mut RunState,
        deadline: Option<Instant>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        let summary = state.summary().unwrap_or_default().to_string();
        let evidence = state.queue().evidence();
        let task_id = self.start_bookkeeping_task(state, TaskPayload::Validate, progress)?;

        let result = cancellable(
            &self.cancellation_token,
            deadline,
            self.validator.validate(&summary, &evidence),
        )
        .await;
        let result = self.interrupted(state, task_id, result, progress)?;

        match result {
            Ok(validation) => {
                info!(
                    "Validation verdict: {} ({} flagged)",
                    validation.verdict(),
                    validation.flagged().len()
                );
                self.conversation_logger.log(ConversationEvent::new(
                    "validation_result",
                    serde_json::json!({
                        "verdict": validation.verdict().as_str(),
                        "flagged": validation.flagged(),
                    }),
                ));
                state
                    .queue_mut()
                    .complete(
                        task_id,
                        TaskOutput::Validation {
                            verdict: validation.verdict(),
                        },
                    )
                    .map_err(invalid_transition)?;
                self.notify_complete(state, task_id, progress);
                state.set_validation(validation);
            }
            Err(e) if e.is_cancelled() => {
                self.fail_task(state, task_id, e.to_string(), progress)?;
                return Err(RunError::cancelled());
            }
            Err(e) => {
                // Advisory: the answer is still delivered
                warn!("Validation failed: {}", e);
                self.fail_task(state, task_id, e.to_string(), progress)?;
                state.set_validation_error(e.to_string());
            }
        }
        Ok(())
    }

    // ==================== Helpers ====================

    fn check_boundary(&self, deadline: Option<Instant>) -> Result<(), RunError> {
        check_cancelled(&self.cancellation_token, deadline)
    }

    fn enter(
        &self,
        state: &mut RunState,
        next: RunPhase,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        let from = state.phase();
        state.transition(next).map_err(invalid_transition)?;
        debug!("Phase {} -> {}", from.as_str(), next.as_str());
        progress.on_phase_change(next);
        self.conversation_logger.log(ConversationEvent::new(
            "phase_changed",
            serde_json::json!({ "from": from.as_str(), "to": next.as_str(), "round": state.rounds() }),
        ));
        Ok(())
    }

    fn start_bookkeeping_task(
        &self,
        state: &mut RunState,
        payload: TaskPayload,
        progress: &dyn ProgressNotifier,
    ) -> Result<TaskId, RunError> {
        let id = state.queue_mut().enqueue(payload, TaskOrigin::Orchestrator);
        state.queue_mut().start(id).map_err(invalid_transition)?;
        if let Some(task) = state.queue().get(id) {
            progress.on_task_start(task);
        }
        Ok(id)
    }

    /// Close the in-flight task when a call was cut short by cancel or deadline.
    fn interrupted<T>(
        &self,
        state: &mut RunState,
        id: TaskId,
        result: Result<T, RunError>,
        progress: &dyn ProgressNotifier,
    ) -> Result<T, RunError> {
        match result {
            Ok(value) => Ok(value),
            Err(e) => {
                self.fail_task(state, id, e.message.clone(), progress)?;
                Err(e)
            }
        }
    }

    fn fail_task(
        &self,
        state: &mut RunState,
        id: TaskId,
        error: String,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        state.queue_mut().fail(id, error).map_err(invalid_transition)?;
        self.notify_complete(state, id, progress);
        Ok(())
    }

    fn notify_complete(&self, state: &RunState, id: TaskId, progress: &dyn ProgressNotifier) {
        let Some(task) = state.queue().get(id) else {
            return;
        };
        progress.on_task_complete(task);
        self.conversation_logger.log(ConversationEvent::new(
            "task_completed",
            serde_json::json!({
                "id": task.id().value(),
                "kind": task.kind().as_str(),
                "status": task.status().as_str(),
                "description": task.payload().describe(),
                "error": task.error(),
            }),
        ));
    }
}

fn invalid_transition(error: DomainError) -> RunError {
    RunError::new(RunErrorKind::InvalidTransition, error.to_string())
}
