//! Progress notification port
//!
//! Defines the interface for reporting progress during a research run.

use thinker_domain::{RunPhase, Task};

/// Callback for progress updates during a research run
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinners, plain lines, nothing at all).
pub trait ProgressNotifier: Send + Sync {
    /// Called after every phase transition, and once for the initial phase
    fn on_phase_change(&self, phase: RunPhase);

    /// Called when a retrieving -> synthesizing round starts
    fn on_round_start(&self, round: u32, max_rounds: u32, pending_tasks: usize);

    /// Called when a task is dispatched
    fn on_task_start(&self, task: &Task);

    /// Called once a task has reached `Done` or `Failed`
    fn on_task_complete(&self, task: &Task);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_change(&self, _phase: RunPhase) {}
    fn on_round_start(&self, _round: u32, _max_rounds: u32, _pending_tasks: usize) {}
    fn on_task_start(&self, _task: &Task) {}
    fn on_task_complete(&self, _task: &Task) {}
}
