//! Progress reporting for research runs

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use thinker_application::ports::progress::ProgressNotifier;
use thinker_domain::{RunPhase, Task, TaskStatus};

/// Reports progress with a spinner per phase and one line per finished task
pub struct ProgressReporter {
    multi: MultiProgress,
    phase_bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            phase_bar: Mutex::new(None),
        }
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finish_current_phase(&self) {
        if let Ok(mut bar) = self.phase_bar.lock()
            && let Some(pb) = bar.take()
        {
            pb.finish_and_clear();
        }
    }

    fn set_message(&self, message: String) {
        if let Ok(bar) = self.phase_bar.lock()
            && let Some(pb) = bar.as_ref()
        {
            pb.set_message(message);
        }
    }

    fn println(&self, line: String) {
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_phase_change(&self, phase: RunPhase) {
        self.finish_current_phase();

        if phase.is_terminal() {
            if phase == RunPhase::Failed {
                self.println(format!("{} {}", "x".red(), phase.display_name().red().bold()));
            }
            return;
        }

        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::phase_style());
        pb.set_prefix(phase.display_name().to_string());
        pb.set_message("...");
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bar) = self.phase_bar.lock() {
            *bar = Some(pb);
        }
    }

    fn on_round_start(&self, round: u32, max_rounds: u32, pending_tasks: usize) {
        self.println(format!(
            "{} {}",
            "->".cyan(),
            format!(
                "Round {}/{} ({} task(s) queued)",
                round, max_rounds, pending_tasks
            )
            .bold()
        ));
    }

    fn on_task_start(&self, task: &Task) {
        self.set_message(task.payload().describe());
    }

    fn on_task_complete(&self, task: &Task) {
        let line = match task.status() {
            TaskStatus::Done => format!("  {} {}", "v".green(), task.payload().describe()),
            _ => format!(
                "  {} {} {}",
                "x".red(),
                task.payload().describe(),
                format!("({})", task.error().unwrap_or("failed")).dimmed()
            ),
        };
        self.println(line);
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_phase_change(&self, phase: RunPhase) {
        if !phase.is_terminal() {
            println!("{} {}", "->".cyan(), phase.display_name().bold());
        }
    }

    fn on_round_start(&self, round: u32, max_rounds: u32, pending_tasks: usize) {
        println!(
            "   Round {}/{} ({} task(s) queued)",
            round, max_rounds, pending_tasks
        );
    }

    fn on_task_start(&self, _task: &Task) {}

    fn on_task_complete(&self, task: &Task) {
        if task.status() == TaskStatus::Done {
            println!("  {} {}", "v".green(), task.payload().describe());
        } else {
            println!(
                "  {} {} (failed: {})",
                "x".red(),
                task.payload().describe(),
                task.error().unwrap_or("unknown error")
            );
        }
    }
}
