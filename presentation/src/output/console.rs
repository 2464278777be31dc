//! Console output formatter for run outcomes

use crate::cli::commands::OutputMode;
use colored::Colorize;
use thinker_domain::{ResearchReport, RunError, RunOutcome, TaskStatus, ValidationResult, Verdict};

/// Formats run outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format an outcome in the requested mode
    pub fn format(outcome: &RunOutcome, mode: OutputMode) -> String {
        match mode {
            OutputMode::Full => Self::format_full(outcome),
            OutputMode::Summary => Self::format_summary_only(outcome),
            OutputMode::Json => Self::format_json(outcome),
        }
    }

    pub fn format_full(outcome: &RunOutcome) -> String {
        match outcome {
            RunOutcome::DirectAnswer { text } => format!("{}\n", text),
            RunOutcome::Clarification { questions } => Self::format_clarification(questions),
            RunOutcome::Report(report) => Self::format_report(report),
        }
    }

    /// Format as JSON
    pub fn format_json(outcome: &RunOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Only the answer text (concise output)
    pub fn format_summary_only(outcome: &RunOutcome) -> String {
        match outcome {
            RunOutcome::DirectAnswer { text } => format!("{}\n", text),
            RunOutcome::Clarification { questions } => Self::format_clarification(questions),
            RunOutcome::Report(report) => format!("{}\n", report.summary.trim_end()),
        }
    }

    pub fn format_clarification(questions: &[String]) -> String {
        let mut output = format!("{}\n", "I need a bit more detail:".yellow().bold());
        for question in questions {
            output.push_str(&format!("  ? {}\n", question));
        }
        output
    }

    pub fn format_report(report: &ResearchReport) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Research Report"));
        output.push('\n');
        output.push_str(&format!(
            "{} {}\n",
            "Objective:".cyan().bold(),
            report.objective
        ));

        output.push_str(&Self::section_header("Summary"));
        output.push_str(report.summary.trim_end());
        output.push('\n');

        let sources = report.sources();
        if !sources.is_empty() {
            output.push_str(&Self::section_header("Sources"));
            for (i, source) in sources.iter().enumerate() {
                output.push_str(&format!("  [{}] {}\n", i + 1, source));
            }
        }

        output.push_str(&Self::section_header("Validation"));
        match (&report.validation, &report.validation_error) {
            (Some(validation), _) => output.push_str(&Self::format_validation(validation)),
            (None, Some(error)) => output.push_str(&format!(
                "{} {}\n",
                "Validation unavailable:".yellow(),
                error
            )),
            (None, None) => output.push_str(&format!("{}\n", "Not run".dimmed())),
        }

        if report.possibly_incomplete {
            output.push_str(&format!(
                "\n{} {}\n",
                "!".yellow().bold(),
                "Research stopped at the round limit; the summary may be incomplete.".yellow()
            ));
        }

        let done = report
            .tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Done)
            .count();
        let failed = report
            .tasks
            .iter()
            .filter(|t| t.status() == TaskStatus::Failed)
            .count();
        output.push_str(&format!(
            "\n{}\n",
            format!(
                "{} round(s), {} task(s) done, {} failed, {} piece(s) of evidence",
                report.rounds,
                done,
                failed,
                report.evidence.len()
            )
            .dimmed()
        ));

        output.push_str(&Self::footer());
        output
    }

    fn format_validation(validation: &ValidationResult) -> String {
        let mut output = match validation.verdict() {
            Verdict::Verified => format!("{} all claims supported\n", "v verified".green().bold()),
            Verdict::IssuesFound => format!(
                "{} {} claim(s) flagged\n",
                "x issues found".red().bold(),
                validation.flagged().len()
            ),
        };
        for claim in validation.flagged() {
            output.push_str(&format!("  - {}\n", claim));
        }
        output
    }

    pub fn format_error(error: &RunError) -> String {
        if error.is_cancelled() {
            return format!("{}\n", "Cancelled.".yellow());
        }
        format!(
            "{} {} ({})\n",
            "Error:".red().bold(),
            error.message,
            error.kind
        )
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("{}\n", "=".repeat(60).cyan())
    }
}
