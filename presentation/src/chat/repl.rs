//! REPL (Read-Eval-Print Loop) for interactive research chat
//!
//! The chat keeps one [`ConversationState`] across turns. A clarification
//! leaves the questions in the conversation, so the next line the user types
//! starts a fresh run that sees both the original request and the answer.

use crate::cli::commands::OutputMode;
use crate::{ConsoleFormatter, ProgressReporter};
use reedline::{
    DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal,
};
use std::path::PathBuf;
use std::sync::Arc;
use thinker_application::{NoProgress, RunResearchUseCase};
use thinker_domain::{ConversationState, Message, RunError, RunOutcome};
use tracing::{debug, warn};

const HISTORY_SIZE: usize = 500;

/// A slash command typed at the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Clear,
    History,
    Exit,
}

impl ReplCommand {
    /// Parse a line starting with `/`; `None` for unknown commands.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "/help" | "/h" | "/?" => Some(Self::Help),
            "/clear" | "/reset" => Some(Self::Clear),
            "/history" => Some(Self::History),
            "/exit" | "/quit" | "/q" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Record what the assistant said so the next run sees it.
pub fn record_outcome(conversation: &mut ConversationState, outcome: &RunOutcome) {
    let reply = match outcome {
        RunOutcome::DirectAnswer { text } => text.clone(),
        RunOutcome::Clarification { questions } => questions.join("\n"),
        RunOutcome::Report(report) => report.summary.clone(),
    };
    conversation.push(Message::assistant(reply));
}

/// Interactive chat REPL
pub struct ChatRepl {
    use_case: Arc<RunResearchUseCase>,
    conversation: ConversationState,
    show_progress: bool,
    output: OutputMode,
}

impl ChatRepl {
    pub fn new(use_case: Arc<RunResearchUseCase>) -> Self {
        Self {
            use_case,
            conversation: ConversationState::new(),
            show_progress: true,
            output: OutputMode::Summary,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    fn history_path() -> Option<PathBuf> {
        dirs::data_dir().map(|p| p.join("agent-thinker").join("history.txt"))
    }

    fn line_editor() -> Reedline {
        let editor = Reedline::create();
        let Some(path) = Self::history_path() else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_SIZE, path) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Chat history unavailable: {}", e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = Self::line_editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("thinker".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) {
                            break;
                        }
                        continue;
                    }

                    self.process_request(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│          agent-thinker - Chat Mode          │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!(
            "Up to {} round(s) per request, {} retrieval task(s) at once.",
            self.use_case.config().max_rounds,
            self.use_case.config().retrieval_concurrency
        );
        println!("Press Ctrl-C during a run to cancel it.");
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /clear, /reset    - Start a new conversation");
        println!("  /history          - Show the conversation so far");
        println!("  /exit, /quit, /q  - Exit chat");
        println!();
    }

    /// Handle slash commands. Returns true if should exit.
    fn handle_command(&mut self, line: &str) -> bool {
        match ReplCommand::parse(line) {
            Some(ReplCommand::Exit) => {
                println!("Bye!");
                true
            }
            Some(ReplCommand::Help) => {
                println!();
                Self::print_help();
                false
            }
            Some(ReplCommand::Clear) => {
                self.conversation = ConversationState::new();
                println!("Conversation cleared.");
                false
            }
            Some(ReplCommand::History) => {
                if self.conversation.is_empty() {
                    println!("(empty)");
                } else {
                    println!("{}", self.conversation.transcript());
                }
                false
            }
            None => {
                println!("Unknown command: {}", line);
                println!("Type /help for available commands");
                false
            }
        }
    }

    async fn process_request(&mut self, request: &str) {
        println!();
        self.conversation.push(Message::user(request));

        let result = tokio::select! {
            result = self.execute() => result,
            _ = tokio::signal::ctrl_c() => {
                debug!("Run interrupted from the chat prompt");
                Err(RunError::cancelled())
            }
        };

        match result {
            Ok(outcome) => {
                print!("{}", ConsoleFormatter::format(&outcome, self.output));
                record_outcome(&mut self.conversation, &outcome);
            }
            Err(error) => {
                eprint!("{}", ConsoleFormatter::format_error(&error));
            }
        }
        println!();
    }

    async fn execute(&self) -> Result<RunOutcome, RunError> {
        if self.show_progress {
            let progress = ProgressReporter::new();
            self.use_case
                .execute_with_progress(&self.conversation, &progress)
                .await
        } else {
            self.use_case
                .execute_with_progress(&self.conversation, &NoProgress)
                .await
        }
    }
}
