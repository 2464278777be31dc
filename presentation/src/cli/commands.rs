//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thinker_domain::{OrchestratorConfig, OutputFormat};

/// How a finished run is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Summary, sources, validation and run statistics
    Full,
    /// Only the final answer or summary
    Summary,
    /// The whole outcome as JSON
    Json,
}

/// CLI arguments for agent-thinker
#[derive(Parser, Debug)]
#[command(name = "agent-thinker")]
#[command(author, version, about = "Research agent - plans, searches, scrapes and writes cited summaries")]
#[command(long_about = r#"
agent-thinker answers questions by researching them.

A run has up to four phases:
1. Planning: answer directly, ask for clarification, or plan retrieval steps
2. Retrieving: run search and scrape tasks concurrently, with a page cache
3. Synthesizing: write a cited summary, asking for more retrieval if needed
4. Validating: check the summary's claims against the retrieved evidence

Configuration files are loaded from (in priority order):
1. THINKER_* environment variables (e.g. THINKER_ORCHESTRATOR__MAX_ROUNDS=2)
2. --config <path>       Explicit config file
3. ./thinker.toml        Project-level config
4. ~/.config/agent-thinker/config.toml   Global config

Example:
  agent-thinker "How does tokio's work-stealing scheduler work?"
  agent-thinker --max-rounds 1 --no-cache -o summary "Summarize https://tokio.rs/blog"
  agent-thinker --chat
"#)]
pub struct Cli {
    /// The request to research (not required in chat mode)
    pub request: Option<String>,

    /// Start interactive chat mode
    #[arg(short, long)]
    pub chat: bool,

    /// Maximum retrieving -> synthesizing rounds per run
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<u32>,

    /// Maximum retrieval tasks running at once
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Run deadline in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Fetch every page fresh instead of reading the page cache
    #[arg(long)]
    pub no_cache: bool,

    /// Page format requested from the scrape service (markdown, html, text)
    #[arg(long, value_name = "FORMAT")]
    pub page_format: Option<OutputFormat>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "full")]
    pub output: OutputMode,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration sources and the merged configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Directory for the log file and run transcripts
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of the configured limits.
    pub fn apply_overrides(&self, mut config: OrchestratorConfig) -> OrchestratorConfig {
        if let Some(max_rounds) = self.max_rounds {
            config = config.with_max_rounds(max_rounds);
        }
        if let Some(concurrency) = self.concurrency {
            config = config.with_retrieval_concurrency(concurrency);
        }
        if let Some(secs) = self.timeout {
            config = config.with_run_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }
        if self.no_cache {
            config = config.with_default_use_cache(false);
        }
        if let Some(format) = self.page_format {
            config = config.with_output_format(format);
        }
        config
    }
}
