//! Orchestrator configuration from TOML (`[orchestrator]` section)
//!
//! ```toml
//! [orchestrator]
//! max_rounds = 3
//! retrieval_concurrency = 4
//! run_timeout_secs = 600   # 0 disables the run deadline
//! use_cache = true
//! output_format = "markdown"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinker_domain::{ConfigIssue, ConfigIssueCode, OrchestratorConfig, OutputFormat};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestratorConfig {
    pub max_rounds: u32,
    pub retrieval_concurrency: usize,
    pub run_timeout_secs: u64,
    /// Default `use_cache` for plan steps and synthesis-requested scrapes
    pub use_cache: bool,
    /// Page format requested from the scrape service: markdown, html or text
    pub output_format: String,
}

impl Default for FileOrchestratorConfig {
    fn default() -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            max_rounds: defaults.max_rounds,
            retrieval_concurrency: defaults.retrieval_concurrency,
            run_timeout_secs: defaults.run_timeout.map_or(0, |t| t.as_secs()),
            use_cache: defaults.default_use_cache,
            output_format: defaults.output_format.as_str().to_string(),
        }
    }
}

impl FileOrchestratorConfig {
    pub fn parse_output_format(&self) -> (OutputFormat, Vec<ConfigIssue>) {
        match self.output_format.parse() {
            Ok(format) => (format, Vec::new()),
            Err(_) => (
                OutputFormat::Markdown,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::UnknownOutputFormat,
                    format!(
                        "orchestrator.output_format: unknown value '{}', falling back to 'markdown'",
                        self.output_format
                    ),
                )],
            ),
        }
    }

    /// Build the domain config; zero limits are raised to one.
    pub fn to_orchestrator_config(&self) -> (OrchestratorConfig, Vec<ConfigIssue>) {
        let (format, mut issues) = self.parse_output_format();
        if self.max_rounds == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::LimitClamped,
                "orchestrator.max_rounds is 0, using 1",
            ));
        }
        if self.retrieval_concurrency == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::LimitClamped,
                "orchestrator.retrieval_concurrency is 0, using 1",
            ));
        }

        let run_timeout =
            (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs));
        let config = OrchestratorConfig::default()
            .with_max_rounds(self.max_rounds)
            .with_retrieval_concurrency(self.retrieval_concurrency)
            .with_run_timeout(run_timeout)
            .with_default_use_cache(self.use_cache)
            .with_output_format(format);
        (config, issues)
    }
}
