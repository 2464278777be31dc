//! Orchestrator configuration

use crate::retrieval::OutputFormat;
use std::time::Duration;

/// Limits and defaults for one research run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of retrieving -> synthesizing rounds
    pub max_rounds: u32,
    /// Maximum concurrent retrieval tasks within one batch
    pub retrieval_concurrency: usize,
    /// Whole-run deadline, checked at phase boundaries
    pub run_timeout: Option<Duration>,
    /// `use_cache` for plan steps and for synthesis tasks that omit it
    pub default_use_cache: bool,
    pub output_format: OutputFormat,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_rounds: 3,
            retrieval_concurrency: 4,
            run_timeout: Some(Duration::from_secs(600)),
            default_use_cache: true,
            output_format: OutputFormat::Markdown,
        }
    }
}

impl OrchestratorConfig {
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_retrieval_concurrency(mut self, concurrency: usize) -> Self {
        self.retrieval_concurrency = concurrency.max(1);
        self
    }

    pub fn with_run_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.run_timeout = timeout;
        self
    }

    pub fn with_default_use_cache(mut self, use_cache: bool) -> Self {
        self.default_use_cache = use_cache;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }
}
