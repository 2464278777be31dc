//! Synthesis results.
//!
//! A [`SynthesisResult`] can only be built through [`SynthesisResult::complete`]
//! or [`SynthesisResult::incomplete`], so `additional_tasks` is non-empty
//! exactly when the status is [`SynthesisStatus::Incomplete`].

use crate::core::error::DomainError;
use crate::core::json::parse_strict;
use crate::task::TaskPayload;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisStatus {
    Complete,
    Incomplete,
}

impl SynthesisStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SynthesisStatus::Complete => "complete",
            SynthesisStatus::Incomplete => "incomplete",
        }
    }
}

impl std::fmt::Display for SynthesisStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Draft answer returned by the synthesis agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SynthesisResult {
    status: SynthesisStatus,
    summary: String,
    additional_tasks: Vec<TaskPayload>,
}

impl SynthesisResult {
    pub fn complete(summary: impl Into<String>) -> Self {
        Self {
            status: SynthesisStatus::Complete,
            summary: summary.into(),
            additional_tasks: Vec::new(),
        }
    }

    /// An incomplete draft must ask for at least one more task.
    pub fn incomplete(
        summary: impl Into<String>,
        additional_tasks: Vec<TaskPayload>,
    ) -> Result<Self, DomainError> {
        if additional_tasks.is_empty() {
            return Err(DomainError::InvalidSynthesis(
                "incomplete result without additional tasks".to_string(),
            ));
        }
        Ok(Self {
            status: SynthesisStatus::Incomplete,
            summary: summary.into(),
            additional_tasks,
        })
    }

    pub fn status(&self) -> SynthesisStatus {
        self.status
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn additional_tasks(&self) -> &[TaskPayload] {
        &self.additional_tasks
    }

    pub fn is_complete(&self) -> bool {
        self.status == SynthesisStatus::Complete
    }

    pub fn into_parts(self) -> (SynthesisStatus, String, Vec<TaskPayload>) {
        (self.status, self.summary, self.additional_tasks)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SynthesisOutput {
    status: SynthesisStatus,
    summary: String,
    #[serde(default)]
    additional_tasks: Vec<AdditionalTaskOutput>,
}

// Optional fields are nullable so the same shape works with strict
// json_schema modes that require every property.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdditionalTaskOutput {
    kind: String,
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    urls: Option<Vec<String>>,
    #[serde(default)]
    use_cache: Option<bool>,
}

impl AdditionalTaskOutput {
    fn into_payload(self, default_use_cache: bool) -> Result<TaskPayload, DomainError> {
        match self.kind.trim().to_lowercase().as_str() {
            "search" => {
                let query = self.query.unwrap_or_default();
                let query = query.trim();
                if query.is_empty() {
                    return Err(DomainError::schema("search task without a query"));
                }
                Ok(TaskPayload::search(query))
            }
            "scrape" => {
                let urls: Vec<String> = self
                    .urls
                    .unwrap_or_default()
                    .into_iter()
                    .map(|u| u.trim().to_string())
                    .filter(|u| !u.is_empty())
                    .collect();
                if urls.is_empty() {
                    return Err(DomainError::schema("scrape task without urls"));
                }
                Ok(TaskPayload::scrape(
                    urls,
                    self.use_cache.unwrap_or(default_use_cache),
                ))
            }
            // Well-formed but not retrieval; the orchestrator rejects these
            "synthesize" => Ok(TaskPayload::Synthesize { round: 0 }),
            "validate" => Ok(TaskPayload::Validate),
            other => Err(DomainError::schema(format!("unknown task kind `{other}`"))),
        }
    }
}

/// Parse raw synthesis output.
///
/// `default_use_cache` applies to scrape tasks that do not carry their own
/// `use_cache` flag.
pub fn parse_synthesis_result(
    raw: &str,
    default_use_cache: bool,
) -> Result<SynthesisResult, DomainError> {
    let output: SynthesisOutput = parse_strict(raw, "synthesis output")?;
    let tasks = output
        .additional_tasks
        .into_iter()
        .map(|t| t.into_payload(default_use_cache))
        .collect::<Result<Vec<_>, _>>()?;

    match output.status {
        SynthesisStatus::Complete if !tasks.is_empty() => Err(DomainError::InvalidSynthesis(
            "complete result with additional tasks".to_string(),
        )),
        SynthesisStatus::Complete => Ok(SynthesisResult::complete(output.summary.trim())),
        SynthesisStatus::Incomplete => SynthesisResult::incomplete(output.summary.trim(), tasks),
    }
}
