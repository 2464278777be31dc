//! Domain layer for agent-thinker
//!
//! This crate contains the data model of a research run: conversation state,
//! the task queue, retrieved evidence, the structured results returned by the
//! planner, synthesis and validation agents, and the run state machine.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! - **Plan**: ordered retrieval steps produced for a complex request
//! - **Task**: a queued unit of search, scrape, synthesis or validation work
//! - **Evidence**: successfully retrieved content, kept in task creation order
//! - **Round**: one retrieving -> synthesizing cycle, bounded by `max_rounds`

pub mod config;
pub mod conversation;
pub mod core;
pub mod orchestration;
pub mod planning;
pub mod prompt;
pub mod retrieval;
pub mod synthesis;
pub mod task;
pub mod validation;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, Severity};
pub use conversation::{ConversationState, Message, Role};
pub use core::{error::DomainError, string::truncate};
pub use orchestration::{
    config::OrchestratorConfig,
    outcome::{ResearchReport, RunError, RunErrorKind, RunOutcome},
    phase::RunPhase,
    state::RunState,
};
pub use planning::{PlannerDecision, parse_planner_decision};
pub use prompt::PromptTemplate;
pub use retrieval::{
    CacheEntry, CacheKey, Evidence, EvidenceSource, FetchError, OutputFormat, PageContent,
    SearchHit, extract_urls, normalize_url,
};
pub use synthesis::{SynthesisResult, SynthesisStatus, parse_synthesis_result};
pub use task::{Task, TaskId, TaskKind, TaskOrigin, TaskOutput, TaskPayload, TaskQueue, TaskStatus};
pub use validation::{
    CitationReport, ClaimCheck, ValidationResult, Verdict, extract_citations,
    parse_validation_result,
};
