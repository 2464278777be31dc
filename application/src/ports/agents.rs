//! Agent ports used by the orchestrator
//!
//! The orchestrator only sees these four seams. Agents are stateless
//! request/response collaborators: they never touch the task queue and
//! never mutate the conversation.

use crate::ports::collaborators::CollaboratorError;
use crate::ports::completion_gateway::GatewayError;
use crate::ports::page_cache::CacheError;
use async_trait::async_trait;
use thinker_domain::{
    ConversationState, Evidence, FetchError, PageContent, PlannerDecision, SearchHit,
    SynthesisResult, ValidationResult,
};
use thiserror::Error;

/// Errors from the model-backed agents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// The model broke its output schema twice in a row
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Operation cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AgentError::Cancelled)
    }
}

/// Per-call context handed to the synthesis agent
#[derive(Debug, Clone, Copy)]
pub struct SynthesisContext<'a> {
    pub conversation: &'a ConversationState,
    pub round: u32,
    pub max_rounds: u32,
}

#[async_trait]
pub trait Planner: Send + Sync {
    /// Decide how to handle the latest request of `conversation`.
    async fn plan(&self, conversation: &ConversationState) -> Result<PlannerDecision, AgentError>;
}

#[async_trait]
pub trait Retriever: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError>;

    /// Fetch every URL; one entry per input URL, in input order.
    ///
    /// Per-URL failures are returned in place. Only a cache failure aborts
    /// the call.
    async fn retrieve(
        &self,
        urls: &[String],
        use_cache: bool,
    ) -> Result<Vec<Result<PageContent, FetchError>>, CacheError>;
}

#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(
        &self,
        objective: &str,
        evidence: &[Evidence],
        context: SynthesisContext<'_>,
    ) -> Result<SynthesisResult, AgentError>;
}

#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(
        &self,
        summary: &str,
        evidence: &[Evidence],
    ) -> Result<ValidationResult, AgentError>;
}
