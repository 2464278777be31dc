//! Application layer for agent-thinker
//!
//! This crate contains the research orchestrator, the agents it drives and
//! the port definitions adapters implement. It depends only on the domain
//! layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    agents::{AgentError, Planner, Retriever, SynthesisContext, Synthesizer, Validator},
    collaborators::{CollaboratorError, ScrapePort, SearchPort},
    completion_gateway::{CompletionGateway, CompletionRequest, GatewayError, OutputSchema},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    page_cache::{CacheError, PageCache},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::llm_agents::{LlmPlanner, LlmSynthesizer, LlmValidator};
pub use use_cases::retrieval_agent::{DEFAULT_MAX_CONCURRENT_FETCHES, RetrievalAgent};
pub use use_cases::retry::RetryPolicy;
pub use use_cases::run_research::RunResearchUseCase;
pub use use_cases::structured::complete_structured;
