//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod llm_agents;
pub mod retrieval_agent;
pub mod retry;
pub mod run_research;
pub(crate) mod shared;
pub mod structured;
