//! Prompt domain
//!
//! Prompt text and output schemas for each structured model call of a run.

pub mod schema;
mod template;

pub use template::{MAX_EVIDENCE_CHARS, PromptTemplate};
