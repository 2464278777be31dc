//! Completion providers implementing the `CompletionGateway` port.

pub mod openai;

pub use openai::{OpenAiCompletionGateway, OpenAiSettings};
