//! Completion gateway port
//!
//! Defines the interface for structured model-completion calls. The
//! application layer only ever asks for a JSON object matching a schema;
//! prompt wording and model choice stay behind this seam.

use async_trait::async_trait;
use serde_json::Value;
use thinker_domain::Message;
use thiserror::Error;

/// Errors that can occur during completion calls
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

impl GatewayError {
    /// Timeouts, connection failures, 408, 429 and 5xx are worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::ConnectionError(_) => true,
            GatewayError::HttpStatus { status, .. } => {
                matches!(status, 408 | 429) || (500..600).contains(status)
            }
            _ => false,
        }
    }
}

/// Named JSON schema the completion must conform to
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, schema: Value) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// One structured completion call
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub schema: OutputSchema,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, messages: Vec<Message>, schema: OutputSchema) -> Self {
        Self {
            system: system.into(),
            messages,
            schema,
        }
    }

    /// Follow-up request that shows the model its rejected output and asks
    /// for a corrected one.
    pub fn with_correction(&self, rejected: &str, problem: &str) -> Self {
        let mut corrected = self.clone();
        corrected.messages.push(Message::assistant(rejected));
        corrected.messages.push(Message::user(format!(
            "Your previous response did not match the required output schema `{}`: {}\n\
             Respond again with a single JSON object that matches the schema exactly, with no other text.",
            self.schema.name, problem
        )));
        corrected
    }
}

/// Gateway for structured completions
///
/// Implementations (adapters) live in the infrastructure layer and return
/// the raw JSON text of the model's answer.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError>;
}
