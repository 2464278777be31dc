//! OpenAI chat-completions gateway.
//!
//! Every call asks for a `json_schema` response format. Schemas whose root is
//! an object are sent in strict mode; the planner's `anyOf` root is not
//! accepted by strict mode and is only enforced by the local parser.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use thinker_application::ports::completion_gateway::{
    CompletionGateway, CompletionRequest, GatewayError,
};
use thinker_domain::prompt::schema::supports_strict_mode;
use thinker_domain::{Role, truncate};
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f32 = 0.06;

/// Connection settings for [`OpenAiCompletionGateway`]
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub request_timeout: Duration,
}

impl OpenAiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            request_timeout: Duration::from_secs(120),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: Value,
}

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// [`CompletionGateway`] over the OpenAI chat-completions endpoint
pub struct OpenAiCompletionGateway {
    client: reqwest::Client,
    settings: OpenAiSettings,
}

impl OpenAiCompletionGateway {
    pub fn new(settings: OpenAiSettings) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| GatewayError::Other(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn build_body<'a>(&'a self, request: &CompletionRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.settings.model,
            messages: chat_messages(request),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            response_format: response_format(request),
        }
    }
}

#[async_trait]
impl CompletionGateway for OpenAiCompletionGateway {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, GatewayError> {
        let body = self.build_body(request);
        debug!(
            "Completion request: model={}, schema={}, messages={}",
            self.settings.model,
            request.schema.name,
            body.messages.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_transport_error)?;
        if !(200..300).contains(&status) {
            return Err(map_status(status, &text));
        }

        extract_content(&text)
    }
}

fn chat_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    messages.push(ChatMessage {
        role: "system",
        content: request.system.clone(),
    });
    for message in &request.messages {
        let (role, content) = match message.role {
            Role::User => ("user", message.content.clone()),
            Role::Assistant => ("assistant", message.content.clone()),
            // Tool results are replayed as user turns; no tool calls are declared
            Role::Tool => (
                "user",
                format!(
                    "Tool output ({}):\n{}",
                    message.tool_call.as_deref().unwrap_or("tool"),
                    message.content
                ),
            ),
        };
        messages.push(ChatMessage { role, content });
    }
    messages
}

fn response_format(request: &CompletionRequest) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": request.schema.name,
            "schema": request.schema.schema,
            "strict": supports_strict_mode(&request.schema.schema),
        }
    })
}

fn extract_content(body: &str) -> Result<String, GatewayError> {
    let response: ChatResponse = serde_json::from_str(body).map_err(|e| {
        GatewayError::InvalidResponse(format!("{}: {}", e, truncate(body, 200)))
    })?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::InvalidResponse("no choices in response".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(GatewayError::InvalidResponse(format!(
            "model refused: {}",
            refusal
        )));
    }
    match choice.message.content {
        Some(content) if !content.trim().is_empty() => Ok(content),
        _ => Err(GatewayError::InvalidResponse(format!(
            "empty completion (finish_reason: {})",
            choice.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}

fn map_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::Unauthorized(truncate(body, 200)),
        _ => GatewayError::HttpStatus {
            status,
            body: truncate(body, 500),
        },
    }
}

fn map_transport_error(error: reqwest::Error) -> GatewayError {
    if error.is_timeout() {
        GatewayError::Timeout
    } else if error.is_connect() || error.is_request() {
        GatewayError::ConnectionError(error.to_string())
    } else {
        GatewayError::Other(error.to_string())
    }
}
