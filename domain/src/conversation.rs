//! Conversation state shared between the session layer and the agents.
//!
//! The state is append-only: agents receive it by reference and never mutate
//! it. Only the caller (CLI or REPL) pushes new messages.

use serde::{Deserialize, Serialize};

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Reference to the tool call this message answers (tool messages only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            tool_call: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_call: None,
        }
    }

    pub fn tool(call: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call: Some(call.into()),
        }
    }
}

/// Ordered, append-only message history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    messages: Vec<Message>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation from a single user request.
    pub fn from_request(request: impl Into<String>) -> Self {
        let mut state = Self::new();
        state.push(Message::user(request));
        state
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last_user_message(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.role == Role::User)
    }

    /// Render the history as plain text for inclusion in a prompt.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| match &m.tool_call {
                Some(call) => format!("[{} {}]: {}", m.role, call, m.content),
                None => format!("[{}]: {}", m.role, m.content),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_request() {
        let state = ConversationState::from_request("Hey there");
        assert_eq!(state.len(), 1);
        assert_eq!(state.messages()[0].role, Role::User);
    }

    #[test]
    fn test_last_user_message_skips_other_roles() {
        let mut state = ConversationState::from_request("first");
        state.push(Message::assistant("Which year?"));
        state.push(Message::user("2024"));
        state.push(Message::tool("search", "results"));

        assert_eq!(state.last_user_message().unwrap().content, "2024");
    }

    #[test]
    fn test_transcript_format() {
        let mut state = ConversationState::from_request("hi");
        state.push(Message::tool("scrape", "page text"));

        assert_eq!(state.transcript(), "[user]: hi\n[tool scrape]: page text");
    }

    #[test]
    fn test_message_serialization_omits_empty_tool_call() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hi"}));
    }
}
