//! Helpers for reading structured model output.
//!
//! Completion services are asked for strict JSON, but some models still wrap
//! the object in a fenced code block. Only that wrapping is tolerated; the
//! object itself is parsed strictly by the caller.

use super::error::DomainError;
use serde::de::DeserializeOwned;

/// Strip a surrounding ```` ```json ```` (or bare ```` ``` ````) fence.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Parse a JSON object into `T`, mapping any failure to a schema violation.
pub fn parse_strict<T: DeserializeOwned>(raw: &str, what: &str) -> Result<T, DomainError> {
    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(DomainError::schema(format!("{what}: empty response")));
    }
    serde_json::from_str(body).map_err(|e| DomainError::schema(format!("{what}: {e}")))
}
