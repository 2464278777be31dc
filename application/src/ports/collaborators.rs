//! Retrieval collaborator ports
//!
//! Narrow contracts for the external search and scrape services.

use async_trait::async_trait;
use thinker_domain::{OutputFormat, SearchHit};
use thiserror::Error;

/// Errors returned by search and scrape collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Timeout, connection failure or 5xx; retried by the caller
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The service refused the request (4xx, bad credentials, blocked URL)
    #[error("Rejected: {0}")]
    Rejected(String),

    /// The service answered with something that could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl CollaboratorError {
    pub fn is_transient(&self) -> bool {
        matches!(self, CollaboratorError::Transient(_))
    }

    /// Classify an HTTP status code returned by a collaborator.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status, body.trim());
        if matches!(status, 408 | 429) || (500..600).contains(&status) {
            CollaboratorError::Transient(message)
        } else {
            CollaboratorError::Rejected(message)
        }
    }
}

/// Web search collaborator
#[async_trait]
pub trait SearchPort: Send + Sync {
    /// Ranked results in the service's own order.
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError>;
}

/// Web scrape collaborator
#[async_trait]
pub trait ScrapePort: Send + Sync {
    /// Fetch one page in the requested format.
    ///
    /// `force` asks the service to bypass any cache of its own.
    async fn fetch(
        &self,
        url: &str,
        format: OutputFormat,
        force: bool,
    ) -> Result<String, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert!(CollaboratorError::from_status(503, "busy").is_transient());
        assert!(CollaboratorError::from_status(429, "").is_transient());
        assert_eq!(
            CollaboratorError::from_status(404, " not found "),
            CollaboratorError::Rejected("HTTP 404: not found".to_string())
        );
    }
}
