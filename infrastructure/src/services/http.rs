//! Shared HTTP plumbing for collaborator adapters.

use std::time::Duration;
use thinker_application::ports::collaborators::CollaboratorError;
use thinker_domain::truncate;

pub(crate) const USER_AGENT: &str = concat!("agent-thinker/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, CollaboratorError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| CollaboratorError::Rejected(format!("Failed to build HTTP client: {}", e)))
}

/// Timeouts and connection failures are transient; anything else the
/// transport reports is treated as a rejection.
pub(crate) fn map_transport_error(error: reqwest::Error) -> CollaboratorError {
    if error.is_timeout() || error.is_connect() {
        CollaboratorError::Transient(error.to_string())
    } else if error.is_decode() {
        CollaboratorError::Decode(error.to_string())
    } else {
        CollaboratorError::Rejected(error.to_string())
    }
}

/// Read the body of a response, classifying non-2xx statuses.
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, CollaboratorError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(map_transport_error)?;
    if !(200..300).contains(&status) {
        return Err(CollaboratorError::from_status(status, &truncate(&body, 300)));
    }
    Ok(body)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
