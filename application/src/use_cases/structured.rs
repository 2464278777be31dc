//! Structured completion calls with one correction re-prompt.

use crate::ports::agents::AgentError;
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest};
use crate::use_cases::retry::{RetryPolicy, retry_transient};
use thinker_domain::DomainError;
use tracing::{debug, warn};

/// Ask for a structured completion and parse it.
///
/// Transient gateway errors are retried through `policy`. A response that
/// fails `parse` gets exactly one correction re-prompt; a second failure is
/// [`AgentError::SchemaViolation`].
pub async fn complete_structured<T, P>(
    gateway: &dyn CompletionGateway,
    request: CompletionRequest,
    policy: &RetryPolicy,
    parse: P,
) -> Result<T, AgentError>
where
    P: Fn(&str) -> Result<T, DomainError>,
{
    let label = request.schema.name.clone();
    let raw = retry_transient(policy, &label, || gateway.complete(&request)).await?;
    debug!("{} response: {} bytes", label, raw.len());

    let problem = match parse(&raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    warn!("{} response broke its schema, re-prompting: {}", label, problem);
    let corrected = request.with_correction(&raw, &problem.to_string());
    let raw = retry_transient(policy, &label, || gateway.complete(&corrected)).await?;

    parse(&raw).map_err(|e| AgentError::SchemaViolation(e.to_string()))
}
