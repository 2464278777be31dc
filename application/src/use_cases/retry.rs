//! Bounded retry with exponential backoff for collaborator calls.

use crate::ports::collaborators::CollaboratorError;
use crate::ports::completion_gateway::GatewayError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Errors that know whether another attempt might succeed.
pub trait RetryableError: Display {
    fn is_transient(&self) -> bool;

    /// The error reported when a single attempt exceeds the call timeout.
    fn timed_out(after: Duration) -> Self;
}

impl RetryableError for GatewayError {
    fn is_transient(&self) -> bool {
        GatewayError::is_transient(self)
    }

    fn timed_out(_after: Duration) -> Self {
        GatewayError::Timeout
    }
}

impl RetryableError for CollaboratorError {
    fn is_transient(&self) -> bool {
        CollaboratorError::is_transient(self)
    }

    fn timed_out(after: Duration) -> Self {
        CollaboratorError::Transient(format!("timed out after {}s", after.as_secs_f32()))
    }
}

/// Retry settings applied at each call site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Per-attempt timeout
    pub call_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            call_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no timeout.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            call_timeout: None,
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_backoff = initial;
        self.max_backoff = max.max(initial);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

/// Run `op` until it succeeds, fails permanently, or attempts run out.
///
/// Every attempt is bounded by `policy.call_timeout`; a timed-out attempt
/// counts as a transient failure.
pub async fn retry_transient<T, E, F, Fut>(
    policy: &RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, E>
where
    E: RetryableError,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let result = match policy.call_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(E::timed_out(timeout)),
            },
            None => op().await,
        };

        match result {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    label, attempt, max_attempts, delay, e
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
