//! Shared utilities for use cases.
//!
//! Cancellation and deadline checks used at every phase boundary of a run,
//! and a wrapper that stops waiting on an in-flight call once either fires.

use std::future::Future;
use thinker_domain::{RunError, RunErrorKind};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested or the deadline has passed.
pub(crate) fn check_cancelled(
    token: &Option<CancellationToken>,
    deadline: Option<Instant>,
) -> Result<(), RunError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunError::cancelled());
    }
    if let Some(deadline) = deadline
        && Instant::now() >= deadline
    {
        return Err(timed_out());
    }
    Ok(())
}

/// Await `future` unless the token is cancelled or the deadline passes first.
///
/// The abandoned future is dropped; collaborators see it as a closed
/// connection.
pub(crate) async fn cancellable<F: Future>(
    token: &Option<CancellationToken>,
    deadline: Option<Instant>,
    future: F,
) -> Result<F::Output, RunError> {
    let cancelled = async {
        match token {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    };
    let expired = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(RunError::cancelled()),
        _ = expired => Err(timed_out()),
        output = future => Ok(output),
    }
}

fn timed_out() -> RunError {
    RunError::new(RunErrorKind::TimedOut, "Run deadline exceeded")
}
