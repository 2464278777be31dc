//! Retrieval batch execution for RunResearchUseCase

use super::{RunResearchUseCase, invalid_transition};
use crate::ports::agents::Retriever;
use crate::ports::page_cache::CacheError;
use crate::ports::progress::ProgressNotifier;
use crate::use_cases::shared::cancellable;
use std::sync::Arc;
use thinker_domain::{RunError, RunErrorKind, RunState, TaskId, TaskOutput, TaskPayload};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, warn};

/// What one retrieval worker hands back to the orchestrator
enum RetrievalResult {
    Done(TaskOutput),
    Failed(String),
    Cache(CacheError),
}

// ==================== RunResearchUseCase Retrieval Methods ====================

impl RunResearchUseCase {
    /// Dispatch every pending retrieval task and wait for all of them.
    ///
    /// Every dispatched task ends `Done` or `Failed` before this returns,
    /// including when a worker panics. A corrupted cache fails the run, but
    /// only after the batch has drained; a cache I/O error fails just its task.
    pub(super) async fn retrieve_batch(
        &self,
        state: &mut RunState,
        deadline: Option<Instant>,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        let ids = state.queue().pending_retrieval();
        if ids.is_empty() {
            debug!("No pending retrieval tasks");
            return Ok(());
        }

        let limiter = Arc::new(Semaphore::new(self.config.retrieval_concurrency.max(1)));
        let mut join_set = JoinSet::new();

        for id in &ids {
            let id = *id;
            state.queue_mut().start(id).map_err(invalid_transition)?;
            let Some(task) = state.queue().get(id) else {
                continue;
            };
            progress.on_task_start(task);
            debug!("Dispatching task {}: {}", id, task.payload().describe());

            let payload = task.payload().clone();
            let retriever = Arc::clone(&self.retriever);
            let limiter = Arc::clone(&limiter);
            join_set.spawn(async move {
                let _permit = limiter.acquire_owned().await;
                (id, execute_retrieval(retriever.as_ref(), payload).await)
            });
        }

        let mut cache_failure = None;
        loop {
            let joined =
                match cancellable(&self.cancellation_token, deadline, join_set.join_next()).await
                {
                    Ok(joined) => joined,
                    Err(e) => {
                        join_set.abort_all();
                        self.fail_stragglers(state, &ids, &e.message, progress)?;
                        return Err(e);
                    }
                };
            let Some(joined) = joined else {
                break;
            };

            let (id, result) = match joined {
                Ok(value) => value,
                Err(e) => {
                    warn!("Retrieval worker join error: {}", e);
                    continue;
                }
            };

            match result {
                RetrievalResult::Done(output) => {
                    state
                        .queue_mut()
                        .complete(id, output)
                        .map_err(invalid_transition)?;
                    self.notify_complete(state, id, progress);
                }
                RetrievalResult::Failed(message) => {
                    warn!("Task {} failed: {}", id, message);
                    self.fail_task(state, id, message, progress)?;
                }
                RetrievalResult::Cache(e) => {
                    warn!("Task {} hit a cache failure: {}", id, e);
                    self.fail_task(state, id, e.to_string(), progress)?;
                    if matches!(e, CacheError::Corrupted(_)) {
                        cache_failure.get_or_insert(e);
                    }
                }
            }
        }

        self.fail_stragglers(state, &ids, "retrieval worker stopped unexpectedly", progress)?;

        match cache_failure {
            Some(e) => Err(RunError::new(RunErrorKind::CacheCorrupted, e.to_string())),
            None => Ok(()),
        }
    }

    fn fail_stragglers(
        &self,
        state: &mut RunState,
        ids: &[TaskId],
        reason: &str,
        progress: &dyn ProgressNotifier,
    ) -> Result<(), RunError> {
        for id in ids {
            let running = state
                .queue()
                .get(*id)
                .is_some_and(|task| !task.status().is_terminal());
            if running {
                self.fail_task(state, *id, reason.to_string(), progress)?;
            }
        }
        Ok(())
    }
}

async fn execute_retrieval(retriever: &dyn Retriever, payload: TaskPayload) -> RetrievalResult {
    match payload {
        TaskPayload::Search { query } => match retriever.search(&query).await {
            Ok(hits) => RetrievalResult::Done(TaskOutput::SearchResults { query, hits }),
            Err(e) => RetrievalResult::Failed(e.to_string()),
        },
        TaskPayload::Scrape { urls, use_cache } => {
            let results = match retriever.retrieve(&urls, use_cache).await {
                Ok(results) => results,
                Err(e) => return RetrievalResult::Cache(e),
            };
            let (pages, failures): (Vec<_>, Vec<_>) =
                results.into_iter().partition(|result| result.is_ok());
            let pages: Vec<_> = pages.into_iter().filter_map(Result::ok).collect();
            let failures: Vec<_> = failures.into_iter().filter_map(Result::err).collect();

            if pages.is_empty() {
                let message = failures
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                return RetrievalResult::Failed(if message.is_empty() {
                    "no URLs to fetch".to_string()
                } else {
                    message
                });
            }
            RetrievalResult::Done(TaskOutput::Pages { pages, failures })
        }
        other => RetrievalResult::Failed(format!("{} is not a retrieval task", other.kind())),
    }
}
