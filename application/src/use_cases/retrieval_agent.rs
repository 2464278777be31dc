//! Retrieval agent: search and cached, concurrent page retrieval.

use crate::ports::agents::Retriever;
use crate::ports::collaborators::{CollaboratorError, ScrapePort, SearchPort};
use crate::ports::page_cache::{CacheError, PageCache};
use crate::use_cases::retry::{RetryPolicy, retry_transient};
use async_trait::async_trait;
use std::sync::Arc;
use thinker_domain::{CacheEntry, CacheKey, FetchError, OutputFormat, PageContent, SearchHit};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Default number of pages fetched at once across all concurrent calls
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// [`Retriever`] over a search service, a scrape service and a page cache.
///
/// The fetch limiter is shared by every `retrieve` call on this agent, so
/// concurrent retrieval tasks together never exceed it.
pub struct RetrievalAgent {
    search: Arc<dyn SearchPort>,
    scrape: Arc<dyn ScrapePort>,
    cache: Arc<dyn PageCache>,
    format: OutputFormat,
    retry: RetryPolicy,
    limiter: Arc<Semaphore>,
}

impl RetrievalAgent {
    pub fn new(
        search: Arc<dyn SearchPort>,
        scrape: Arc<dyn ScrapePort>,
        cache: Arc<dyn PageCache>,
    ) -> Self {
        Self {
            search,
            scrape,
            cache,
            format: OutputFormat::default(),
            retry: RetryPolicy::default(),
            limiter: Arc::new(Semaphore::new(DEFAULT_MAX_CONCURRENT_FETCHES)),
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    async fn retrieve_one(
        &self,
        url: &str,
        use_cache: bool,
    ) -> Result<Result<PageContent, FetchError>, CacheError> {
        let key = match CacheKey::new(url, self.format) {
            Ok(key) => key,
            Err(e) => return Ok(Err(FetchError::new(url, e.to_string(), false))),
        };

        if use_cache {
            match self.cache.get(&key).await {
                Ok(Some(entry)) => {
                    debug!("Cache hit: {}", key);
                    return Ok(Ok(PageContent::from_cache(&key, entry)));
                }
                Ok(None) => {}
                Err(CacheError::Io(e)) => warn!("Cache read failed for {}: {}", key, e),
                Err(e) => return Err(e),
            }
        }

        let Ok(_permit) = self.limiter.acquire().await else {
            return Ok(Err(FetchError::new(key.url(), "fetch limiter closed", false)));
        };

        let force = !use_cache;
        let fetched = retry_transient(&self.retry, key.url(), || {
            self.scrape.fetch(key.url(), self.format, force)
        })
        .await;

        match fetched {
            Ok(content) if content.trim().is_empty() => {
                warn!("Empty content from {}", key.url());
                Ok(Err(FetchError::new(key.url(), "empty content", false)))
            }
            Ok(content) => {
                let entry = CacheEntry::new(content);
                match self.cache.put(&key, entry.clone()).await {
                    Ok(()) => debug!("Fetched and cached: {}", key),
                    Err(CacheError::Io(e)) => warn!("Page not cached {}: {}", key, e),
                    Err(e) => return Err(e),
                }
                Ok(Ok(PageContent::fetched(&key, entry)))
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", key.url(), e);
                Ok(Err(FetchError::new(key.url(), e.to_string(), e.is_transient())))
            }
        }
    }
}

#[async_trait]
impl Retriever for RetrievalAgent {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        let hits = retry_transient(&self.retry, "search", || self.search.search(query)).await?;
        info!("Search '{}' returned {} results", query, hits.len());
        Ok(hits)
    }

    async fn retrieve(
        &self,
        urls: &[String],
        use_cache: bool,
    ) -> Result<Vec<Result<PageContent, FetchError>>, CacheError> {
        let fetches = urls.iter().map(|url| self.retrieve_one(url, use_cache));
        futures::future::join_all(fetches)
            .await
            .into_iter()
            .collect()
    }
}
