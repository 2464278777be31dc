//! Search service adapter.
//!
//! Talks to a Google Custom Search style microservice:
//! `GET {base}/search?q=<query>` answering `{"items": [{title, link, snippet}]}`.
//! A response without `items` means no results.

use super::http::{build_client, join_url, map_transport_error, read_body};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thinker_application::ports::collaborators::{CollaboratorError, SearchPort};
use thinker_domain::SearchHit;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

pub struct HttpSearchService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpSearchService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl SearchPort for HttpSearchService {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        let response = self
            .client
            .get(join_url(&self.base_url, "search"))
            .query(&[("q", query)])
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = read_body(response).await?;
        let hits = parse_search_response(&body)?;
        debug!("Search '{}' returned {} hits", query, hits.len());
        Ok(hits)
    }
}

/// Stand-in used when no search service is configured; every search fails.
pub struct DisabledSearch;

#[async_trait]
impl SearchPort for DisabledSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
        Err(CollaboratorError::Rejected(
            "no search service configured (services.search_url)".to_string(),
        ))
    }
}

/// Decode the service's answer, keeping every item in the service's order.
fn parse_search_response(body: &str) -> Result<Vec<SearchHit>, CollaboratorError> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| CollaboratorError::Decode(format!("search response: {}", e)))?;
    Ok(response
        .items
        .into_iter()
        .map(|item| SearchHit::new(item.title, item.link, item.snippet))
        .collect())
}
