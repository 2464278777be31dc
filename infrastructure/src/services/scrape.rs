//! Scrape service adapter.
//!
//! Talks to a Firecrawl style microservice:
//! `POST {base}/batch_scrape_urls` with `{urls, formats, force_fetch}`,
//! answering `{"data": [{"markdown": ..., "html": ..., "text": ...}]}`.

use super::http::{build_client, join_url, map_transport_error, read_body};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinker_application::ports::collaborators::{CollaboratorError, ScrapePort};
use thinker_domain::OutputFormat;
use tracing::debug;

#[derive(Debug, Serialize)]
struct BatchScrapeRequest<'a> {
    urls: [&'a str; 1],
    formats: [&'static str; 1],
    force_fetch: bool,
}

#[derive(Debug, Deserialize)]
struct BatchScrapeResponse {
    #[serde(default)]
    data: Vec<ScrapedDocument>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapedDocument {
    markdown: Option<String>,
    html: Option<String>,
    #[serde(alias = "rawText")]
    text: Option<String>,
}

impl ScrapedDocument {
    fn take(self, format: OutputFormat) -> Option<String> {
        match format {
            OutputFormat::Markdown => self.markdown,
            OutputFormat::Html => self.html,
            OutputFormat::Text => self.text,
        }
    }
}

pub struct HttpScrapeService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpScrapeService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl ScrapePort for HttpScrapeService {
    async fn fetch(
        &self,
        url: &str,
        format: OutputFormat,
        force: bool,
    ) -> Result<String, CollaboratorError> {
        let request = BatchScrapeRequest {
            urls: [url],
            formats: [format.as_str()],
            force_fetch: force,
        };
        debug!("Scraping {} as {} (force_fetch: {})", url, format, force);

        let response = self
            .client
            .post(join_url(&self.base_url, "batch_scrape_urls"))
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;
        let body = read_body(response).await?;
        parse_scrape_response(&body, format)
    }
}

fn parse_scrape_response(body: &str, format: OutputFormat) -> Result<String, CollaboratorError> {
    let response: BatchScrapeResponse = serde_json::from_str(body)
        .map_err(|e| CollaboratorError::Decode(format!("scrape response: {}", e)))?;

    if let Some(error) = response.error.filter(|e| !e.trim().is_empty()) {
        return Err(CollaboratorError::Rejected(error));
    }

    response
        .data
        .into_iter()
        .next()
        .and_then(|document| document.take(format))
        .ok_or_else(|| CollaboratorError::Decode(format!("no {} content in response", format)))
}
