//! Retrieval value objects

use super::urls::normalize_url;
use crate::core::error::DomainError;
use crate::task::TaskId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single ranked result from the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

impl SearchHit {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }
}

/// Output format requested from the scrape collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Html,
    Text,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => "markdown",
            OutputFormat::Html => "html",
            OutputFormat::Text => "text",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Cache key: exactly the pair (normalized URL, output format).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    url: String,
    format: OutputFormat,
}

impl CacheKey {
    /// Build a key, normalizing the URL.
    pub fn new(url: &str, format: OutputFormat) -> Result<Self, DomainError> {
        Ok(Self {
            url: normalize_url(url)?,
            format,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.url, self.format)
    }
}

/// Cached page content with its fetch timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: String,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            fetched_at: Utc::now(),
        }
    }
}

/// Content of one successfully retrieved page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub url: String,
    pub format: OutputFormat,
    pub content: String,
    pub fetched_at: DateTime<Utc>,
    /// Served from the cache without a network call
    pub from_cache: bool,
}

impl PageContent {
    pub fn from_cache(key: &CacheKey, entry: CacheEntry) -> Self {
        Self {
            url: key.url().to_string(),
            format: key.format(),
            content: entry.content,
            fetched_at: entry.fetched_at,
            from_cache: true,
        }
    }

    pub fn fetched(key: &CacheKey, entry: CacheEntry) -> Self {
        Self {
            from_cache: false,
            ..Self::from_cache(key, entry)
        }
    }
}

/// A per-URL retrieval failure. Never aborts the surrounding batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("Failed to fetch {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub message: String,
    /// The failure was transient (timeout, 5xx) and retries were exhausted
    pub transient: bool,
}

impl FetchError {
    pub fn new(url: impl Into<String>, message: impl Into<String>, transient: bool) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
            transient,
        }
    }
}

/// Where a piece of evidence came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EvidenceSource {
    Page { url: String },
    Search { query: String },
}

impl EvidenceSource {
    pub fn label(&self) -> &str {
        match self {
            EvidenceSource::Page { url } => url,
            EvidenceSource::Search { query } => query,
        }
    }
}

/// Successfully retrieved content available to synthesis and validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    pub task_id: TaskId,
    pub source: EvidenceSource,
    pub content: String,
}

impl Evidence {
    pub fn from_page(task_id: TaskId, page: &PageContent) -> Self {
        Self {
            task_id,
            source: EvidenceSource::Page {
                url: page.url.clone(),
            },
            content: page.content.clone(),
        }
    }

    /// Render a search result set as one evidence item.
    pub fn from_search(task_id: TaskId, query: &str, hits: &[SearchHit]) -> Self {
        let content = hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                if hit.snippet.is_empty() {
                    format!("{}. {} ({})", i + 1, hit.title, hit.link)
                } else {
                    format!("{}. {} ({})\n   {}", i + 1, hit.title, hit.link, hit.snippet)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            task_id,
            source: EvidenceSource::Search {
                query: query.to_string(),
            },
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_equivalent_urls_match() {
        let a = CacheKey::new("https://Example.com/docs/", OutputFormat::Markdown).unwrap();
        let b = CacheKey::new("example.com/docs#intro", OutputFormat::Markdown).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.url(), "https://example.com/docs");
    }

    #[test]
    fn test_cache_key_format_is_part_of_identity() {
        let md = CacheKey::new("https://example.com", OutputFormat::Markdown).unwrap();
        let html = CacheKey::new("https://example.com", OutputFormat::Html).unwrap();
        assert_ne!(md, html);
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("MD".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert!("pdf".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_page_content_constructors() {
        let key = CacheKey::new("https://example.com/a", OutputFormat::Markdown).unwrap();
        let entry = CacheEntry::new("# Title");
        let cached = PageContent::from_cache(&key, entry.clone());
        let fresh = PageContent::fetched(&key, entry);
        assert!(cached.from_cache);
        assert!(!fresh.from_cache);
        assert_eq!(cached.content, fresh.content);
        assert_eq!(cached.url, "https://example.com/a");
    }

    #[test]
    fn test_evidence_from_search_renders_hits() {
        let hits = vec![
            SearchHit::new("Rust", "https://rust-lang.org", "A language"),
            SearchHit::new("Docs", "https://docs.rs", ""),
        ];
        let evidence = Evidence::from_search(TaskId::new(3), "rust", &hits);
        assert_eq!(evidence.source.label(), "rust");
        assert_eq!(
            evidence.content,
            "1. Rust (https://rust-lang.org)\n   A language\n2. Docs (https://docs.rs)"
        );
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::new("https://x.example", "HTTP 404", false);
        assert_eq!(err.to_string(), "Failed to fetch https://x.example: HTTP 404");
    }
}
