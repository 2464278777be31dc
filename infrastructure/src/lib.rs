//! Infrastructure layer for agent-thinker
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: the OpenAI completion gateway, HTTP clients for the
//! search and scrape services, page caches, run transcripts, and
//! configuration file loading.

pub mod cache;
pub mod config;
pub mod logging;
pub mod providers;
pub mod services;

// Re-export commonly used types
pub use cache::{FilePageCache, InMemoryPageCache};
pub use config::{CacheBackend, ConfigLoader, FileConfig};
pub use logging::JsonlTranscriptLogger;
pub use providers::{OpenAiCompletionGateway, OpenAiSettings};
pub use services::{
    DirectFetcher, DisabledSearch, HttpScrapeService, HttpSearchService, html_to_text,
};
