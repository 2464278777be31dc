//! HTTP adapters for the search and scrape collaborators.

mod direct_fetch;
mod http;
mod scrape;
mod search;

pub use direct_fetch::{DirectFetcher, html_to_text};
pub use scrape::HttpScrapeService;
pub use search::{DisabledSearch, HttpSearchService};
