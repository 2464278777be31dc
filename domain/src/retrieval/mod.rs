//! Retrieval domain: search hits, page content, cache keys and evidence.

mod urls;
mod value_objects;

pub use urls::{extract_urls, normalize_url};
pub use value_objects::{
    CacheEntry, CacheKey, Evidence, EvidenceSource, FetchError, OutputFormat, PageContent,
    SearchHit,
};
