//! Page cache port
//!
//! Key-value store for `(normalized URL, format) -> content`. It is the only
//! mutable resource shared by concurrent retrieval workers, so every
//! implementation must make `put` atomic per key (last writer wins).

use async_trait::async_trait;
use thinker_domain::{CacheEntry, CacheKey};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The backing store is malformed or from an unknown version
    #[error("Cache corrupted: {0}")]
    Corrupted(String),

    #[error("Cache I/O error: {0}")]
    Io(String),
}

#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError>;

    /// Insert or replace the entry for `key`.
    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError>;

    /// Remove one entry; returns whether it existed.
    async fn remove(&self, key: &CacheKey) -> Result<bool, CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    async fn len(&self) -> Result<usize, CacheError>;
}
