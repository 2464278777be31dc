//! Process-local page cache.

use async_trait::async_trait;
use std::collections::HashMap;
use thinker_application::ports::page_cache::{CacheError, PageCache};
use thinker_domain::{CacheEntry, CacheKey};
use tokio::sync::RwLock;

/// [`PageCache`] backed by a `HashMap`; lost when the process exits.
#[derive(Default)]
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl InMemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.entries.write().await.insert(key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use thinker_domain::OutputFormat;

    fn key(url: &str, format: OutputFormat) -> CacheKey {
        CacheKey::new(url, format).unwrap()
    }

    #[tokio::test]
    async fn test_put_get_remove() {
        let cache = InMemoryPageCache::new();
        let k = key("https://tokio.rs", OutputFormat::Markdown);

        assert!(cache.get(&k).await.unwrap().is_none());
        cache.put(&k, CacheEntry::new("# Tokio")).await.unwrap();
        assert_eq!(cache.get(&k).await.unwrap().unwrap().content, "# Tokio");
        assert_eq!(cache.len().await.unwrap(), 1);

        assert!(cache.remove(&k).await.unwrap());
        assert!(!cache.remove(&k).await.unwrap());
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_format_is_part_of_key() {
        let cache = InMemoryPageCache::new();
        cache
            .put(&key("https://tokio.rs", OutputFormat::Markdown), CacheEntry::new("md"))
            .await
            .unwrap();

        assert!(cache
            .get(&key("https://tokio.rs", OutputFormat::Html))
            .await
            .unwrap()
            .is_none());
        // Normalization makes these the same key
        assert!(cache
            .get(&key("HTTPS://Tokio.rs/#intro", OutputFormat::Markdown))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_concurrent_writers_converge() {
        let cache = Arc::new(InMemoryPageCache::new());
        let k = key("https://tokio.rs", OutputFormat::Markdown);

        let mut handles = Vec::new();
        for i in 0..8 {
            let cache = Arc::clone(&cache);
            let k = k.clone();
            handles.push(tokio::spawn(async move {
                cache.put(&k, CacheEntry::new(format!("v{i}"))).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(cache.len().await.unwrap(), 1);
        let content = cache.get(&k).await.unwrap().unwrap().content;
        assert!(content.starts_with('v'));
    }
}
