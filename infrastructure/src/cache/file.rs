//! JSON-file page cache persisted across runs.
//!
//! The whole cache lives in one JSON document. It is read on first use and
//! rewritten on every change through a temporary file and a rename, so a
//! crash never leaves a half-written cache behind. All access goes through a
//! single lock; concurrent writers to the same key end with the last value.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thinker_application::ports::page_cache::{CacheError, PageCache};
use thinker_domain::{CacheEntry, CacheKey, OutputFormat};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheFile {
    version: u32,
    entries: Vec<CacheRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CacheRecord {
    url: String,
    format: OutputFormat,
    content: String,
    fetched_at: DateTime<Utc>,
}

type Entries = HashMap<CacheKey, CacheEntry>;

pub struct FilePageCache {
    path: PathBuf,
    entries: Mutex<Option<Entries>>,
}

impl FilePageCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Mutex::new(None),
        }
    }

    /// Default location: `<cache dir>/agent-thinker/pages.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|d| d.join("agent-thinker").join("pages.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn loaded(&self) -> Result<MutexGuard<'_, Option<Entries>>, CacheError> {
        let mut guard = self.entries.lock().await;
        if guard.is_none() {
            *guard = Some(load(&self.path).await?);
        }
        Ok(guard)
    }

    async fn read<T>(&self, op: impl FnOnce(&Entries) -> T) -> Result<T, CacheError> {
        let guard = self.loaded().await?;
        match guard.as_ref() {
            Some(entries) => Ok(op(entries)),
            None => Err(CacheError::Io("cache not loaded".to_string())),
        }
    }

    /// Apply `op` to a copy of the entries and keep the copy only once it
    /// is on disk. `op` returns whether anything changed.
    async fn update<T>(
        &self,
        op: impl FnOnce(&mut Entries) -> (T, bool),
    ) -> Result<T, CacheError> {
        let mut guard = self.loaded().await?;
        let Some(entries) = guard.as_mut() else {
            return Err(CacheError::Io("cache not loaded".to_string()));
        };

        let mut next = entries.clone();
        let (value, dirty) = op(&mut next);
        if dirty {
            save(&self.path, &next).await?;
            *entries = next;
        }
        Ok(value)
    }
}

#[async_trait]
impl PageCache for FilePageCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>, CacheError> {
        self.read(|entries| entries.get(key).cloned()).await
    }

    async fn put(&self, key: &CacheKey, entry: CacheEntry) -> Result<(), CacheError> {
        self.update(|entries| {
            entries.insert(key.clone(), entry);
            ((), true)
        })
        .await
    }

    async fn remove(&self, key: &CacheKey) -> Result<bool, CacheError> {
        self.update(|entries| {
            let removed = entries.remove(key).is_some();
            (removed, removed)
        })
        .await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.update(|entries| {
            entries.clear();
            ((), true)
        })
        .await
    }

    async fn len(&self) -> Result<usize, CacheError> {
        self.read(|entries| entries.len()).await
    }
}

async fn load(path: &Path) -> Result<Entries, CacheError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No page cache at {}, starting empty", path.display());
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(CacheError::Io(format!("read {}: {}", path.display(), e)));
        }
    };

    let file: CacheFile = serde_json::from_str(&raw)
        .map_err(|e| CacheError::Corrupted(format!("{}: {}", path.display(), e)))?;
    if file.version != CACHE_VERSION {
        return Err(CacheError::Corrupted(format!(
            "{}: unsupported cache version {}",
            path.display(),
            file.version
        )));
    }

    let mut entries = HashMap::with_capacity(file.entries.len());
    for record in file.entries {
        let key = CacheKey::new(&record.url, record.format)
            .map_err(|e| CacheError::Corrupted(format!("{}: {}", path.display(), e)))?;
        entries.insert(
            key,
            CacheEntry {
                content: record.content,
                fetched_at: record.fetched_at,
            },
        );
    }
    debug!("Loaded {} cached pages from {}", entries.len(), path.display());
    Ok(entries)
}

async fn save(path: &Path, entries: &Entries) -> Result<(), CacheError> {
    let mut records: Vec<CacheRecord> = entries
        .iter()
        .map(|(key, entry)| CacheRecord {
            url: key.url().to_string(),
            format: key.format(),
            content: entry.content.clone(),
            fetched_at: entry.fetched_at,
        })
        .collect();
    records.sort_by(|a, b| {
        a.url
            .cmp(&b.url)
            .then_with(|| a.format.as_str().cmp(b.format.as_str()))
    });

    let file = CacheFile {
        version: CACHE_VERSION,
        entries: records,
    };
    let json = serde_json::to_string_pretty(&file)
        .map_err(|e| CacheError::Io(format!("serialize cache: {}", e)))?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| CacheError::Io(format!("create {}: {}", parent.display(), e)))?;
    }

    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, json)
        .await
        .map_err(|e| CacheError::Io(format!("write {}: {}", tmp.display(), e)))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        warn!("Failed to replace cache file {}: {}", path.display(), e);
        return Err(CacheError::Io(format!("rename to {}: {}", path.display(), e)));
    }
    Ok(())
}
