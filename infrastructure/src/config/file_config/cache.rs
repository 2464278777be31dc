//! Page cache configuration from TOML (`[cache]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// JSON file kept across runs
    #[default]
    File,
    /// Process-local; forgotten on exit
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub backend: CacheBackend,
    /// Cache file for the file backend; defaults to the platform cache dir
    pub path: Option<PathBuf>,
}
