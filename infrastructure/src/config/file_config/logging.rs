//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the log file and run transcripts; no file logging when unset
    pub dir: Option<PathBuf>,
    /// Write a JSONL transcript of each run next to the log file
    pub transcript: bool,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self {
            dir: None,
            transcript: true,
        }
    }
}
