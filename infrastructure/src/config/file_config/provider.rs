//! Completion provider configuration from TOML (`[provider]` section)
//!
//! ```toml
//! [provider]
//! api_key_env = "OPENAI_API_KEY"
//! base_url = "https://api.openai.com"
//! model = "gpt-4o"
//! temperature = 0.06
//! ```

use crate::providers::openai::OpenAiSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinker_domain::{ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Direct API key (not recommended; use the environment variable instead)
    pub api_key: Option<String>,
    /// Base URL, overridable for compatible endpoints
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: u64,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: "OPENAI_API_KEY".to_string(),
            api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o".to_string(),
            temperature: 0.06,
            max_tokens: None,
            request_timeout_secs: 120,
        }
    }
}

impl FileProviderConfig {
    /// The configured key, falling back to `api_key_env`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|k| !k.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Gateway settings, or `None` when no API key resolves.
    pub fn to_settings(&self) -> Option<OpenAiSettings> {
        let api_key = self.resolve_api_key()?;
        Some(OpenAiSettings {
            api_key,
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            request_timeout: self.request_timeout(),
        })
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.resolve_api_key().is_none() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::MissingApiKey,
                format!(
                    "no API key: set {} or provider.api_key",
                    self.api_key_env
                ),
            ));
        }
        issues.extend(super::services::check_url("provider.base_url", &self.base_url));
        issues
    }
}
