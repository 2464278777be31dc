//! Raw TOML configuration data types
//!
//! These structs mirror the config file one section per struct. Every
//! section is `#[serde(default)]`, so a partial file only overrides what it
//! names.

mod cache;
mod logging;
mod orchestrator;
mod provider;
mod retry;
mod services;

pub use cache::{CacheBackend, FileCacheConfig};
pub use logging::FileLoggingConfig;
pub use orchestrator::FileOrchestratorConfig;
pub use provider::FileProviderConfig;
pub use retry::FileRetryConfig;
pub use services::{DEFAULT_SCRAPE_URL, DEFAULT_SEARCH_URL, FileServicesConfig};

use serde::{Deserialize, Serialize};
use thinker_domain::ConfigIssue;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Round, concurrency and timeout limits of a run
    pub orchestrator: FileOrchestratorConfig,
    /// Retry policy for completion calls
    pub retry: FileRetryConfig,
    /// Search and scrape collaborators
    pub services: FileServicesConfig,
    /// Completion provider
    pub provider: FileProviderConfig,
    /// Page cache backend
    pub cache: FileCacheConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Errors mean a run cannot work; warnings describe values that were
    /// adjusted or features that fall back.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.orchestrator.to_orchestrator_config().1);
        issues.extend(self.retry.to_policy().1);
        issues.extend(self.services.validate());
        issues.extend(self.provider.validate());
        issues
    }

    /// Render as TOML (for `--show-config`).
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thinker_domain::{ConfigIssueCode, OutputFormat};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[orchestrator]
max_rounds = 5
retrieval_concurrency = 2
run_timeout_secs = 0
use_cache = false
output_format = "text"

[retry]
max_attempts = 4

[services]
search_url = "http://search.internal:9000"
timeout_secs = 30

[provider]
api_key = "sk-test"
model = "gpt-4o-mini"

[cache]
backend = "memory"

[logging]
dir = "/tmp/thinker-logs"
transcript = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (orchestrator, issues) = config.orchestrator.to_orchestrator_config();
        assert!(issues.is_empty());
        assert_eq!(orchestrator.max_rounds, 5);
        assert_eq!(orchestrator.retrieval_concurrency, 2);
        assert!(orchestrator.run_timeout.is_none());
        assert!(!orchestrator.default_use_cache);
        assert_eq!(orchestrator.output_format, OutputFormat::Text);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.services.search_url(), Some("http://search.internal:9000"));
        assert_eq!(config.services.scrape_url(), Some(DEFAULT_SCRAPE_URL));
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert!(!config.logging.transcript);
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[orchestrator]\nmax_rounds = 1\n").unwrap();
        assert_eq!(config.orchestrator.max_rounds, 1);
        assert_eq!(config.services, FileServicesConfig::default());
        assert_eq!(config.provider.model, "gpt-4o");
        assert!(config.logging.transcript);
    }

    #[test]
    fn test_validate_collects_every_section() {
        let config = FileConfig {
            orchestrator: FileOrchestratorConfig {
                max_rounds: 0,
                ..Default::default()
            },
            services: FileServicesConfig {
                search_url: Some("not a url".to_string()),
                ..Default::default()
            },
            provider: FileProviderConfig {
                api_key: Some("sk-test".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let codes: Vec<_> = config.validate().iter().map(|i| i.code).collect();
        assert_eq!(
            codes,
            vec![ConfigIssueCode::LimitClamped, ConfigIssueCode::InvalidServiceUrl]
        );
    }

    #[test]
    fn test_to_toml_parses_back() {
        let config = FileConfig::default();
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("[orchestrator]"));
        let parsed: FileConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
