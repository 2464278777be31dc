//! Collaborator endpoints from TOML (`[services]` section)
//!
//! ```toml
//! [services]
//! search_url = "http://localhost:8085"
//! scrape_url = "http://localhost:8084"   # remove to download pages directly
//! timeout_secs = 60
//! max_concurrent_fetches = 8
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinker_domain::{ConfigIssue, ConfigIssueCode};

pub const DEFAULT_SEARCH_URL: &str = "http://localhost:8085";
pub const DEFAULT_SCRAPE_URL: &str = "http://localhost:8084";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileServicesConfig {
    /// Base URL of the search service
    pub search_url: Option<String>,
    /// Base URL of the scrape service
    pub scrape_url: Option<String>,
    /// HTTP timeout for one search or scrape request
    pub timeout_secs: u64,
    /// Upper bound on concurrent page fetches across all tasks
    pub max_concurrent_fetches: usize,
}

impl Default for FileServicesConfig {
    fn default() -> Self {
        Self {
            search_url: Some(DEFAULT_SEARCH_URL.to_string()),
            scrape_url: Some(DEFAULT_SCRAPE_URL.to_string()),
            timeout_secs: 60,
            max_concurrent_fetches: 8,
        }
    }
}

impl FileServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Configured search URL, ignoring blank values
    pub fn search_url(&self) -> Option<&str> {
        non_blank(self.search_url.as_deref())
    }

    /// Configured scrape URL, ignoring blank values
    pub fn scrape_url(&self) -> Option<&str> {
        non_blank(self.scrape_url.as_deref())
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        match self.search_url() {
            Some(url) => issues.extend(check_url("services.search_url", url)),
            None => issues.push(ConfigIssue::warning(
                ConfigIssueCode::SearchServiceMissing,
                "services.search_url is not set; search tasks will fail",
            )),
        }
        match self.scrape_url() {
            Some(url) => issues.extend(check_url("services.scrape_url", url)),
            None => issues.push(ConfigIssue::warning(
                ConfigIssueCode::ScrapeServiceMissing,
                "services.scrape_url is not set; pages will be downloaded directly",
            )),
        }
        if self.max_concurrent_fetches == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::LimitClamped,
                "services.max_concurrent_fetches is 0, using 1",
            ));
        }
        issues
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// An error issue unless `url` is an absolute http(s) URL.
pub(super) fn check_url(field: &str, url: &str) -> Option<ConfigIssue> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => None,
        Ok(_) => Some(ConfigIssue::error(
            ConfigIssueCode::InvalidServiceUrl,
            format!("{}: '{}' is not an http(s) URL", field, url),
        )),
        Err(e) => Some(ConfigIssue::error(
            ConfigIssueCode::InvalidServiceUrl,
            format!("{}: '{}' is invalid: {}", field, url, e),
        )),
    }
}
