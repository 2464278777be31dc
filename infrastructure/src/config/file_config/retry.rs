//! Retry configuration from TOML (`[retry]` section)
//!
//! Applies to every collaborator call: search, scrape and completion.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thinker_application::RetryPolicy;
use thinker_domain::{ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRetryConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Per-call timeout; 0 disables it
    pub call_timeout_secs: u64,
}

impl Default for FileRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            call_timeout_secs: 60,
        }
    }
}

impl FileRetryConfig {
    pub fn to_policy(&self) -> (RetryPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        if self.max_attempts == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::LimitClamped,
                "retry.max_attempts is 0, using 1",
            ));
        }
        let call_timeout =
            (self.call_timeout_secs > 0).then(|| Duration::from_secs(self.call_timeout_secs));
        let policy = RetryPolicy::default()
            .with_max_attempts(self.max_attempts.max(1))
            .with_backoff(
                Duration::from_millis(self.initial_backoff_ms),
                Duration::from_millis(self.max_backoff_ms),
            )
            .with_call_timeout(call_timeout);
        (policy, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_policy() {
        let file = FileRetryConfig {
            max_attempts: 5,
            initial_backoff_ms: 100,
            max_backoff_ms: 1_000,
            call_timeout_secs: 0,
        };
        let (policy, issues) = file.to_policy();
        assert!(issues.is_empty());
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_millis(100));
        assert_eq!(policy.max_backoff, Duration::from_secs(1));
        assert!(policy.call_timeout.is_none());
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let file = FileRetryConfig {
            max_attempts: 0,
            ..Default::default()
        };
        let (policy, issues) = file.to_policy();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(issues[0].code, ConfigIssueCode::LimitClamped);
    }
}
