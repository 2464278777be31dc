//! Configuration issues reported by config validation
//!
//! Validation never fails loading outright. It returns a list of issues and
//! the caller decides what to do with errors versus warnings.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: a run cannot work with this configuration.
    Error,
    /// Non-fatal: runs work but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// No API key for the completion provider.
    MissingApiKey,
    /// A configured base URL does not parse.
    InvalidServiceUrl,
    /// No search service: search tasks will fail.
    SearchServiceMissing,
    /// No scrape service: pages are downloaded directly.
    ScrapeServiceMissing,
    /// A numeric limit is zero and will be raised to one.
    LimitClamped,
    /// The output format is not one of markdown, html or text.
    UnknownOutputFormat,
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
