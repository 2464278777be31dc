//! Validation results.
//!
//! The overall [`Verdict`] is always derived from the per-claim checks, so a
//! result can never report `Verified` while flagging a claim.

mod citations;

pub use citations::{CitationReport, extract_citations};

use crate::core::error::DomainError;
use crate::core::json::parse_strict;
use serde::{Deserialize, Serialize};

/// Outcome of checking one claim against its citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimCheck {
    pub claim: String,
    #[serde(default)]
    pub citation: Option<String>,
    pub supported: bool,
    #[serde(default)]
    pub note: Option<String>,
}

impl ClaimCheck {
    pub fn supported(claim: impl Into<String>, citation: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            citation: Some(citation.into()),
            supported: true,
            note: None,
        }
    }

    pub fn unsupported(claim: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            claim: claim.into(),
            citation: None,
            supported: false,
            note: Some(note.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Verified,
    IssuesFound,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Verified => "verified",
            Verdict::IssuesFound => "issues_found",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Advisory verdict on a final summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    checks: Vec<ClaimCheck>,
    verdict: Verdict,
    flagged: Vec<String>,
}

impl ValidationResult {
    pub fn from_checks(checks: Vec<ClaimCheck>) -> Self {
        let flagged: Vec<String> = checks
            .iter()
            .filter(|c| !c.supported)
            .map(|c| c.claim.clone())
            .collect();
        let verdict = if flagged.is_empty() {
            Verdict::Verified
        } else {
            Verdict::IssuesFound
        };
        Self {
            checks,
            verdict,
            flagged,
        }
    }

    pub fn checks(&self) -> &[ClaimCheck] {
        &self.checks
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Claims with no supporting evidence
    pub fn flagged(&self) -> &[String] {
        &self.flagged
    }

    /// Add a failed check for every citation that points at no listed source.
    pub fn merge_citation_report(self, report: &CitationReport) -> Self {
        let missing = report.missing_sources();
        if missing.is_empty() {
            return self;
        }
        let mut checks = self.checks;
        checks.extend(missing.into_iter().map(|n| ClaimCheck {
            claim: format!("Citation [{n}]"),
            citation: Some(format!("[{n}]")),
            supported: false,
            note: Some("cited number has no entry in the source list".to_string()),
        }));
        Self::from_checks(checks)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValidationOutput {
    claims: Vec<ClaimOutput>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClaimOutput {
    claim: String,
    citation: Option<String>,
    supported: bool,
    #[serde(default)]
    note: Option<String>,
}

/// Parse raw validator output of the shape `{"claims": [...]}`.
pub fn parse_validation_result(raw: &str) -> Result<ValidationResult, DomainError> {
    let output: ValidationOutput = parse_strict(raw, "validation output")?;
    let checks = output
        .claims
        .into_iter()
        .map(|c| ClaimCheck {
            claim: c.claim.trim().to_string(),
            citation: c.citation.filter(|s| !s.trim().is_empty()),
            supported: c.supported,
            note: c.note.filter(|s| !s.trim().is_empty()),
        })
        .collect();
    Ok(ValidationResult::from_checks(checks))
}
