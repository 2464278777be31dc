//! Local citation checks on a summary.
//!
//! Summaries cite evidence with bracketed numbers (`[1]`, `[2, 3]`) and end
//! with a numbered source list under a `Sources:` or `References:` header.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

static CITATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+(?:\s*,\s*\d+)*)\]").expect("citation pattern is valid"));

static SOURCES_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^\s*(?:#+\s*)?\**(?:sources|references)\**\s*:?\s*\**\s*$")
        .expect("sources header pattern is valid")
});

static SOURCE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?\[?(\d+)[\].):]\s*(.+?)\s*$").expect("source entry pattern is valid")
});

/// Citations found in a summary and the sources it lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationReport {
    /// Citation numbers used in the body
    pub cited: BTreeSet<u32>,
    /// Numbered entries of the source list
    pub sources: BTreeMap<u32, String>,
}

impl CitationReport {
    /// Cited numbers without a matching source entry.
    ///
    /// When the summary has no source list at all there is nothing to check
    /// against, so nothing is reported.
    pub fn missing_sources(&self) -> Vec<u32> {
        if self.sources.is_empty() {
            return Vec::new();
        }
        self.cited
            .iter()
            .filter(|n| !self.sources.contains_key(n))
            .copied()
            .collect()
    }

    pub fn has_citations(&self) -> bool {
        !self.cited.is_empty()
    }
}

/// Collect the citations and the numbered source list of a summary.
pub fn extract_citations(summary: &str) -> CitationReport {
    let (body, source_list) = match SOURCES_HEADER.find(summary) {
        Some(header) => (&summary[..header.start()], Some(&summary[header.end()..])),
        None => (summary, None),
    };

    let mut report = CitationReport::default();
    for captures in CITATION.captures_iter(body) {
        report.cited.extend(
            captures[1]
                .split(',')
                .filter_map(|n| n.trim().parse::<u32>().ok()),
        );
    }

    if let Some(list) = source_list {
        for line in list.lines() {
            if let Some(captures) = SOURCE_ENTRY.captures(line)
                && let Ok(number) = captures[1].parse::<u32>()
            {
                report.sources.insert(number, captures[2].to_string());
            }
        }
    }

    report
}
