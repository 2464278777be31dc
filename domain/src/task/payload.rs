//! Kind-specific task parameters and plan step classification.

use super::value_objects::TaskKind;
use crate::retrieval::{extract_urls, normalize_url};
use serde::{Deserialize, Serialize};

const FETCH_VERBS: &[&str] = &["scrape", "fetch", "visit", "open", "read", "browse"];
const FILLER_WORDS: &[&str] = &["the", "page", "url", "website", "site", "at", "from"];
const SEARCH_PREFIXES: &[&str] = &["search for", "search", "google", "look up", "find"];

/// Parameters of a task. The variant determines the task's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPayload {
    Search { query: String },
    Scrape { urls: Vec<String>, use_cache: bool },
    Synthesize { round: u32 },
    Validate,
}

impl TaskPayload {
    pub fn search(query: impl Into<String>) -> Self {
        TaskPayload::Search {
            query: query.into(),
        }
    }

    pub fn scrape(urls: Vec<String>, use_cache: bool) -> Self {
        TaskPayload::Scrape { urls, use_cache }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            TaskPayload::Search { .. } => TaskKind::Search,
            TaskPayload::Scrape { .. } => TaskKind::Scrape,
            TaskPayload::Synthesize { .. } => TaskKind::Synthesize,
            TaskPayload::Validate => TaskKind::Validate,
        }
    }

    pub fn is_retrieval(&self) -> bool {
        self.kind().is_retrieval()
    }

    /// Short human-readable description for logs and progress output.
    pub fn describe(&self) -> String {
        match self {
            TaskPayload::Search { query } => format!("search: {query}"),
            TaskPayload::Scrape { urls, use_cache } => {
                let bypass = if *use_cache { "" } else { " (no cache)" };
                format!("scrape: {}{bypass}", urls.join(", "))
            }
            TaskPayload::Synthesize { round } => format!("synthesize (round {round})"),
            TaskPayload::Validate => "validate".to_string(),
        }
    }

    /// Turn a free-text plan step into a retrieval payload.
    ///
    /// Steps mentioning URLs, or starting with a fetch verb followed by a
    /// domain name, become scrapes. Everything else becomes a search.
    pub fn from_plan_step(step: &str, use_cache: bool) -> Self {
        let step = step.trim();

        let urls = extract_urls(step);
        if !urls.is_empty() {
            return TaskPayload::scrape(urls, use_cache);
        }

        let mut words = step.split_whitespace();
        if let Some(first) = words.next()
            && FETCH_VERBS.contains(&first.to_lowercase().as_str())
            && let Some(domain) = words
                .skip_while(|w| FILLER_WORDS.contains(&w.to_lowercase().as_str()))
                .map(|w| w.trim_matches(|c: char| matches!(c, '"' | '\'' | ',' | '.' | '(' | ')')))
                .find(|w| looks_like_domain(w))
        {
            return TaskPayload::scrape(vec![domain.to_string()], use_cache);
        }

        TaskPayload::search(strip_search_prefix(step))
    }
}

/// A bare host (optionally with a path) whose last label is alphabetic.
fn looks_like_domain(word: &str) -> bool {
    let host = word.split(['/', '?', ':']).next().unwrap_or_default();
    let tld = host.rsplit('.').next().unwrap_or_default();
    host.contains('.')
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
        && normalize_url(word).is_ok()
}

fn strip_search_prefix(step: &str) -> String {
    let lower = step.to_lowercase();
    for prefix in SEARCH_PREFIXES {
        if let Some(rest) = lower.strip_prefix(prefix)
            && rest.starts_with(char::is_whitespace)
        {
            let stripped = step.get(prefix.len()..).unwrap_or_default().trim();
            if !stripped.is_empty() {
                return stripped.to_string();
            }
        }
    }
    step.to_string()
}
