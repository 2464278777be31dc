//! URL normalization and extraction.

use crate::core::error::DomainError;
use regex::Regex;
use std::sync::LazyLock;
use url::{Host, Url};

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"'\)\]]+"#).expect("URL pattern is valid")
});

/// Normalize a URL so that equivalent spellings share one cache key.
///
/// - a missing scheme defaults to `https`
/// - scheme and host are lower-cased, `.` and `..` path segments resolved
/// - the fragment is dropped
/// - default ports (`:80` for http, `:443` for https) are dropped
/// - a trailing slash on a non-root path is dropped; an empty path becomes `/`
///
/// Path and query keep their case and order. The host must be an IP address,
/// `localhost`, or a dotted domain name.
pub fn normalize_url(raw: &str) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    let invalid = || DomainError::InvalidUrl(raw.to_string());

    let with_scheme = match trimmed.split_once("://") {
        Some((_, rest)) if rest.starts_with('/') => return Err(invalid()),
        Some(_) => trimmed.to_string(),
        None => format!("https://{trimmed}"),
    };
    let mut url = Url::parse(&with_scheme).map_err(|_| invalid())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    match url.host() {
        Some(Host::Ipv4(_) | Host::Ipv6(_)) => {}
        Some(Host::Domain(domain)) if is_domain_name(domain) => {}
        _ => return Err(invalid()),
    }

    url.set_fragment(None);
    if url.query() == Some("") {
        url.set_query(None);
    }
    let path = url.path().trim_end_matches('/').to_string();
    if path.is_empty() {
        url.set_path("/");
    } else if path != url.path() {
        url.set_path(&path);
    }
    Ok(url.to_string())
}

fn is_domain_name(domain: &str) -> bool {
    if domain == "localhost" {
        return true;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() > 1
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        })
}

/// Extract every `http(s)://` URL from free text, in order of appearance.
///
/// Trailing sentence punctuation is not part of the URL.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?']))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}
