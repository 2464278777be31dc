//! Direct page fetcher.
//!
//! A [`ScrapePort`] that downloads pages itself when no scrape service is
//! configured. HTML is reduced to readable text for the markdown and text
//! formats; the html format returns the body untouched. There is no
//! service-side cache, so `force` has no effect.

use super::http::{build_client, map_transport_error};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use thinker_application::ports::collaborators::{CollaboratorError, ScrapePort};
use thinker_domain::OutputFormat;
use tracing::debug;

/// Maximum response body size (5 MB)
const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Subtrees that never contain readable text
const SKIP_TAGS: [&str; 5] = ["script", "style", "noscript", "svg", "template"];

pub struct DirectFetcher {
    client: reqwest::Client,
}

impl DirectFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl ScrapePort for DirectFetcher {
    async fn fetch(
        &self,
        url: &str,
        format: OutputFormat,
        _force: bool,
    ) -> Result<String, CollaboratorError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CollaboratorError::from_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown"),
            ));
        }
        if response.content_length().unwrap_or(0) > MAX_BODY_SIZE as u64 {
            return Err(CollaboratorError::Rejected(format!(
                "Response too large (max: {} bytes)",
                MAX_BODY_SIZE
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if body.len() > MAX_BODY_SIZE {
            return Err(CollaboratorError::Rejected(format!(
                "Response too large: {} bytes",
                body.len()
            )));
        }
        let body = String::from_utf8_lossy(&body);
        debug!("Fetched {} ({}, {} bytes)", url, content_type, body.len());

        let is_html =
            content_type.contains("text/html") || content_type.contains("application/xhtml");
        Ok(match format {
            OutputFormat::Html => body.into_owned(),
            OutputFormat::Markdown | OutputFormat::Text if is_html => html_to_text(&body),
            OutputFormat::Markdown | OutputFormat::Text => body.into_owned(),
        })
    }
}

/// Extract readable text from HTML.
///
/// Block-level elements end a line; scripts, styles and similar subtrees
/// are dropped. The page title, when present, leads the output.
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut parts = Vec::new();
    if let Ok(title_selector) = Selector::parse("title")
        && let Some(title) = document.select(&title_selector).next()
    {
        let title: String = title.text().collect();
        if !title.trim().is_empty() {
            parts.push(format!("# {}\n", title.trim()));
        }
    }

    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next());
    let root = body.unwrap_or_else(|| document.root_element());
    collect_text(root, &mut parts);

    clean_whitespace(&parts.join(" "))
}

fn collect_text(element: ElementRef, parts: &mut Vec<String>) {
    let name = element.value().name();
    if SKIP_TAGS.contains(&name) || name == "head" {
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    collect_text(child, parts);
                }
            }
            _ => {}
        }
    }

    if is_block(name) {
        parts.push("\n".to_string());
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "li"
            | "tr"
            | "br"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "pre"
            | "blockquote"
    )
}

/// Collapse runs of spaces and keep at most one blank line in a row.
fn clean_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in lines {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(&line);
        result.push('\n');
    }
    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_basic() {
        let html = "<html><head><title>Tokio</title></head><body><h1>Hello</h1><p>World</p></body></html>";
        let text = html_to_text(html);
        assert!(text.starts_with("# Tokio"));
        assert!(text.contains("Hello"));
        assert!(text.contains("World"));
    }

    #[test]
    fn test_html_to_text_strips_script_and_style() {
        let html = r#"
        <html><body>
            <script>var x = 1;</script>
            <style>.foo { color: red; }</style>
            <p>Visible text</p>
            <noscript>No JS</noscript>
        </body></html>
        "#;
        let text = html_to_text(html);
        assert!(text.contains("Visible text"));
        assert!(!text.contains("var x = 1"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("No JS"));
    }

    #[test]
    fn test_block_elements_break_lines() {
        let text = html_to_text("<body><p>First</p><p>Second</p></body>");
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines, vec!["First", "Second"]);
    }

    #[test]
    fn test_html_to_text_empty() {
        assert!(html_to_text("").trim().is_empty());
    }

    #[test]
    fn test_clean_whitespace() {
        assert_eq!(clean_whitespace("  hello   world  "), "hello world");
        assert_eq!(clean_whitespace("a\n\n\n\nb"), "a\n\nb");
    }
}
