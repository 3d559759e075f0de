//! Notion documentation connector.
//!
//! Searches a Notion workspace for pages matching free text and normalizes
//! every outcome — success, empty, or failure — to plain text. Failures are
//! returned as sentinel strings, never as errors, so the agent flow can
//! always hand *something* to the reasoning step.

use serde_json::Value;
use std::time::Duration;

use crate::agent::DocSearch;
use crate::config::NotionSettings;

pub const NO_DOC_MATCHES: &str = "❌ Notion: No matching documentation pages found.";
pub const MISSING_NOTION_KEY: &str = "❌ Notion: Missing API key.";

/// Client for the Notion search API (`POST {endpoint}/search`).
pub struct NotionConnector {
    endpoint: String,
    version: String,
    timeout: Duration,
    max_results: usize,
}

impl NotionConnector {
    pub fn new(settings: &NotionSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            version: settings.version.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_results: settings.max_results,
        }
    }

    /// Search the workspace for pages matching `query`.
    ///
    /// Issues exactly one timed request. Returns newline-joined
    /// `"Title: {title}, URL: {url}"` lines for up to `max_results` pages
    /// in response order, or a sentinel string for every other outcome.
    pub async fn search(&self, api_key: &str, query: &str) -> String {
        if api_key.trim().is_empty() {
            return MISSING_NOTION_KEY.to_string();
        }

        let client = match reqwest::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => return connection_error(&e.to_string()),
        };

        let url = format!("{}/search", self.endpoint);
        let body = serde_json::json!({ "query": query });

        let response = match client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .header("Notion-Version", &self.version)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return connection_error(&e.to_string()),
        };

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return connection_error(&format!("HTTP {}: {}", status, body_text.trim()));
        }

        let json: Value = match response.json().await {
            Ok(json) => json,
            Err(e) => return connection_error(&e.to_string()),
        };

        render_page_results(&json, self.max_results)
    }
}

#[async_trait::async_trait]
impl DocSearch for NotionConnector {
    async fn search(&self, api_key: &str, query: &str) -> String {
        NotionConnector::search(self, api_key, query).await
    }
}

fn connection_error(detail: &str) -> String {
    format!("❌ Notion Connection Error: {}", detail)
}

/// Render a Notion search response body as summary lines.
///
/// A missing or empty `results` array yields the no-match sentinel.
pub(crate) fn render_page_results(json: &Value, max_results: usize) -> String {
    let results = match json.get("results").and_then(|r| r.as_array()) {
        Some(results) if !results.is_empty() => results,
        _ => return NO_DOC_MATCHES.to_string(),
    };

    let summaries: Vec<String> = results
        .iter()
        .take(max_results)
        .map(|page| format!("Title: {}, URL: {}", page_title(page), page_url(page)))
        .collect();

    summaries.join("\n")
}

/// Extract a page's display title from `properties.title.title[0].plain_text`.
///
/// Notion page objects nest titles deeply and not every page has one
/// (databases, untitled pages). Structural absence at any level falls back
/// to a placeholder literal.
fn page_title(page: &Value) -> &str {
    page.get("properties")
        .and_then(|p| p.get("title"))
        .and_then(|t| t.get("title"))
        .and_then(|t| t.as_array())
        .and_then(|parts| parts.first())
        .and_then(|part| part.get("plain_text"))
        .and_then(|t| t.as_str())
        .unwrap_or("No Title Available")
}

fn page_url(page: &Value) -> &str {
    page.get("url")
        .and_then(|u| u.as_str())
        .unwrap_or("No URL")
}
