//! GitHub code-search connector.
//!
//! Searches a single repository for files matching free text via the code
//! search API, scoped with a `repo:owner/name` qualifier. Same sentinel
//! discipline as the Notion connector: every outcome is plain text.

use serde_json::Value;
use std::time::Duration;

use crate::agent::CodeSearch;
use crate::config::GithubSettings;

pub const NO_CODE_MATCHES: &str = "❌ Git: No matching code files found in the repository.";
pub const MISSING_GITHUB_KEY: &str = "❌ Git: Missing API key for GitHub.";

/// Client for the GitHub code search API (`GET {endpoint}/search/code`).
pub struct GithubConnector {
    endpoint: String,
    timeout: Duration,
    max_results: usize,
    user_agent: String,
}

impl GithubConnector {
    pub fn new(settings: &GithubSettings) -> Self {
        Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
            max_results: settings.max_results,
            user_agent: format!("answer-harness/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Search `owner/repo` for code matching `query`.
    ///
    /// Issues exactly one timed request. Returns newline-joined
    /// `"File: {path}, URL: {url}"` lines for up to `max_results` items in
    /// response order, or a sentinel string for every other outcome.
    pub async fn search(&self, api_key: &str, owner: &str, repo: &str, query: &str) -> String {
        if api_key.trim().is_empty() {
            return MISSING_GITHUB_KEY.to_string();
        }

        let client = match reqwest::Client::builder().timeout(self.timeout).build() {
            Ok(client) => client,
            Err(e) => return connection_error(&e.to_string()),
        };

        // The code search API accepts `+` as the term separator; the scope
        // qualifier must ride in the same q parameter, so the URL is built
        // verbatim rather than through query-string encoding.
        let search_query = format!("{}+repo:{}/{}", query, owner, repo);
        let url = format!("{}/search/code?q={}", self.endpoint, search_query);

        let response = match client
            .get(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", &self.user_agent)
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

        render_code_results(&json, self.max_results)
    }
}

#[async_trait::async_trait]
impl CodeSearch for GithubConnector {
    async fn search(&self, api_key: &str, owner: &str, repo: &str, query: &str) -> String {
        GithubConnector::search(self, api_key, owner, repo, query).await
    }
}

fn connection_error(detail: &str) -> String {
    format!("❌ Git Connection Error: {}", detail)
}

/// Render a code search response body as file lines.
///
/// A missing or empty `items` array yields the no-match sentinel.
pub(crate) fn render_code_results(json: &Value, max_results: usize) -> String {
    let items = match json.get("items").and_then(|i| i.as_array()) {
        Some(items) if !items.is_empty() => items,
        _ => return NO_CODE_MATCHES.to_string(),
    };

    let lines: Vec<String> = items
        .iter()
        .take(max_results)
        .map(|item| {
            let path = item
                .get("path")
                .and_then(|p| p.as_str())
                .unwrap_or("No Path");
            let url = item
                .get("html_url")
                .and_then(|u| u.as_str())
                .unwrap_or("No URL");
            format!("File: {}, URL: {}", path, url)
        })
        .collect();

    lines.join("\n")
}
