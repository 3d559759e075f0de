//! The agent flow: validate → retrieve ×2 → reason → banner.
//!
//! The orchestrator never parses retrieval output — both connectors return
//! opaque text (real summaries or sentinels) that is forwarded to the
//! reasoning step as-is. Each external call is attempted exactly once.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::Settings;
use crate::progress::{SearchProgressEvent, SearchProgressReporter};
use crate::reasoning::{self, CompletionBackend};

/// A documentation search client. Implementations normalize every outcome
/// (success, empty, failure) to plain text.
#[async_trait]
pub trait DocSearch: Send + Sync {
    async fn search(&self, api_key: &str, query: &str) -> String;
}

/// A repository code search client. Same text-only contract as [`DocSearch`].
#[async_trait]
pub trait CodeSearch: Send + Sync {
    async fn search(&self, api_key: &str, owner: &str, repo: &str, query: &str) -> String;
}

/// One run's pair of question texts.
///
/// `user_query` is what the person actually asked; `search_term` is the
/// distilled phrase both connectors search with. Only the reasoning step
/// sees the original question.
#[derive(Debug, Clone)]
pub struct AgentQuery {
    pub user_query: String,
    pub search_term: String,
}

/// Execute the agent's core flow and return the final answer text.
///
/// Aborts before any network call if the credential set is incomplete.
/// The two retrievals are independent — neither sees the other's result —
/// so they are issued together and joined before the reasoning step.
pub async fn run_agent_flow(
    settings: &Settings,
    docs: &dyn DocSearch,
    code: &dyn CodeSearch,
    backend: &dyn CompletionBackend,
    reporter: &dyn SearchProgressReporter,
    query: &AgentQuery,
) -> Result<String> {
    let creds = &settings.credentials;
    creds.validate_complete()?;

    println!("\n--- AGENT STARTING CONTEXTUAL SEARCH ---");
    println!("User Query: {}", query.user_query);
    println!("Internal Search Term: {}", query.search_term);
    println!("------------------------------------------");

    reporter.report(SearchProgressEvent::SearchingDocs {
        query: query.search_term.clone(),
    });
    reporter.report(SearchProgressEvent::SearchingCode {
        repo: creds.repo_name.clone(),
        query: query.search_term.clone(),
    });

    let (notion_data, git_data) = tokio::join!(
        docs.search(&creds.notion_key, &query.search_term),
        code.search(
            &creds.github_key,
            &creds.repo_owner,
            &creds.repo_name,
            &query.search_term,
        ),
    );

    reporter.report(SearchProgressEvent::Reasoning {
        model: backend.model().to_string(),
    });

    let answer = reasoning::synthesize_answer(
        backend,
        &creds.openai_key,
        &query.user_query,
        &notion_data,
        &git_data,
    )
    .await;

    Ok(answer)
}

/// Wrap the final answer in the fixed response banner.
pub fn render_final_banner(answer: &str) -> String {
    format!(
        "\n========================================================\n             ✅ FINAL AGENT RESPONSE ✅\n========================================================\n{}\n========================================================\n",
        answer
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_wraps_answer() {
        let banner = render_final_banner("the answer");
        assert!(banner.contains("✅ FINAL AGENT RESPONSE ✅"));
        assert!(banner.contains("\nthe answer\n"));
        let separators = banner
            .lines()
            .filter(|l| l.starts_with("========"))
            .count();
        assert_eq!(separators, 3);
    }
}
