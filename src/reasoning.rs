//! Answer synthesis over the retrieved Notion and Git context.
//!
//! Defines the [`CompletionBackend`] trait and concrete implementations:
//! - **[`OpenAiBackend`]** — calls an OpenAI-compatible chat-completions API.
//! - **[`DisabledBackend`]** — stands in when the real backend cannot be
//!   constructed; every call reports unavailability.
//!
//! The entry point is [`synthesize_answer`], which walks an explicit
//! availability ladder before and around the API call:
//!
//! ```text
//! CHECK_CLIENT ──unavailable──▶ FALLBACK (client unavailable)
//!      │
//! CHECK_KEY ────blank key────▶ FALLBACK (missing key)
//!      │
//!    CALL ──network error───▶ FALLBACK (network)
//!      │  └─other error─────▶ ERROR (literal message)
//!      ▼
//!    DONE (model text verbatim)
//! ```
//!
//! Every fallback is produced by [`fallback_summary`], a pure function that
//! embeds the user query and both retrieval texts verbatim, so the agent
//! remains usable end-to-end with no credentials and no network.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::ReasoningSettings;

/// Role instruction for the completion request. Demands citations; nothing
/// downstream verifies the model actually complied.
const SYSTEM_PROMPT: &str = "You are an intelligent internal assistant for a development team. \
    Your goal is to bridge documentation (Notion) and code (Git). \
    Analyze the retrieved information from both sources to answer the user's question. \
    You MUST provide attribution by citing which Notion pages and which Git files were used.";

/// Failure classes for a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Connection, timeout, or request-level transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered but unusably: non-2xx status or a response
    /// with no extractable content.
    #[error("{0}")]
    Api(String),

    /// The backend could not be used at all.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// A chat-style completion service.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Returns the model identifier requests are made with.
    fn model(&self) -> &str;

    /// Whether the backend can attempt a call at all.
    fn is_available(&self) -> bool {
        true
    }

    /// Send one system + user message pair and return the generated text.
    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
    ) -> Result<String, CompletionError>;
}

/// Backend for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiBackend {
    endpoint: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Build the backend, including its HTTP client.
    ///
    /// Construction failure is the Rust equivalent of the completion client
    /// library being unobtainable; [`create_backend`] maps it to
    /// [`DisabledBackend`].
    pub fn new(settings: &ReasoningSettings) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Unavailable(e.to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            client,
        })
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        api_key: &str,
        system: &str,
        user: &str,
    ) -> Result<String, CompletionError> {
        let url = format!("{}/chat/completions", self.endpoint);

        let request_body = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Api(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let json: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Api(format!("Failed to parse response: {}", e)))?;

        extract_content(&json)
    }
}

/// Backend used when the real one cannot be constructed.
pub struct DisabledBackend;

#[async_trait]
impl CompletionBackend for DisabledBackend {
    fn model(&self) -> &str {
        "disabled"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn complete(
        &self,
        _api_key: &str,
        _system: &str,
        _user: &str,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Unavailable(
            "completion backend is disabled".to_string(),
        ))
    }
}

/// Build the completion backend for the given settings.
///
/// Never fails: if the real backend cannot be constructed, the returned
/// [`DisabledBackend`] routes every run to the local fallback instead.
pub fn create_backend(settings: &ReasoningSettings) -> Box<dyn CompletionBackend> {
    match OpenAiBackend::new(settings) {
        Ok(backend) => Box::new(backend),
        Err(_) => Box::new(DisabledBackend),
    }
}

/// Classify a transport-level send error.
///
/// Structured kinds on [`reqwest::Error`] are the primary signal; message
/// substrings are the last resort for errors reqwest does not classify.
fn classify_transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() || e.is_connect() || e.is_request() {
        return CompletionError::Network(e.to_string());
    }

    let msg = e.to_string();
    if is_network_flavored(&msg) {
        CompletionError::Network(msg)
    } else {
        CompletionError::Api(msg)
    }
}

fn is_network_flavored(msg: &str) -> bool {
    let lower = msg.to_lowercase();
    lower.contains("connection")
        || lower.contains("failed to establish")
        || lower.contains("connection aborted")
        || lower.contains("timeout")
}

/// Pull the generated text out of a chat-completions response body.
fn extract_content(json: &Value) -> Result<String, CompletionError> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| CompletionError::Api("No content in response".to_string()))
}

/// Why a run ended in the local fallback instead of a model answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    ClientUnavailable,
    MissingKey,
    Network,
}

impl FallbackReason {
    fn header(&self) -> &'static str {
        match self {
            FallbackReason::ClientUnavailable => "⚠️ OpenAI client not available.",
            FallbackReason::MissingKey => "⚠️ OPENAI_API_KEY is not set.",
            FallbackReason::Network => "⚠️ OpenAI connection failed (network issue).",
        }
    }

    fn hint(&self) -> &'static str {
        match self {
            FallbackReason::ClientUnavailable => {
                "(Install the openai package and set OPENAI_API_KEY to enable real reasoning.)"
            }
            FallbackReason::MissingKey => "(Set OPENAI_API_KEY to enable real reasoning.)",
            FallbackReason::Network => {
                "(Check OPENAI_API_KEY, network access, or set OPENAI_API_KEY empty to use local fallback.)"
            }
        }
    }
}

/// Deterministic local summary used whenever the completion service is
/// unusable.
///
/// Embeds the user query and both retrieval texts verbatim; blank retrieval
/// texts become placeholder markers so the structure stays recognizable.
pub fn fallback_summary(
    reason: FallbackReason,
    user_query: &str,
    notion_data: &str,
    git_data: &str,
) -> String {
    let notion = if notion_data.is_empty() {
        "(no notion data)"
    } else {
        notion_data
    };
    let git = if git_data.is_empty() {
        "(no git data)"
    } else {
        git_data
    };

    format!(
        "{}\nSummary fallback:\nUser Query: {}\n\nNotion Data:\n{}\n\nGit Data:\n{}\n\n{}",
        reason.header(),
        user_query,
        notion,
        git,
        reason.hint()
    )
}

/// Synthesize the final answer from the user query and both retrieval texts.
///
/// Walks the availability ladder described in the module docs. Always
/// returns text — fallback or error prose, never an `Err` — mirroring the
/// connectors' sentinel discipline.
pub async fn synthesize_answer(
    backend: &dyn CompletionBackend,
    api_key: &str,
    user_query: &str,
    notion_data: &str,
    git_data: &str,
) -> String {
    if !backend.is_available() {
        return fallback_summary(
            FallbackReason::ClientUnavailable,
            user_query,
            notion_data,
            git_data,
        );
    }

    if api_key.trim().is_empty() {
        return fallback_summary(FallbackReason::MissingKey, user_query, notion_data, git_data);
    }

    let user_prompt = build_user_prompt(user_query, notion_data, git_data);

    match backend.complete(api_key, SYSTEM_PROMPT, &user_prompt).await {
        Ok(text) => text,
        Err(CompletionError::Network(_)) | Err(CompletionError::Unavailable(_)) => {
            fallback_summary(FallbackReason::Network, user_query, notion_data, git_data)
        }
        Err(CompletionError::Api(msg)) => format!("❌ OpenAI Reasoning Error: {}", msg),
    }
}

fn build_user_prompt(user_query: &str, notion_data: &str, git_data: &str) -> String {
    format!(
        "\nUser's Question: \"{}\"\n\n---\nDATA RETRIEVED FROM NOTION:\n{}\n---\nDATA RETRIEVED FROM GIT REPOSITORY:\n{}\n---\n\nPlease provide a concise, professional, and human-readable answer that directly addresses the User's Question based ONLY on the data provided above.\n",
        user_query, notion_data, git_data
    )
}
