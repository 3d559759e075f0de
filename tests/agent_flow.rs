//! Integration tests for the agent flow against mock connectors and
//! backends.
//!
//! These prove the orchestration contract end-to-end without any network:
//! abort-before-retrieval on incomplete credentials, opaque forwarding of
//! retrieval text into the reasoning step, and fallback routing.

use std::sync::atomic::{AtomicUsize, Ordering};

use answer_harness::agent::{run_agent_flow, AgentQuery, CodeSearch, DocSearch};
use answer_harness::config::{Credentials, Settings};
use answer_harness::connector_github::NO_CODE_MATCHES;
use answer_harness::progress::NoProgress;
use answer_harness::reasoning::{synthesize_answer, CompletionBackend, CompletionError};
use async_trait::async_trait;

// ─── Mock connectors ────────────────────────────────────────────────

/// Doc search mock returning a canned result and counting invocations.
struct CannedDocSearch {
    result: String,
    calls: AtomicUsize,
}

impl CannedDocSearch {
    fn new(result: &str) -> Self {
        Self {
            result: result.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocSearch for CannedDocSearch {
    async fn search(&self, _api_key: &str, _query: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

struct CannedCodeSearch {
    result: String,
    calls: AtomicUsize,
}

impl CannedCodeSearch {
    fn new(result: &str) -> Self {
        Self {
            result: result.to_string(),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CodeSearch for CannedCodeSearch {
    async fn search(&self, _api_key: &str, _owner: &str, _repo: &str, _query: &str) -> String {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

// ─── Mock backends ──────────────────────────────────────────────────

/// Backend that records the prompts it received and echoes them back.
struct RecordingBackend {
    calls: AtomicUsize,
}

impl RecordingBackend {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CompletionBackend for RecordingBackend {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        _api_key: &str,
        _system: &str,
        user: &str,
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("MODEL ANSWER BASED ON:\n{}", user))
    }
}

/// Backend whose call always fails with a timeout-flavored network error.
struct TimeoutBackend;

#[async_trait]
impl CompletionBackend for TimeoutBackend {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn complete(
        &self,
        _api_key: &str,
        _system: &str,
        _user: &str,
    ) -> Result<String, CompletionError> {
        Err(CompletionError::Network(
            "error sending request: operation timed out".to_string(),
        ))
    }
}

// ─── Fixtures ───────────────────────────────────────────────────────

fn complete_settings() -> Settings {
    Settings {
        credentials: Credentials {
            notion_key: "notion-secret".to_string(),
            github_key: "github-secret".to_string(),
            openai_key: "openai-secret".to_string(),
            repo_owner: "acme".to_string(),
            repo_name: "payments".to_string(),
        },
        ..Settings::default()
    }
}

fn query() -> AgentQuery {
    AgentQuery {
        user_query: "What tasks relate to the payment service, and where is that logic?"
            .to_string(),
        search_term: "payment service".to_string(),
    }
}

const TWO_PAGES: &str = "Title: Payment Tasks, URL: https://notion.so/p1\n\
                         Title: Payment Service Design, URL: https://notion.so/p2";

// ─── Tests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn incomplete_credentials_abort_before_any_call() {
    let mut settings = complete_settings();
    settings.credentials.github_key = String::new();

    let docs = CannedDocSearch::new(TWO_PAGES);
    let code = CannedCodeSearch::new(NO_CODE_MATCHES);
    let backend = RecordingBackend::new();

    let result = run_agent_flow(&settings, &docs, &code, &backend, &NoProgress, &query()).await;

    assert!(result.is_err());
    assert_eq!(docs.calls.load(Ordering::SeqCst), 0);
    assert_eq!(code.calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn every_blank_credential_aborts() {
    for field in 0..5 {
        let mut settings = complete_settings();
        let creds = &mut settings.credentials;
        match field {
            0 => creds.notion_key = String::new(),
            1 => creds.github_key = String::new(),
            2 => creds.openai_key = String::new(),
            3 => creds.repo_owner = String::new(),
            _ => creds.repo_name = String::new(),
        }

        let docs = CannedDocSearch::new(TWO_PAGES);
        let code = CannedCodeSearch::new(NO_CODE_MATCHES);
        let backend = RecordingBackend::new();

        let result =
            run_agent_flow(&settings, &docs, &code, &backend, &NoProgress, &query()).await;
        assert!(result.is_err(), "blank field {} did not abort", field);
        assert_eq!(docs.calls.load(Ordering::SeqCst), 0);
        assert_eq!(code.calls.load(Ordering::SeqCst), 0);
    }
}

#[tokio::test]
async fn successful_flow_forwards_both_retrievals_to_the_backend() {
    let settings = complete_settings();
    let docs = CannedDocSearch::new(TWO_PAGES);
    let code = CannedCodeSearch::new(NO_CODE_MATCHES);
    let backend = RecordingBackend::new();

    let answer = run_agent_flow(&settings, &docs, &code, &backend, &NoProgress, &query())
        .await
        .unwrap();

    assert_eq!(docs.calls.load(Ordering::SeqCst), 1);
    assert_eq!(code.calls.load(Ordering::SeqCst), 1);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);

    // The backend's prompt — echoed into the answer — must carry both
    // retrieval texts and the original user query untouched.
    assert!(answer.contains("Title: Payment Tasks, URL: https://notion.so/p1"));
    assert!(answer.contains("Title: Payment Service Design, URL: https://notion.so/p2"));
    assert!(answer.contains(NO_CODE_MATCHES));
    assert!(answer.contains("What tasks relate to the payment service"));
}

#[tokio::test]
async fn missing_reasoning_key_yields_fallback_with_both_retrievals() {
    // Two doc pages, zero code files, no reasoning key: the answer must
    // carry both page lines, the code no-match sentinel, and the
    // missing-key warning header.
    let backend = RecordingBackend::new();
    let answer = synthesize_answer(
        &backend,
        "",
        "What tasks relate to the payment service?",
        TWO_PAGES,
        NO_CODE_MATCHES,
    )
    .await;

    assert!(answer.starts_with("⚠️ OPENAI_API_KEY is not set."));
    assert!(answer.contains("Title: Payment Tasks, URL: https://notion.so/p1"));
    assert!(answer.contains("Title: Payment Service Design, URL: https://notion.so/p2"));
    assert!(answer.contains(NO_CODE_MATCHES));
    assert!(answer.contains("User Query: What tasks relate to the payment service?"));
    // The backend was never reached
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn timeout_during_reasoning_routes_to_network_fallback() {
    let settings = complete_settings();
    let docs = CannedDocSearch::new(TWO_PAGES);
    let code = CannedCodeSearch::new(NO_CODE_MATCHES);

    let answer = run_agent_flow(&settings, &docs, &code, &TimeoutBackend, &NoProgress, &query())
        .await
        .unwrap();

    assert!(answer.starts_with("⚠️ OpenAI connection failed (network issue)."));
    assert!(!answer.contains("❌ OpenAI Reasoning Error"));
    // Retrieval texts survive into the fallback verbatim
    assert!(answer.contains(TWO_PAGES));
    assert!(answer.contains(NO_CODE_MATCHES));
}

#[tokio::test]
async fn fallback_is_deterministic_across_runs() {
    let settings = complete_settings();
    let query = query();

    let mut answers = Vec::new();
    for _ in 0..2 {
        let docs = CannedDocSearch::new(TWO_PAGES);
        let code = CannedCodeSearch::new(NO_CODE_MATCHES);
        let answer =
            run_agent_flow(&settings, &docs, &code, &TimeoutBackend, &NoProgress, &query)
                .await
                .unwrap();
        answers.push(answer);
    }

    assert_eq!(answers[0], answers[1]);
}
