//! # Answer Harness CLI (`ask`)
//!
//! Answers a question by searching Notion docs and GitHub code, then
//! synthesizing a cited answer through a completion API (with a local
//! fallback when that API is unusable).
//!
//! ## Usage
//!
//! ```bash
//! export NOTION_API_KEY=... GIT_API_KEY=... OPENAI_API_KEY=...
//! export GIT_REPO_OWNER=acme GIT_REPO_NAME=payments
//!
//! # Ask a question; search both sources with a distilled term
//! ask run "Where is the payment retry logic implemented?" --term "payment retry"
//!
//! # Check which connectors are configured
//! ask sources
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use answer_harness::agent::{self, AgentQuery};
use answer_harness::config;
use answer_harness::connector_github::GithubConnector;
use answer_harness::connector_notion::NotionConnector;
use answer_harness::progress::ProgressMode;
use answer_harness::reasoning;
use answer_harness::sources;

/// Answer Harness — ask a question across Notion docs and GitHub code.
///
/// Credentials come from the environment (NOTION_API_KEY, GIT_API_KEY,
/// OPENAI_API_KEY, GIT_REPO_OWNER, GIT_REPO_NAME); endpoints, timeouts,
/// and the model are tunable through an optional TOML config file.
#[derive(Parser)]
#[command(
    name = "ask",
    about = "Answer a question by bridging Notion documentation and GitHub code",
    version
)]
struct Cli {
    /// Path to an optional configuration file (TOML) for endpoint,
    /// timeout, result-limit, and model overrides.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Progress output on stderr: `auto` (TTY only), `off`, or `human`.
    #[arg(long, global = true, default_value = "auto")]
    progress: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full flow: search both sources, then synthesize an answer.
    Run {
        /// The question to answer.
        user_query: String,

        /// Internal search term passed to both connectors.
        /// Defaults to the question itself.
        #[arg(long)]
        term: Option<String>,
    },

    /// List connectors and their configuration status.
    Sources,
}

fn parse_progress_mode(mode: &str) -> Result<ProgressMode> {
    match mode {
        "auto" => Ok(ProgressMode::default_for_tty()),
        "off" => Ok(ProgressMode::Off),
        "human" => Ok(ProgressMode::Human),
        other => bail!("Unknown progress mode: {}. Use auto, off, or human.", other),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config::load_settings(cli.config.as_deref())?;
    let progress = parse_progress_mode(&cli.progress)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&settings)?;
        }
        Commands::Run { user_query, term } => {
            let query = AgentQuery {
                search_term: term.unwrap_or_else(|| user_query.clone()),
                user_query,
            };

            let docs = NotionConnector::new(&settings.notion);
            let code = GithubConnector::new(&settings.github);
            let backend = reasoning::create_backend(&settings.reasoning);
            let reporter = progress.reporter();

            let answer = agent::run_agent_flow(
                &settings,
                &docs,
                &code,
                backend.as_ref(),
                reporter.as_ref(),
                &query,
            )
            .await?;

            println!("{}", agent::render_final_banner(&answer));
        }
    }

    Ok(())
}
