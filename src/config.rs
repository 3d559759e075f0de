use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable names for the five required credential values.
pub const NOTION_KEY_VAR: &str = "NOTION_API_KEY";
pub const GITHUB_KEY_VAR: &str = "GIT_API_KEY";
pub const OPENAI_KEY_VAR: &str = "OPENAI_API_KEY";
pub const REPO_OWNER_VAR: &str = "GIT_REPO_OWNER";
pub const REPO_NAME_VAR: &str = "GIT_REPO_NAME";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub notion: NotionSettings,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub reasoning: ReasoningSettings,
    /// Secrets and repository coordinates. Never read from the TOML file —
    /// populated from the environment once at startup.
    #[serde(skip)]
    pub credentials: Credentials,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotionSettings {
    #[serde(default = "default_notion_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_notion_version")]
    pub version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for NotionSettings {
    fn default() -> Self {
        Self {
            endpoint: default_notion_endpoint(),
            version: default_notion_version(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubSettings {
    #[serde(default = "default_github_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            endpoint: default_github_endpoint(),
            timeout_secs: default_timeout_secs(),
            max_results: default_max_results(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReasoningSettings {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReasoningSettings {
    fn default() -> Self {
        Self {
            endpoint: default_openai_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_notion_endpoint() -> String {
    "https://api.notion.com/v1".to_string()
}
fn default_notion_version() -> String {
    "2022-06-28".to_string()
}
fn default_github_endpoint() -> String {
    "https://api.github.com".to_string()
}
fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_results() -> usize {
    5
}

/// The five required credential values, trimmed of stray whitespace.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub notion_key: String,
    pub github_key: String,
    pub openai_key: String,
    pub repo_owner: String,
    pub repo_name: String,
}

impl Credentials {
    /// Read all credential values from the process environment.
    ///
    /// Missing variables become empty strings here; completeness is
    /// enforced separately by [`validate_complete`](Self::validate_complete)
    /// so callers can decide whether a partial set is fatal.
    pub fn from_env() -> Self {
        Self {
            notion_key: env_trimmed(NOTION_KEY_VAR),
            github_key: env_trimmed(GITHUB_KEY_VAR),
            openai_key: env_trimmed(OPENAI_KEY_VAR),
            repo_owner: env_trimmed(REPO_OWNER_VAR),
            repo_name: env_trimmed(REPO_NAME_VAR),
        }
    }

    /// Fail if any required value is blank, naming every missing variable.
    pub fn validate_complete(&self) -> Result<()> {
        let mut missing = Vec::new();
        for (var, value) in [
            (NOTION_KEY_VAR, &self.notion_key),
            (GITHUB_KEY_VAR, &self.github_key),
            (OPENAI_KEY_VAR, &self.openai_key),
            (REPO_OWNER_VAR, &self.repo_owner),
            (REPO_NAME_VAR, &self.repo_name),
        ] {
            if value.is_empty() {
                missing.push(var);
            }
        }

        if !missing.is_empty() {
            bail!(
                "One or more API keys or repository details are missing: {}. Please check and try again.",
                missing.join(", ")
            );
        }

        Ok(())
    }
}

fn env_trimmed(var: &str) -> String {
    std::env::var(var).unwrap_or_default().trim().to_string()
}

/// Load settings from an optional TOML file, then merge credentials from
/// the environment.
///
/// With no path, all tunables take their defaults. An explicitly provided
/// path that cannot be read or parsed is an error.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let mut settings = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str::<Settings>(&content).with_context(|| "Failed to parse config file")?
        }
        None => Settings::default(),
    };

    settings.credentials = Credentials::from_env();
    validate_settings(&settings)?;
    Ok(settings)
}

fn validate_settings(settings: &Settings) -> Result<()> {
    if settings.notion.timeout_secs == 0
        || settings.github.timeout_secs == 0
        || settings.reasoning.timeout_secs == 0
    {
        bail!("timeout_secs must be > 0");
    }

    if settings.notion.max_results < 1 || settings.github.max_results < 1 {
        bail!("max_results must be >= 1");
    }

    if settings.reasoning.model.trim().is_empty() {
        bail!("reasoning.model must not be empty");
    }

    Ok(())
}
