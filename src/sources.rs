use anyhow::Result;

use crate::config::{
    Settings, GITHUB_KEY_VAR, NOTION_KEY_VAR, OPENAI_KEY_VAR, REPO_NAME_VAR, REPO_OWNER_VAR,
};

/// Print each connector's configuration status. No network calls.
pub fn list_sources(settings: &Settings) -> Result<()> {
    let creds = &settings.credentials;

    let notion = if creds.notion_key.is_empty() {
        (format!("MISSING {}", NOTION_KEY_VAR), false)
    } else {
        ("OK".to_string(), true)
    };

    let github = if creds.github_key.is_empty() {
        (format!("MISSING {}", GITHUB_KEY_VAR), false)
    } else if creds.repo_owner.is_empty() {
        (format!("MISSING {}", REPO_OWNER_VAR), false)
    } else if creds.repo_name.is_empty() {
        (format!("MISSING {}", REPO_NAME_VAR), false)
    } else {
        (format!("OK ({}/{})", creds.repo_owner, creds.repo_name), true)
    };

    let openai = if creds.openai_key.is_empty() {
        // Reasoning still works without a key, via the local fallback.
        (format!("MISSING {} (fallback only)", OPENAI_KEY_VAR), false)
    } else {
        (format!("OK ({})", settings.reasoning.model), true)
    };

    println!("{:<12} {:<40} READY", "CONNECTOR", "STATUS");
    println!("{:<12} {:<40} {}", "notion", notion.0, notion.1);
    println!("{:<12} {:<40} {}", "github", github.0, github.1);
    println!("{:<12} {:<40} {}", "openai", openai.0, openai.1);

    Ok(())
}
