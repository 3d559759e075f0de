//! Progress reporting for the agent flow.
//!
//! Emits the familiar pre-request markers while the agent searches and
//! reasons. Progress is written to **stderr** so stdout stays parseable —
//! only retrieval summaries and the final banner belong on stdout.

use std::io::Write;

/// A single progress event in the agent flow.
#[derive(Clone, Debug)]
pub enum SearchProgressEvent {
    /// About to query the documentation workspace.
    SearchingDocs { query: String },
    /// About to query the code repository.
    SearchingCode { repo: String, query: String },
    /// About to hand both retrieval results to the completion service.
    Reasoning { model: String },
}

/// Reports agent progress. Implementations write to stderr.
pub trait SearchProgressReporter: Send + Sync {
    fn report(&self, event: SearchProgressEvent);
}

/// Human-friendly progress lines on stderr.
pub struct StderrProgress;

impl SearchProgressReporter for StderrProgress {
    fn report(&self, event: SearchProgressEvent) {
        let line = match &event {
            SearchProgressEvent::SearchingDocs { query } => {
                format!("🤖 Searching Notion for docs: '{}'...\n", query)
            }
            SearchProgressEvent::SearchingCode { repo, query } => {
                format!("🤖 Searching Git repo {} for code: '{}'...\n", repo, query)
            }
            SearchProgressEvent::Reasoning { model } => {
                format!("🧠 Sending data to {} for contextual reasoning...\n", model)
            }
        };
        let _ = std::io::stderr().lock().write_all(line.as_bytes());
        let _ = std::io::stderr().lock().flush();
    }
}

/// No-op reporter when progress is disabled.
pub struct NoProgress;

impl SearchProgressReporter for NoProgress {
    fn report(&self, _event: SearchProgressEvent) {}
}

/// Progress mode for the CLI: off or human (stderr).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ProgressMode {
    Off,
    Human,
}

impl ProgressMode {
    /// Default: human progress when stderr is a TTY, otherwise off.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            ProgressMode::Human
        } else {
            ProgressMode::Off
        }
    }

    /// Build a reporter for this mode.
    pub fn reporter(&self) -> Box<dyn SearchProgressReporter> {
        match self {
            ProgressMode::Off => Box::new(NoProgress),
            ProgressMode::Human => Box::new(StderrProgress),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_progress_is_silent() {
        // Must not panic or write anywhere observable.
        NoProgress.report(SearchProgressEvent::SearchingDocs {
            query: "payment".to_string(),
        });
        NoProgress.report(SearchProgressEvent::Reasoning {
            model: "gpt-4o-mini".to_string(),
        });
    }

    #[test]
    fn modes_build_reporters() {
        let _ = ProgressMode::Off.reporter();
        let _ = ProgressMode::Human.reporter();
    }
}
