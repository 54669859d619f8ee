//! Terminal outcome of a reply stream

use serde::{Deserialize, Serialize};

/// How a reply stream ended. Exactly one is produced per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StreamOutcome {
    /// Natural end of stream or the `[DONE]` sentinel.
    Completed { text: String },
    /// Stopped on request; the partial text is kept as-is.
    Cancelled { partial_text: String },
    /// Stopped by a transport error.
    Failed { partial_text: String, reason: String },
}

impl StreamOutcome {
    pub fn completed(text: impl Into<String>) -> Self {
        StreamOutcome::Completed { text: text.into() }
    }

    pub fn cancelled(partial_text: impl Into<String>) -> Self {
        StreamOutcome::Cancelled {
            partial_text: partial_text.into(),
        }
    }

    pub fn failed(partial_text: impl Into<String>, reason: impl Into<String>) -> Self {
        StreamOutcome::Failed {
            partial_text: partial_text.into(),
            reason: reason.into(),
        }
    }

    /// The reply text received, without any error annotation.
    pub fn text(&self) -> &str {
        match self {
            StreamOutcome::Completed { text } => text,
            StreamOutcome::Cancelled { partial_text } => partial_text,
            StreamOutcome::Failed { partial_text, .. } => partial_text,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StreamOutcome::Completed { .. } => "completed",
            StreamOutcome::Cancelled { .. } => "cancelled",
            StreamOutcome::Failed { .. } => "failed",
        }
    }

    /// The permanent message content for this outcome.
    ///
    /// Failures get a delimited annotation so a truncated answer can be told
    /// apart from a complete one: `"<partial>\n\n[<label>: <reason>]"`.
    pub fn final_content(&self, error_label: &str) -> String {
        match self {
            StreamOutcome::Failed {
                partial_text,
                reason,
            } => format!("{partial_text}\n\n[{error_label}: {reason}]"),
            other => other.text().to_string(),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StreamOutcome::Failed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StreamOutcome::Cancelled { .. })
    }
}
