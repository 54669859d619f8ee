//! Stream parameters: use case control.
//!
//! [`StreamConfig`] groups the static parameters that control
//! [`StreamChatUseCase`](crate::use_cases::stream_chat::StreamChatUseCase).

use serde::{Deserialize, Serialize};

/// What to do when a message is sent while the conversation already has a
/// reply streaming.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActiveStreamPolicy {
    /// Refuse the new send before any network activity.
    #[default]
    Reject,
    /// Cancel the running stream, wait for it to close, then start.
    CancelPrevious,
}

impl ActiveStreamPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActiveStreamPolicy::Reject => "reject",
            ActiveStreamPolicy::CancelPrevious => "cancel_previous",
        }
    }
}

impl std::fmt::Display for ActiveStreamPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply stream control parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Behaviour when a conversation already has an active stream.
    pub active_stream_policy: ActiveStreamPolicy,
    /// Label of the annotation appended to a failed reply.
    pub error_label: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            active_stream_policy: ActiveStreamPolicy::default(),
            error_label: "System error".to_string(),
        }
    }
}

impl StreamConfig {
    pub fn with_active_stream_policy(mut self, policy: ActiveStreamPolicy) -> Self {
        self.active_stream_policy = policy;
        self
    }

    pub fn with_error_label(mut self, label: impl Into<String>) -> Self {
        self.error_label = label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_rejects() {
        let config = StreamConfig::default();
        assert_eq!(config.active_stream_policy, ActiveStreamPolicy::Reject);
        assert_eq!(config.error_label, "System error");
    }

    #[test]
    fn test_policy_names_match_config_values() {
        for policy in [ActiveStreamPolicy::Reject, ActiveStreamPolicy::CancelPrevious] {
            let value = serde_json::to_value(policy).unwrap();
            assert_eq!(value, policy.as_str());
            assert_eq!(policy.to_string(), policy.as_str());
        }
        assert!(serde_json::from_str::<ActiveStreamPolicy>("\"cancel-previous\"").is_err());
    }
}
