//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain/application types where
//! appropriate.

use campus_application::{ActiveStreamPolicy, StreamConfig};
use campus_domain::ModelKey;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("api.base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("api.{0} cannot be 0")]
    InvalidTimeout(&'static str),

    #[error("chat.default_model cannot be empty")]
    EmptyModelName,
}

/// Backend API settings (`[api]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileApiConfig {
    /// Scheme, host and port of the portal backend
    pub base_url: String,
    /// Path of the streaming chat endpoint
    pub stream_path: String,
    /// Timeout for establishing the connection
    pub connect_timeout_seconds: u64,
    /// Upper bound for a whole streamed reply
    pub request_timeout_seconds: u64,
}

impl Default for FileApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            stream_path: "/api/ai/chat/stream".to_string(),
            connect_timeout_seconds: 10,
            // Matches the backend's ten-minute emitter window
            request_timeout_seconds: 600,
        }
    }
}

impl FileApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Chat behavior settings (`[chat]`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileChatConfig {
    /// Model key used when none is given on the command line
    pub default_model: ModelKey,
    /// What to do when sending while a reply is still streaming
    pub active_stream_policy: ActiveStreamPolicy,
    /// Label of the annotation appended to failed replies
    pub error_annotation_label: String,
}

impl Default for FileChatConfig {
    fn default() -> Self {
        Self {
            default_model: ModelKey::default(),
            active_stream_policy: ActiveStreamPolicy::default(),
            error_annotation_label: "System error".to_string(),
        }
    }
}

/// Credential settings (`[auth]`)
///
/// Sources are tried in order: `token`, the `token_env` variable, `token_file`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAuthConfig {
    /// Static bearer token
    pub token: Option<String>,
    /// Environment variable holding the token
    pub token_env: Option<String>,
    /// File whose trimmed contents are the token
    pub token_file: Option<PathBuf>,
}

impl Default for FileAuthConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: Some("CAMPUS_CHAT_TOKEN".to_string()),
            token_file: None,
        }
    }
}

/// Logging settings (`[logging]`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// JSONL file receiving stream lifecycle records
    pub stream_log: Option<PathBuf>,
}

/// Complete configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api: FileApiConfig,
    pub chat: FileChatConfig,
    pub auth: FileAuthConfig,
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Check values serde cannot reject on its own.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigValidationError::EmptyBaseUrl);
        }
        if self.api.connect_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout(
                "connect_timeout_seconds",
            ));
        }
        if self.api.request_timeout_seconds == 0 {
            return Err(ConfigValidationError::InvalidTimeout(
                "request_timeout_seconds",
            ));
        }
        if self.chat.default_model.as_str().trim().is_empty() {
            return Err(ConfigValidationError::EmptyModelName);
        }
        Ok(())
    }

    /// Application-level stream parameters from the `[chat]` section.
    pub fn stream_config(&self) -> StreamConfig {
        StreamConfig::default()
            .with_active_stream_policy(self.chat.active_stream_policy)
            .with_error_label(self.chat.error_annotation_label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.api.stream_path, "/api/ai/chat/stream");
        assert_eq!(config.chat.default_model, ModelKey::QwenPublic);
        assert_eq!(config.chat.active_stream_policy, ActiveStreamPolicy::Reject);
    }

    #[test]
    fn test_parse_full_file() {
        let toml_str = r#"
[api]
base_url = "https://portal.example.edu"
request_timeout_seconds = 120

[chat]
default_model = "deepseek"
active_stream_policy = "cancel_previous"
error_annotation_label = "Error"

[auth]
token_file = "/run/secrets/portal-token"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "https://portal.example.edu");
        assert_eq!(config.api.connect_timeout_seconds, 10);
        assert_eq!(config.api.request_timeout_seconds, 120);
        assert_eq!(config.chat.default_model, ModelKey::Deepseek);
        assert_eq!(
            config.chat.active_stream_policy,
            ActiveStreamPolicy::CancelPrevious
        );
        assert_eq!(
            config.auth.token_file,
            Some(PathBuf::from("/run/secrets/portal-token"))
        );
        // Unset fields in a present section keep their defaults
        assert_eq!(config.auth.token_env.as_deref(), Some("CAMPUS_CHAT_TOKEN"));

        let stream = config.stream_config();
        assert_eq!(stream.active_stream_policy, ActiveStreamPolicy::CancelPrevious);
        assert_eq!(stream.error_label, "Error");
    }

    #[test]
    fn test_custom_model_key_is_kept() {
        let config: FileConfig = toml::from_str("[chat]\ndefault_model = \"glm-4\"\n").unwrap();
        assert_eq!(
            config.chat.default_model,
            ModelKey::Custom("glm-4".to_string())
        );
    }

    #[test]
    fn test_validation_errors() {
        let mut config = FileConfig::default();
        config.api.base_url = " ".to_string();
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyBaseUrl));

        let mut config = FileConfig::default();
        config.api.connect_timeout_seconds = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::InvalidTimeout("connect_timeout_seconds"))
        );

        let mut config = FileConfig::default();
        config.chat.default_model = ModelKey::Custom(String::new());
        assert_eq!(config.validate(), Err(ConfigValidationError::EmptyModelName));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        let result: Result<FileConfig, _> =
            toml::from_str("[chat]\nactive_stream_policy = \"replace\"\n");
        assert!(result.is_err());
    }
}
