//! Chat message entity

use crate::core::ids::MessageId;
use crate::core::model_key::ModelKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Author of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

/// A message in a conversation (Entity)
///
/// The assistant message for a streamed reply is created with empty content
/// before any network activity and keeps its `id` for the whole stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_tag: Option<ModelKey>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            sender: Sender::User,
            content: content.into(),
            model_tag: None,
            timestamp: Utc::now(),
        }
    }

    /// Create the empty assistant placeholder for a reply stream.
    pub fn assistant_placeholder(id: MessageId, model: ModelKey) -> Self {
        Self {
            id,
            sender: Sender::Assistant,
            content: String::new(),
            model_tag: Some(model),
            timestamp: Utc::now(),
        }
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }
}
