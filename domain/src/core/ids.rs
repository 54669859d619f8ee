//! Identity value objects for conversations and messages.

use super::error::DomainError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a conversation view (Value Object)
///
/// At most one reply stream may be active per conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    /// Create a conversation id, rejecting blank values.
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidConversationId(id));
        }
        Ok(Self(id))
    }

    /// Fresh id for a conversation started locally.
    pub fn generate() -> Self {
        Self(format!("chat-{}", Utc::now().timestamp_millis()))
    }

    /// Numeric session id when this conversation exists on the backend.
    ///
    /// Locally generated ids (`chat-<millis>`) and free-form names have none.
    pub fn backend_session_id(&self) -> Option<i64> {
        if !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ConversationId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identity of a single chat message.
///
/// Assigned once when the message is created and never changed afterwards;
/// the projector uses it as the key for every update.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
