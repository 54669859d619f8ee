//! Chat transport port
//!
//! Defines how the application layer opens a streamed chat reply. The
//! transport is responsible for the HTTP exchange only; it hands back the
//! response body as raw byte chunks in arrival order.

use async_trait::async_trait;
use campus_domain::{ConversationId, ModelKey};
use futures::stream::BoxStream;
use std::fmt;
use thiserror::Error;

/// Response body as a sequence of byte chunks.
///
/// Chunk boundaries carry no meaning; they may split lines and characters.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, TransportError>>;

/// Errors that can occur while opening or reading a reply stream
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request cancelled")]
    Cancelled,

    #[error("connection failed (HTTP {status})")]
    Status { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("stream interrupted: {0}")]
    Interrupted(String),
}

impl TransportError {
    /// Whether the caller aborted the request (as opposed to a network or
    /// server failure).
    pub fn is_cancellation(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}

/// One chat request as sent to the backend.
#[derive(Clone)]
pub struct ChatStreamRequest {
    pub conversation_id: ConversationId,
    pub message: String,
    pub model: ModelKey,
    /// Already-resolved bearer token; the transport never looks one up itself.
    pub bearer_token: Option<String>,
}

impl fmt::Debug for ChatStreamRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatStreamRequest")
            .field("conversation_id", &self.conversation_id)
            .field("message", &self.message)
            .field("model", &self.model)
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

/// Transport for streamed chat replies
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Issue the request and return the response body.
    ///
    /// Fails with [`TransportError::Status`] for a non-success status. The
    /// body is only read by polling the returned stream.
    async fn open(&self, request: &ChatStreamRequest) -> Result<ByteStream, TransportError>;
}
