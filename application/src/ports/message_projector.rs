//! Message projector port
//!
//! The projector is the only writer of the externally visible message list.
//! The stream session calls [`MessageProjector::publish`] with the full reply
//! text after every chunk that grew it, and once more with the permanent
//! content when the stream closes.

use campus_domain::{ChatMessage, ConversationId, MessageId};

/// Boundary between the streaming core and the UI message store.
///
/// Methods are synchronous and infallible so that a slow or broken view can
/// never stall the read loop.
pub trait MessageProjector: Send + Sync {
    /// Add a new message to a conversation's list.
    fn append(&self, conversation_id: &ConversationId, message: ChatMessage);

    /// Replace the content of an existing message.
    ///
    /// Called many times per stream with non-shrinking content; `content`
    /// is always the full text, never a fragment.
    fn publish(&self, message_id: &MessageId, content: &str);
}

/// No-op implementation for tests and headless use.
pub struct NoProjector;

impl MessageProjector for NoProjector {
    fn append(&self, _conversation_id: &ConversationId, _message: ChatMessage) {}

    fn publish(&self, _message_id: &MessageId, _content: &str) {}
}
