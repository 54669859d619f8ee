//! Message list kept in process memory, written through the projector port.

use campus_application::MessageProjector;
use campus_domain::{ChatMessage, ConversationId, MessageId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

#[derive(Default)]
struct StoreInner {
    /// Message ids per conversation, in append order
    conversations: HashMap<ConversationId, Vec<MessageId>>,
    messages: HashMap<MessageId, ChatMessage>,
}

/// Ordered message lists for any number of conversations.
///
/// Reads return snapshots; a reply that is still streaming shows whatever
/// was last published for it.
#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Snapshot of a conversation's messages in order.
    pub fn messages(&self, conversation_id: &ConversationId) -> Vec<ChatMessage> {
        let inner = self.lock();
        inner
            .conversations
            .get(conversation_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.messages.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn message(&self, message_id: &MessageId) -> Option<ChatMessage> {
        self.lock().messages.get(message_id).cloned()
    }

    pub fn conversation_count(&self) -> usize {
        self.lock().conversations.len()
    }
}

impl MessageProjector for InMemoryMessageStore {
    fn append(&self, conversation_id: &ConversationId, message: ChatMessage) {
        let mut inner = self.lock();
        let id = message.id.clone();
        if inner.messages.insert(id.clone(), message).is_some() {
            // Re-appending an id replaces its content but keeps its position
            return;
        }
        inner
            .conversations
            .entry(conversation_id.clone())
            .or_default()
            .push(id);
    }

    fn publish(&self, message_id: &MessageId, content: &str) {
        let mut inner = self.lock();
        match inner.messages.get_mut(message_id) {
            Some(message) => {
                if message.content != content {
                    message.content = content.to_string();
                }
            }
            None => debug!("Publish for unknown message {}", message_id),
        }
    }
}
