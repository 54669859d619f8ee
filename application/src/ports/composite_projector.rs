//! Composite projector: fans message updates out to several projectors.
//!
//! Used to keep the message store and the console view in step:
//!
//! ```text
//! StreamSession.publish(id, content)
//!              |
//!     +--------+---------+
//!     |                  |
//! InMemoryMessageStore  ConsoleProjector
//! ```

use super::message_projector::MessageProjector;
use campus_domain::{ChatMessage, ConversationId, MessageId};
use std::sync::Arc;

/// A projector that delegates to multiple inner projectors, in order.
pub struct CompositeProjector {
    delegates: Vec<Arc<dyn MessageProjector>>,
}

impl CompositeProjector {
    pub fn new(delegates: Vec<Arc<dyn MessageProjector>>) -> Self {
        Self { delegates }
    }
}

macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl MessageProjector for CompositeProjector {
    fn append(&self, conversation_id: &ConversationId, message: ChatMessage) {
        delegate!(self, append, conversation_id, message.clone());
    }

    fn publish(&self, message_id: &MessageId, content: &str) {
        delegate!(self, publish, message_id, content);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::RecordingProjector;

    #[test]
    fn test_every_delegate_sees_every_update() {
        let first = Arc::new(RecordingProjector::default());
        let second = Arc::new(RecordingProjector::default());
        let composite = CompositeProjector::new(vec![
            first.clone() as Arc<dyn MessageProjector>,
            second.clone(),
        ]);

        let conversation = ConversationId::new("c1").unwrap();
        let id = MessageId::new("a1");
        composite.append(&conversation, ChatMessage::user(id.clone(), "hi"));
        composite.publish(&id, "He");
        composite.publish(&id, "Hey");

        for projector in [&first, &second] {
            assert_eq!(projector.appended().len(), 1);
            assert_eq!(projector.contents(), vec!["He".to_string(), "Hey".to_string()]);
        }
    }
}
