//! Application layer for campus-chat
//!
//! This crate contains the stream session controller, the use case that
//! starts and cancels streams, and the port definitions the infrastructure
//! layer implements. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{ActiveStreamPolicy, StreamConfig};
pub use ports::{
    chat_transport::{ByteStream, ChatStreamRequest, ChatTransport, TransportError},
    composite_projector::CompositeProjector,
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    credential_provider::{CredentialError, CredentialProvider, NoCredentials},
    message_projector::{MessageProjector, NoProjector},
};
pub use use_cases::stream_chat::{
    StartStreamError, StartStreamInput, StreamChatUseCase, StreamHandle,
};
pub use use_cases::stream_session::{SessionState, StreamSession};
