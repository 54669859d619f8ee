//! Ports (interfaces) for external dependencies.
//!
//! - [`chat_transport`]: opening a streamed reply over HTTP
//! - [`composite_projector`]: fanning projector updates out
//! - [`message_projector`]: publishing message content to the UI store
//! - [`credential_provider`]: resolving the bearer token
//! - [`conversation_logger`]: structured stream lifecycle records

pub mod chat_transport;
pub mod composite_projector;
pub mod conversation_logger;
pub mod credential_provider;
pub mod message_projector;
