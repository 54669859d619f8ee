//! Chat domain.
//!
//! - [`message::ChatMessage`]: a single user or assistant message
//! - [`message::Sender`]: who authored a message

pub mod message;
