//! Use cases for campus-chat.
//!
//! - [`stream_chat`]: start/cancel reply streams, single-active-stream policy
//! - [`stream_session`]: lifecycle of one streamed reply

pub mod stream_chat;
pub mod stream_session;

#[cfg(test)]
pub(crate) mod test_support;
