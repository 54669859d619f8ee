//! Domain layer for campus-chat
//!
//! This crate contains the streaming core's pure logic: byte/line framing,
//! dialect detection, reply accumulation and the chat entities the stream
//! mutates. It performs no I/O.
//!
//! # Core Concepts
//!
//! ## Dialect
//!
//! Model endpoints encode reply fragments differently inside `data:` records.
//! Each line is classified independently by an ordered list of rules, so a
//! single stream may mix representations.
//!
//! ## Outcome
//!
//! Every stream ends in exactly one [`StreamOutcome`]: completed, cancelled
//! (partial text kept) or failed (partial text plus an annotation).

pub mod chat;
pub mod core;
pub mod stream;
pub mod util;

// Re-export commonly used types
pub use chat::message::{ChatMessage, Sender};
pub use self::core::{
    error::DomainError,
    ids::{ConversationId, MessageId},
    model_key::ModelKey,
};
pub use stream::{
    accumulator::Accumulator,
    dialect::{
        DATA_MARKER, DONE_SENTINEL, Delta, Dialect, Extraction, IgnoreReason, decode_payload,
        extract, extract_line,
    },
    framer::{LineFramer, StreamFrame},
    outcome::StreamOutcome,
};
