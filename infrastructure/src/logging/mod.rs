//! Logging infrastructure: structured stream lifecycle logging.
//!
//! Provides [`JsonlStreamLogger`], a JSONL file writer that implements
//! the [`ConversationLogger`](campus_application::ConversationLogger) port.

mod jsonl_stream_logger;

pub use jsonl_stream_logger::JsonlStreamLogger;
