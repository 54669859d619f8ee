//! Port for structured stream lifecycle logging.
//!
//! Defines the [`ConversationLogger`] trait for recording stream events
//! (`stream_started`, `stream_finished`) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures one
//! machine-readable record per lifecycle event. Message content is never
//! part of a record.

use serde_json::Value;

/// A structured lifecycle event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "stream_started", "stream_finished").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging lifecycle events to a structured log.
///
/// The `log` method is synchronous and non-fallible; logging failures are
/// ignored so they never disturb a running stream.
pub trait ConversationLogger: Send + Sync {
    /// Record an event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
