//! Stream session controller.
//!
//! [`StreamSession`] owns the lifecycle of one streamed reply. It drives the
//! domain pipeline (framer → extractor → accumulator) once per received
//! chunk and publishes the growing reply through the [`MessageProjector`].
//!
//! # State machine
//!
//! ```text
//! Idle ─▶ Opening ─▶ Streaming ─┬─▶ Completing ─┐
//!            │                  ├─▶ Cancelling ─┼─▶ Closed
//!            └──────────────────┴─▶ Failing ────┘
//! ```
//!
//! The only suspension points are opening the request and awaiting the next
//! chunk. Cancellation is observed there; a chunk that has already been
//! received is always processed and published before the session closes.

use crate::ports::chat_transport::{ChatStreamRequest, ChatTransport, TransportError};
use crate::ports::message_projector::MessageProjector;
use campus_domain::util::truncate_str;
use campus_domain::{
    Accumulator, Extraction, IgnoreReason, LineFramer, MessageId, StreamFrame, StreamOutcome,
    extract,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Bytes of a dropped payload shown in the debug log.
const DROPPED_PREVIEW_BYTES: usize = 120;

/// Lifecycle state of a [`StreamSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Opening,
    Streaming,
    Completing,
    Cancelling,
    Failing,
    Closed,
}

/// Result of processing one chunk's lines.
enum ChunkStep {
    Continue,
    Sentinel,
}

/// Controller for one streamed reply.
///
/// Exclusively owns the line buffer (inside the framer) and the accumulated
/// reply. The target message id never changes during the session.
pub struct StreamSession {
    message_id: MessageId,
    projector: Arc<dyn MessageProjector>,
    error_label: String,
    framer: LineFramer,
    accumulator: Accumulator,
    state: SessionState,
}

impl StreamSession {
    pub fn new(message_id: MessageId, projector: Arc<dyn MessageProjector>) -> Self {
        Self {
            message_id,
            projector,
            error_label: "System error".to_string(),
            framer: LineFramer::new(),
            accumulator: Accumulator::new(),
            state: SessionState::Idle,
        }
    }

    /// Set the label used in the annotation appended to failed replies.
    pub fn with_error_label(mut self, label: impl Into<String>) -> Self {
        self.error_label = label.into();
        self
    }

    pub fn message_id(&self) -> &MessageId {
        &self.message_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reply text accumulated so far.
    pub fn reply(&self) -> &str {
        self.accumulator.text()
    }

    /// Run the session to completion and return its single outcome.
    ///
    /// The placeholder message must already have been appended to the
    /// projector. A session runs once; calling `run` again returns a
    /// failure without touching the transport.
    pub async fn run(
        &mut self,
        transport: &dyn ChatTransport,
        request: &ChatStreamRequest,
        cancellation: &CancellationToken,
    ) -> StreamOutcome {
        if self.state != SessionState::Idle {
            return StreamOutcome::failed(self.reply(), "stream session already used");
        }

        self.transition(SessionState::Opening);
        let opened = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(TransportError::Cancelled),
            opened = transport.open(request) => opened,
        };
        let mut body = match opened {
            Ok(body) => body,
            Err(error) => return self.finish_with_error(error),
        };

        self.transition(SessionState::Streaming);
        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => Some(Err(TransportError::Cancelled)),
                next = body.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    trace!(bytes = chunk.len(), "Stream chunk received");
                    let frames = self.framer.feed(&chunk);
                    if let ChunkStep::Sentinel = self.consume(&frames) {
                        debug!("Stream: [DONE] sentinel ({} bytes)", self.accumulator.len());
                        let outcome = StreamOutcome::completed(self.reply());
                        return self.finish(outcome);
                    }
                }
                Some(Err(error)) => return self.finish_with_error(error),
                None => {
                    let tail: Vec<StreamFrame> = self.framer.flush().into_iter().collect();
                    self.consume(&tail);
                    debug!("Stream: end of body ({} bytes)", self.accumulator.len());
                    let outcome = StreamOutcome::completed(self.reply());
                    return self.finish(outcome);
                }
            }
        }
    }

    /// Feed complete lines through the extractor into the accumulator.
    ///
    /// Publishes once if the reply grew. Stops at a sentinel; lines after it
    /// are not processed.
    fn consume(&mut self, frames: &[StreamFrame]) -> ChunkStep {
        let before = self.accumulator.len();
        let mut step = ChunkStep::Continue;

        for frame in frames {
            match extract(frame) {
                Extraction::Delta(delta) => {
                    if let Some(dialect) = delta.dialect {
                        trace!(dialect = dialect.as_str(), bytes = delta.text.len(), "Delta");
                    }
                    self.accumulator.apply(&delta);
                }
                Extraction::Sentinel => {
                    step = ChunkStep::Sentinel;
                    break;
                }
                Extraction::Ignore(IgnoreReason::Malformed) => {
                    debug!(
                        payload = truncate_str(frame.trimmed(), DROPPED_PREVIEW_BYTES),
                        "Dropping malformed structured frame"
                    );
                }
                Extraction::Ignore(IgnoreReason::NotData) => {}
            }
        }

        if self.accumulator.len() > before {
            self.projector
                .publish(&self.message_id, self.accumulator.text());
        }
        step
    }

    fn finish_with_error(&mut self, error: TransportError) -> StreamOutcome {
        let outcome = if error.is_cancellation() {
            debug!("Stream cancelled ({} bytes kept)", self.accumulator.len());
            StreamOutcome::cancelled(self.reply())
        } else {
            warn!(
                "Stream failed after {} bytes: {}",
                self.accumulator.len(),
                error
            );
            StreamOutcome::failed(self.reply(), error.to_string())
        };
        self.finish(outcome)
    }

    /// Enter the closing state for `outcome`, publish the permanent content
    /// exactly once, and close.
    fn finish(&mut self, outcome: StreamOutcome) -> StreamOutcome {
        let closing = match outcome {
            StreamOutcome::Completed { .. } => SessionState::Completing,
            StreamOutcome::Cancelled { .. } => SessionState::Cancelling,
            StreamOutcome::Failed { .. } => SessionState::Failing,
        };
        self.transition(closing);
        self.projector
            .publish(&self.message_id, &outcome.final_content(&self.error_label));
        self.transition(SessionState::Closed);
        outcome
    }

    fn transition(&mut self, next: SessionState) {
        debug!(
            message_id = %self.message_id,
            from = ?self.state,
            to = ?next,
            "Stream session transition"
        );
        self.state = next;
    }
}
