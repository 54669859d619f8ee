//! Console output for streamed replies

use campus_application::MessageProjector;
use campus_domain::{ChatMessage, ConversationId, MessageId, ModelKey, StreamOutcome};
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

struct ConsoleState {
    out: Box<dyn Write + Send>,
    /// Bytes already written per assistant message
    printed: HashMap<MessageId, usize>,
}

/// Projector that prints assistant replies to a terminal as they grow.
///
/// Every publish carries the full text; only the part not yet written is
/// printed. User messages are not echoed.
pub struct ConsoleProjector {
    state: Mutex<ConsoleState>,
}

impl ConsoleProjector {
    /// Print to standard output.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            state: Mutex::new(ConsoleState {
                out,
                printed: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConsoleState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Stop tracking a reply and end its line if anything was printed.
    pub fn finish(&self, message_id: &MessageId) {
        let mut state = self.lock();
        if let Some(printed) = state.printed.remove(message_id)
            && printed > 0
        {
            let _ = writeln!(state.out);
            let _ = state.out.flush();
        }
    }
}

impl MessageProjector for ConsoleProjector {
    fn append(&self, _conversation_id: &ConversationId, message: ChatMessage) {
        if message.is_assistant() {
            self.lock().printed.insert(message.id, 0);
        }
    }

    fn publish(&self, message_id: &MessageId, content: &str) {
        let mut state = self.lock();
        let Some(printed) = state.printed.get(message_id).copied() else {
            return;
        };
        let Some(suffix) = content.get(printed..) else {
            return;
        };
        if suffix.is_empty() {
            return;
        }
        let _ = state.out.write_all(suffix.as_bytes());
        let _ = state.out.flush();
        state.printed.insert(message_id.clone(), content.len());
    }
}

/// Formats status lines around streamed replies
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Banner shown when the REPL starts.
    pub fn welcome(conversation_id: &ConversationId, model: &ModelKey) -> String {
        let line = "=".repeat(60);
        format!(
            "{}\n{:^60}\n{}\n{} {}\n{} {}\n",
            line.cyan(),
            "campus-chat".bold(),
            line.cyan(),
            "Conversation:".dimmed(),
            conversation_id,
            "Model:".dimmed(),
            model
        )
    }

    /// Prefix printed before an assistant reply starts streaming.
    pub fn reply_prefix(model: &ModelKey) -> String {
        format!("{} ", format!("[{}]", model).cyan().bold())
    }

    /// One-line note for a cancelled reply.
    ///
    /// Completed replies need none, and a failed reply already ends with its
    /// error annotation in the printed text.
    pub fn outcome_status(outcome: &StreamOutcome) -> Option<String> {
        match outcome {
            StreamOutcome::Completed { .. } | StreamOutcome::Failed { .. } => None,
            StreamOutcome::Cancelled { partial_text } => Some(
                format!("(stopped after {} characters)", partial_text.chars().count())
                    .yellow()
                    .to_string(),
            ),
        }
    }

    pub fn error(message: &str) -> String {
        format!("{} {}", "Error:".red().bold(), message)
    }
}
