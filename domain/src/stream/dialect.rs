//! Dialect detection and payload extraction for `data:` records.
//!
//! Upstream model endpoints disagree on how an incremental reply fragment is
//! encoded inside a `data:` record. Rather than fixing one dialect per
//! session, every record is run through an ordered list of [`Dialect`] rules
//! and the first one that yields text wins.
//!
//! ```text
//! line ──trim──▶ "data:" marker? ──no──▶ Ignore(NotData)
//!                      │yes
//!                payload == "[DONE]" ──▶ Sentinel
//!                      │
//!                JSON object? ──yes──▶ OpenAiChunk → AnswerEvent → TextResponse → empty delta
//!                      │no
//!                "" ──▶ "\n"   "{..." ──▶ Ignore(Malformed)   other ──▶ PlainText
//! ```

use super::framer::StreamFrame;
use serde_json::{Map, Value};

/// Marker that prefixes every data record.
pub const DATA_MARKER: &str = "data:";

/// Payload that ends the logical stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// A recognised encoding of one reply fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `{"choices":[{"delta":{"content":"..."}}]}`
    OpenAiChunk,
    /// `{"response_type":"answer","content":"..."}`
    AnswerEvent,
    /// `{"textResponse":"..."}`
    TextResponse,
    /// Unstructured text sent directly after the marker.
    PlainText,
}

impl Dialect {
    /// Structured rules in priority order.
    pub const STRUCTURED: [Dialect; 3] = [
        Dialect::OpenAiChunk,
        Dialect::AnswerEvent,
        Dialect::TextResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::OpenAiChunk => "openai_chunk",
            Dialect::AnswerEvent => "answer_event",
            Dialect::TextResponse => "text_response",
            Dialect::PlainText => "plain_text",
        }
    }

    /// Apply this rule to a decoded JSON object.
    ///
    /// Returns `None` unless the rule's field is present and non-empty.
    /// [`Dialect::PlainText`] never matches a structured document.
    pub fn decode(&self, document: &Map<String, Value>) -> Option<String> {
        let text = match self {
            Dialect::OpenAiChunk => document
                .get("choices")
                .and_then(|c| c.as_array())
                .and_then(|choices| choices.first())
                .and_then(|choice| choice.get("delta"))
                .and_then(|delta| delta.get("content"))
                .and_then(|content| content.as_str()),
            Dialect::AnswerEvent => {
                if document.get("response_type").and_then(|t| t.as_str()) == Some("answer") {
                    document.get("content").and_then(|c| c.as_str())
                } else {
                    None
                }
            }
            Dialect::TextResponse => document.get("textResponse").and_then(|t| t.as_str()),
            Dialect::PlainText => None,
        }?;

        (!text.is_empty()).then(|| text.to_string())
    }
}

/// Incremental text contributed by one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta {
    pub text: String,
    /// The rule that produced the text; `None` for a structured record that
    /// matched no rule (heartbeats, metadata).
    pub dialect: Option<Dialect>,
}

impl Delta {
    pub fn new(text: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            text: text.into(),
            dialect: Some(dialect),
        }
    }

    pub fn empty() -> Self {
        Self {
            text: String::new(),
            dialect: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Why a line produced nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The line is not a data record (comments, `event:` lines, blank lines).
    NotData,
    /// The payload looks like a JSON object but does not parse.
    Malformed,
}

/// Result of inspecting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Delta(Delta),
    Sentinel,
    Ignore(IgnoreReason),
}

/// Inspect one framed line.
pub fn extract(frame: &StreamFrame) -> Extraction {
    extract_line(frame.raw())
}

/// Inspect one line of text.
pub fn extract_line(line: &str) -> Extraction {
    match line.trim().strip_prefix(DATA_MARKER) {
        Some(rest) => decode_payload(rest.trim()),
        None => Extraction::Ignore(IgnoreReason::NotData),
    }
}

/// Decode the (already trimmed) payload of a data record.
pub fn decode_payload(payload: &str) -> Extraction {
    if payload == DONE_SENTINEL {
        return Extraction::Sentinel;
    }

    if let Ok(Value::Object(document)) = serde_json::from_str::<Value>(payload) {
        let delta = Dialect::STRUCTURED
            .iter()
            .find_map(|dialect| dialect.decode(&document).map(|text| Delta::new(text, *dialect)))
            .unwrap_or_else(Delta::empty);
        return Extraction::Delta(delta);
    }

    if payload.is_empty() {
        // An empty record is a blank line inside the reply body
        return Extraction::Delta(Delta::new("\n", Dialect::PlainText));
    }
    if payload.starts_with('{') {
        return Extraction::Ignore(IgnoreReason::Malformed);
    }
    Extraction::Delta(Delta::new(payload, Dialect::PlainText))
}
