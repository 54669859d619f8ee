//! Reply accumulator

use super::dialect::Delta;

/// The full reply received so far.
///
/// Append-only: text is never trimmed, normalized or removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    text: String,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the new total.
    pub fn apply(&mut self, delta: &Delta) -> &str {
        self.text.push_str(&delta.text);
        &self.text
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
