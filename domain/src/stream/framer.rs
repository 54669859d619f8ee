//! Byte-to-line framing for chunked response bodies.
//!
//! The transport delivers bytes in arbitrary pieces: a chunk may end in the
//! middle of a line or in the middle of a multi-byte UTF-8 character.
//! [`LineFramer`] keeps both kinds of remainder between calls and only ever
//! hands out complete lines.


/// One decoded line of the stream.
///
/// Produced by the framer and consumed immediately by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame {
    raw: String,
}

impl StreamFrame {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The line exactly as decoded, without its terminating `\n`.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The line with surrounding whitespace (including a trailing `\r`) removed.
    pub fn trimmed(&self) -> &str {
        self.raw.trim()
    }
}

/// Incremental UTF-8 decoder and newline splitter.
///
/// Invariant: `buffer` holds exactly the decoded text that has not yet been
/// terminated by a newline, and `pending` holds at most one incomplete
/// UTF-8 sequence.
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
    buffer: String,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completed, in arrival order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<StreamFrame> {
        self.decode(chunk);

        let Some((complete, rest)) = self.buffer.rsplit_once('\n') else {
            return Vec::new();
        };
        let frames = complete.split('\n').map(StreamFrame::new).collect();
        self.buffer = rest.to_string();
        frames
    }

    /// Drain whatever is left at end of stream as one final line.
    ///
    /// Upstreams may omit the newline after their last record. Returns
    /// `None` when nothing but an empty remainder is left.
    pub fn flush(&mut self) -> Option<StreamFrame> {
        if !self.pending.is_empty() {
            // A code point that never completed
            self.pending.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }
        if self.buffer.is_empty() {
            return None;
        }
        Some(StreamFrame::new(std::mem::take(&mut self.buffer)))
    }

    /// Text received so far that is not yet part of a complete line.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut consumed = 0;
        loop {
            let bytes = &self.pending[consumed..];
            match std::str::from_utf8(bytes) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    if let Ok(text) = std::str::from_utf8(&bytes[..valid]) {
                        self.buffer.push_str(text);
                    }
                    consumed += valid;
                    match e.error_len() {
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            consumed += len;
                        }
                        // Incomplete sequence at the end; wait for the next chunk
                        None => break,
                    }
                }
            }
        }
        self.pending.drain(..consumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_all(chunks: &[&[u8]]) -> Vec<String> {
        let mut framer = LineFramer::new();
        let mut lines: Vec<String> = chunks
            .iter()
            .flat_map(|c| framer.feed(c))
            .map(|f| f.raw().to_string())
            .collect();
        lines.extend(framer.flush().map(|f| f.raw().to_string()));
        lines
    }

    const SAMPLE: &str = "data:你好\n\ndata: {\"textResponse\":\"é\"}\ndata:[DONE]";

    #[test]
    fn test_single_chunk() {
        let lines = frame_all(&[SAMPLE.as_bytes()]);
        assert_eq!(
            lines,
            vec!["data:你好", "", "data: {\"textResponse\":\"é\"}", "data:[DONE]"]
        );
    }

    #[test]
    fn test_every_two_way_split_matches_single_chunk() {
        let bytes = SAMPLE.as_bytes();
        let expected = frame_all(&[bytes]);
        for split in 0..=bytes.len() {
            let (a, b) = bytes.split_at(split);
            assert_eq!(frame_all(&[a, b]), expected, "split at byte {split}");
        }
    }

    #[test]
    fn test_byte_at_a_time_matches_single_chunk() {
        let bytes = SAMPLE.as_bytes();
        let chunks: Vec<&[u8]> = bytes.chunks(1).collect();
        assert_eq!(frame_all(&chunks), frame_all(&[bytes]));
    }

    #[test]
    fn test_split_inside_multibyte_character() {
        // '好' is E5 A5 BD
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"data:\xE4\xBD\xA0\xE5").is_empty());
        assert_eq!(framer.buffered(), "data:你");
        let lines = framer.feed(b"\xA5\xBD\n");
        assert_eq!(lines, vec![StreamFrame::new("data:你好")]);
        assert_eq!(framer.buffered(), "");
    }

    #[test]
    fn test_incomplete_line_is_held_back() {
        let mut framer = LineFramer::new();
        assert!(framer.feed(b"data: par").is_empty());
        assert_eq!(framer.buffered(), "data: par");
        let lines = framer.feed(b"tial\ndata: next");
        assert_eq!(lines, vec![StreamFrame::new("data: partial")]);
        assert_eq!(framer.buffered(), "data: next");
    }

    #[test]
    fn test_flush_returns_unterminated_tail_once() {
        let mut framer = LineFramer::new();
        framer.feed(b"data:tail");
        assert_eq!(framer.flush(), Some(StreamFrame::new("data:tail")));
        assert_eq!(framer.flush(), None);
    }

    #[test]
    fn test_flush_after_trailing_newline_is_empty() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed(b"data:x\n").len(), 1);
        assert_eq!(framer.flush(), None);
    }

    #[test]
    fn test_invalid_bytes_become_replacement_characters() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"a\xFFb\n");
        assert_eq!(lines, vec![StreamFrame::new("a\u{FFFD}b")]);
    }

    #[test]
    fn test_valid_text_around_invalid_bytes_is_kept() {
        let chunk = [
            "data: 你".as_bytes(),
            &[0xFE, 0xFF],
            "好\n".as_bytes(),
        ]
        .concat();
        let mut framer = LineFramer::new();
        let lines = framer.feed(&chunk);
        assert_eq!(
            lines,
            vec![StreamFrame::new("data: 你\u{FFFD}\u{FFFD}好")]
        );
    }

    #[test]
    fn test_dangling_partial_code_point_is_not_dropped_on_flush() {
        let mut framer = LineFramer::new();
        framer.feed(b"data:x\xE4\xBD");
        assert_eq!(framer.flush(), Some(StreamFrame::new("data:x\u{FFFD}")));
    }

    #[test]
    fn test_crlf_lines_trim_cleanly() {
        let mut framer = LineFramer::new();
        let lines = framer.feed(b"  data: hi\r\n");
        assert_eq!(lines[0].raw(), "  data: hi\r");
        assert_eq!(lines[0].trimmed(), "data: hi");
    }
}
