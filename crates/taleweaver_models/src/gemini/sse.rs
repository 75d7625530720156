//! Incremental decoder for `alt=sse` response bodies.

/// Splits a byte stream into SSE `data:` payloads.
///
/// Network chunks may end mid-line (inline images are large), so bytes are
/// buffered until a full line is available. Multi-line `data:` fields are
/// joined with newlines and emitted at the blank line ending the event.
///
/// # Examples
///
/// ```
/// use taleweaver_models::gemini::SseDecoder;
///
/// let mut decoder = SseDecoder::default();
/// assert!(decoder.push(b"data: {\"a\":").is_empty());
/// assert_eq!(decoder.push(b"1}\r\n\r\n"), vec!["{\"a\":1}".to_string()]);
/// ```
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    /// Feed bytes; returns every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.take_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Flush whatever remains once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest);
            let line = rest.trim_end_matches(['\n', '\r']);
            if let Some(event) = self.take_line(line) {
                return Some(event);
            }
        }
        self.flush()
    }

    fn take_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.flush();
        }
        if let Some(payload) = line.strip_prefix("data:") {
            self.data.push(payload.trim_start().to_string());
        }
        None
    }

    fn flush(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let event = self.data.join("\n");
        self.data.clear();
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_split_across_many_chunks() {
        let body = b"data: {\"candidates\":[]}\n\ndata: {\"x\":2}\n\n";
        let mut decoder = SseDecoder::default();
        let mut events = Vec::new();
        for byte in body.chunks(3) {
            events.extend(decoder.push(byte));
        }
        assert_eq!(events, vec!["{\"candidates\":[]}", "{\"x\":2}"]);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b": keepalive\nevent: message\ndata: one\n\n");
        assert_eq!(events, vec!["one"]);
    }

    #[test]
    fn test_unterminated_event_flushed_on_finish() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
    }

    #[test]
    fn test_multibyte_text_split_mid_character() {
        let body = "data: \"héllo\"\n\n".as_bytes();
        let (a, b) = body.split_at(9);
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec!["\"héllo\""]);
    }
}
