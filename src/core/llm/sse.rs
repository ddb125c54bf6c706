//! Incremental decoder for OpenAI-style server-sent event streams.
//!
//! Only `data:` lines are interpreted. Each JSON event contributes
//! `choices[0].delta.content`; the literal `[DONE]` ends the stream.

use serde::Deserialize;

#[derive(Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Option<StreamDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    content: String,
    done: bool,
    events: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes and return the content deltas completed by them
    ///
    /// Partial lines (including split UTF-8 sequences) are kept until the rest arrives.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut deltas = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();

            if self.done {
                continue;
            }
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim();

            if data == "[DONE]" {
                self.done = true;
                continue;
            }

            let Ok(event) = serde_json::from_str::<StreamEvent>(data) else {
                continue;
            };
            self.events += 1;

            if let Some(choice) = event.choices.first() {
                if let Some(content) = choice.delta.as_ref().and_then(|d| d.content.as_ref()) {
                    if !content.is_empty() {
                        self.content.push_str(content);
                        deltas.push(content.clone());
                    }
                }
                if choice.finish_reason.is_some() {
                    self.done = true;
                }
            }
        }
        deltas
    }

    /// Whether `[DONE]` or a finish reason has been seen
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// All content received so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of JSON events decoded
    pub fn event_count(&self) -> usize {
        self.events
    }
}

/// Decode a complete SSE body into its content deltas
pub fn parse_sse_deltas(body: &str) -> Vec<String> {
    let mut decoder = SseDecoder::new();
    let mut deltas = decoder.push(body.as_bytes());
    if !body.ends_with('\n') {
        deltas.extend(decoder.push(b"\n"));
    }
    deltas
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n\
                        data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n\n\
                        data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n\n\
                        data: [DONE]\n\n";

    #[test]
    fn test_parse_full_body() {
        assert_eq!(parse_sse_deltas(BODY), vec!["Hel", "lo"]);
    }

    #[test]
    fn test_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let bytes = BODY.as_bytes();
        let mut deltas = Vec::new();
        for chunk in bytes.chunks(7) {
            deltas.extend(decoder.push(chunk));
        }
        assert_eq!(deltas, vec!["Hel", "lo"]);
        assert_eq!(decoder.content(), "Hello");
        assert!(decoder.is_done());
        assert_eq!(decoder.event_count(), 3);
    }

    #[test]
    fn test_ignores_after_done_and_noise() {
        let body = ": keep-alive\n\
                    event: message\n\
                    data: not-json\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"a\"},\"finish_reason\":\"stop\"}]}\n\
                    data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n";
        assert_eq!(parse_sse_deltas(body), vec!["a"]);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"你好\"}}]}\n";
        let bytes = body.as_bytes();
        // Split inside the first CJK character
        let split = body.find('你').unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        assert_eq!(decoder.push(&bytes[split..]), vec!["你好"]);
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}";
        assert_eq!(parse_sse_deltas(body), vec!["x"]);
    }
}
