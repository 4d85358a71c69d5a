//! Server-sent event framing for streaming completions.

use serde::Deserialize;

/// Reassembles SSE `data:` payloads from raw network chunks.
///
/// Network chunk boundaries do not align with event boundaries, so bytes
/// are buffered until a newline completes the line. A newline byte never
/// occurs inside a multi-byte UTF-8 sequence, so splitting on it is safe.
#[derive(Default)]
pub struct SseLineBuffer {
    /// Bytes received but not yet terminated by a newline.
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds network bytes and returns the `data:` payloads completed by
    /// them, in arrival order.
    ///
    /// Comment lines, event-name lines, and blank keep-alives are dropped.
    /// The `[DONE]` sentinel is returned as an ordinary payload for the
    /// caller to interpret.
    pub fn extend(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);

        let mut payloads = Vec::new();
        while let Some(position) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=position).collect();
            let text = String::from_utf8_lossy(&line);
            let trimmed = text.trim();
            if let Some(payload) = trimmed.strip_prefix("data:") {
                payloads.push(payload.trim_start().to_owned());
            }
        }
        payloads
    }
}

/// One parsed chunk of an OpenAI-compatible streaming completion.
#[derive(Deserialize)]
pub struct StreamChunk {
    /// Generated choices; streaming responses carry at most one.
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

/// Single choice within a streaming chunk.
#[derive(Deserialize)]
struct StreamChoice {
    /// Incremental message payload.
    #[serde(default)]
    delta: StreamDelta,
}

/// Incremental message content.
#[derive(Deserialize, Default)]
struct StreamDelta {
    /// Text fragment appended by this chunk.
    #[serde(default)]
    content: Option<String>,
}

impl StreamChunk {
    /// Extracts the text fragment carried by this chunk, if any.
    ///
    /// Role-only and empty-content chunks yield `None`.
    pub fn delta_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}
