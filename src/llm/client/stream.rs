//! Server-sent event decoding for streamed chat completions.
//!
//! A streamed response is a sequence of `data: {json}` events terminated by
//! `data: [DONE]`. Each JSON chunk carries a delta on either the
//! `reasoning_content` channel or the `content` channel.

use std::io::Write;

use serde::Deserialize;

use super::LlmError;

/// Whether reasoning fragments are echoed live while a stream is drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReasoningEcho {
    /// Reasoning is discarded silently.
    #[default]
    Off,
    /// Reasoning and answer are written to stderr as they arrive.
    Stderr,
}

/// One decoded piece of a streamed answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFragment {
    /// Intermediate model deliberation; never part of the returned answer.
    Reasoning(String),
    /// Part of the actual answer.
    Content(String),
}

/// A complete event pulled out of the byte stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    Done,
}

/// Incremental SSE line decoder.
///
/// Network chunks may split lines (and UTF-8 sequences) anywhere, so bytes are
/// buffered until a full line is available.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data_lines: Vec<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, returning every event completed by them.
    ///
    /// Nothing is emitted after [`SseEvent::Done`].
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            self.handle_line(line, &mut events);
            if self.done {
                self.buffer.clear();
                break;
            }
        }

        events
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&rest);
            let line = line.strip_suffix('\r').unwrap_or(&line);
            self.handle_line(line, &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<SseEvent>) {
        if line.is_empty() {
            self.dispatch(events);
            return;
        }
        // Comments (keep-alives) start with a colon
        if line.starts_with(':') {
            return;
        }
        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            self.data_lines.push(value.to_string());
        }
    }

    fn dispatch(&mut self, events: &mut Vec<SseEvent>) {
        if self.data_lines.is_empty() {
            return;
        }
        let payload = self.data_lines.join("\n");
        self.data_lines.clear();
        if payload.trim() == "[DONE]" {
            self.done = true;
            self.data_lines.clear();
            events.push(SseEvent::Done);
        } else {
            events.push(SseEvent::Data(payload));
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    reasoning_content: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChunkError {
    message: String,
}

/// Decode the fragments carried by one `data:` payload.
pub fn parse_chunk(payload: &str) -> Result<Vec<StreamFragment>, LlmError> {
    let chunk: ChunkResponse =
        serde_json::from_str(payload).map_err(|e| LlmError::Parse(e.to_string()))?;

    if let Some(error) = chunk.error {
        return Err(LlmError::Stream(error.message));
    }

    let mut fragments = Vec::new();
    for choice in chunk.choices {
        if let Some(text) = choice.delta.reasoning_content.filter(|t| !t.is_empty()) {
            fragments.push(StreamFragment::Reasoning(text));
        }
        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
            fragments.push(StreamFragment::Content(text));
        }
    }
    Ok(fragments)
}

/// Collects content fragments in arrival order.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    content: String,
    echo: ReasoningEcho,
    reasoning_started: bool,
    answer_started: bool,
}

impl StreamAccumulator {
    pub fn new(echo: ReasoningEcho) -> Self {
        Self {
            echo,
            ..Self::default()
        }
    }

    pub fn push(&mut self, fragment: StreamFragment) {
        match fragment {
            StreamFragment::Reasoning(text) => {
                if self.echo == ReasoningEcho::Stderr {
                    if !self.reasoning_started {
                        self.reasoning_started = true;
                        echo_stderr("【思考过程】：\n");
                    }
                    echo_stderr(&text);
                }
            }
            StreamFragment::Content(text) => {
                if self.echo == ReasoningEcho::Stderr {
                    if !self.answer_started {
                        self.answer_started = true;
                        echo_stderr("\n【输出】：\n");
                    }
                    echo_stderr(&text);
                }
                self.content.push_str(&text);
            }
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        if self.echo == ReasoningEcho::Stderr && (self.reasoning_started || self.answer_started) {
            echo_stderr("\n");
        }
        self.content
    }
}

fn echo_stderr(text: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = stderr.write_all(text.as_bytes());
    let _ = stderr.flush();
}
