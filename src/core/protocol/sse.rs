//! Incremental parser for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; the parser buffers partial lines and
//! emits an [`SseEvent`] each time a blank line terminates an event.
//!
//! # Parsing Flow
//!
//! 1. **StartOfStream**: drop a leading UTF-8 byte order mark
//! 2. **ReadingFields**: consume complete lines (`\n`, `\r\n` or `\r`) and
//!    accumulate `data`, `event`, `id` and `retry` fields
//! 3. A blank line dispatches the accumulated event, if it has data
//!
//! # Examples
//!
//! ```
//! use hydra_provider::protocol::SseParser;
//!
//! let mut parser = SseParser::new();
//! assert!(parser.feed(b"data: {\"@id\":").unwrap().is_empty());
//! let events = parser.feed(b"\"/books/1\"}\n\n").unwrap();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].data, r#"{"@id":"/books/1"}"#);
//! ```

use crate::core::error::{ProviderError, Result};
use bytes::{Buf, BytesMut};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A dispatched server-sent event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SseEvent {
    /// Event type, `message` unless the stream named one.
    pub event: String,
    pub data: String,
    pub id: Option<String>,
    pub retry: Option<u64>,
}

impl SseEvent {
    pub fn message(data: impl Into<String>) -> Self {
        SseEvent {
            event: "message".to_string(),
            data: data.into(),
            id: None,
            retry: None,
        }
    }
}

/// Parse state for the event stream parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Nothing consumed yet; a byte order mark may follow
    StartOfStream,
    /// Consuming field lines
    ReadingFields,
    /// A line was not valid UTF-8; the stream is unusable
    Error,
}

/// Server-sent events parser.
#[derive(Debug)]
pub struct SseParser {
    buffer: BytesMut,
    state: ParseState,
    data: String,
    has_data: bool,
    event_type: Option<String>,
    last_event_id: Option<String>,
    retry: Option<u64>,
}

impl SseParser {
    pub fn new() -> Self {
        SseParser {
            buffer: BytesMut::with_capacity(4096),
            state: ParseState::StartOfStream,
            data: String::new(),
            has_data: false,
            event_type: None,
            last_event_id: None,
            retry: None,
        }
    }

    #[inline]
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// Feed bytes, returning every event completed by them.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseEvent>> {
        if self.state == ParseState::Error {
            return Err(ProviderError::SseParse("parser is in error state".into()));
        }
        self.buffer.extend_from_slice(chunk);
        let mut events = Vec::new();

        loop {
            match self.state {
                ParseState::StartOfStream => {
                    if self.buffer.len() < BOM.len() && BOM.starts_with(&self.buffer) {
                        break;
                    }
                    if self.buffer.starts_with(BOM) {
                        self.buffer.advance(BOM.len());
                    }
                    self.state = ParseState::ReadingFields;
                }
                ParseState::ReadingFields => {
                    let Some((line_len, terminator_len)) = self.find_line_end() else {
                        break;
                    };
                    let line = self.buffer.split_to(line_len);
                    self.buffer.advance(terminator_len);

                    let line = match std::str::from_utf8(&line) {
                        Ok(line) => line.to_string(),
                        Err(e) => {
                            self.state = ParseState::Error;
                            return Err(ProviderError::SseParse(format!(
                                "invalid UTF-8 in event stream: {}",
                                e
                            )));
                        }
                    };

                    if line.is_empty() {
                        if let Some(event) = self.dispatch() {
                            events.push(event);
                        }
                    } else {
                        self.process_line(&line);
                    }
                }
                ParseState::Error => break,
            }
        }

        Ok(events)
    }

    /// Returns (line length, terminator length). A trailing lone `\r` is
    /// held back until the next chunk shows whether `\n` follows.
    fn find_line_end(&self) -> Option<(usize, usize)> {
        let pos = self.buffer.iter().position(|&b| b == b'\n' || b == b'\r')?;
        if self.buffer[pos] == b'\n' {
            return Some((pos, 1));
        }
        match self.buffer.get(pos + 1) {
            Some(b'\n') => Some((pos, 2)),
            Some(_) => Some((pos, 1)),
            None => None,
        }
    }

    fn process_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "event" => self.event_type = Some(value.to_string()),
            "id" if !value.contains('\0') => self.last_event_id = Some(value.to_string()),
            "retry" => {
                if let Ok(ms) = value.parse::<u64>() {
                    self.retry = Some(ms);
                }
            }
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        let event_type = self.event_type.take();
        let retry = self.retry.take();
        if !self.has_data {
            return None;
        }
        self.has_data = false;

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        Some(SseEvent {
            event: event_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "message".to_string()),
            data,
            id: self.last_event_id.clone(),
            retry,
        })
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}
