//! SSE line framing and `data:` decoding

use tracing::trace;

use super::types::{Event, StreamError, StreamResult};

/// Prefix of the lines that carry an event
pub const DATA_MARKER: &str = "data:";

/// Longest line kept in memory; longer lines are reported and skipped
pub const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Splits a byte stream into text lines
///
/// Lines end in `\n` or `\r\n`; bytes after the last newline are kept until the
/// next `feed` or handed out by [`LineDecoder::finish`].
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Buffer for incomplete lines
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    /// Dropping the rest of an overlong line
    discarding: bool,
}

impl LineDecoder {
    /// Create a new line decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the decoder and extract any complete lines
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamResult<String>> {
        let mut lines = Vec::new();

        self.buffer.extend_from_slice(bytes);

        let mut start = 0;
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') {
            let end = self.scanned + offset;
            if self.discarding {
                self.discarding = false;
            } else {
                lines.push(Self::decode(&self.buffer[start..end]));
            }
            start = end + 1;
            self.scanned = start;
        }

        self.buffer.drain(..start);
        self.scanned = self.buffer.len();

        if self.discarding || self.buffer.len() > MAX_LINE_LENGTH {
            if !self.discarding {
                lines.push(Err(StreamError::Parse(format!(
                    "SSE line longer than {} bytes",
                    MAX_LINE_LENGTH
                ))));
                self.discarding = true;
            }
            self.buffer.clear();
            self.scanned = 0;
        }

        lines
    }

    /// Flush a trailing line that was not newline-terminated
    pub fn finish(&mut self) -> Option<StreamResult<String>> {
        let buffer = std::mem::take(&mut self.buffer);
        self.scanned = 0;
        if std::mem::take(&mut self.discarding) || buffer.is_empty() {
            None
        } else {
            Some(Self::decode(&buffer))
        }
    }

    fn decode(line: &[u8]) -> StreamResult<String> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        std::str::from_utf8(line)
            .map(str::to_owned)
            .map_err(|_| StreamError::Parse("Invalid UTF-8 in SSE line".into()))
    }
}

/// Body of a `data:` line, without the marker and its optional single space
///
/// Returns `None` for every other line (comments, `event:`, `id:`, blank
/// separators).
pub fn data_field(line: &str) -> Option<&str> {
    let rest = line.strip_prefix(DATA_MARKER)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// Decode one raw line into an [`Event`]
///
/// `None` means the line carries no event and should be skipped, which
/// includes a `data:` line with an empty body.
pub fn decode_line(line: &str) -> Option<StreamResult<Event>> {
    let Some(data) = data_field(line) else {
        trace!("Ignoring non-data SSE line");
        return None;
    };
    if data.trim().is_empty() {
        trace!("Ignoring empty data line");
        return None;
    }

    Some(serde_json::from_str::<Event>(data).map_err(|e| {
        let preview = if data.chars().count() > 100 {
            format!("{}...", data.chars().take(100).collect::<String>())
        } else {
            data.to_string()
        };
        StreamError::Parse(format!(
            "Failed to parse event JSON: {} (data: {})",
            e, preview
        ))
    }))
}
