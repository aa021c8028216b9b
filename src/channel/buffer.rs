//! Line framing buffer for child stdout.
//!
//! Output arrives from the pipe in arbitrary chunks; commands and responses
//! are framed by newlines. `LineBuffer` accumulates chunks and hands back
//! exactly one line at a time, holding any unterminated tail until the rest
//! of it arrives.

use bytes::{Buf, BytesMut};
use memchr::memchr;

/// Buffer for accumulating stdout bytes and popping newline-terminated lines.
///
/// Lines are returned with their terminator stripped; both `\n` and `\r\n`
/// endings are handled. Decoding is lossy UTF-8.
#[derive(Debug)]
pub struct LineBuffer {
    /// The accumulated output bytes.
    buffer: BytesMut,
}

impl LineBuffer {
    /// Create a new empty line buffer.
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Extend the buffer with a chunk read from the pipe.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Pop the next complete line, or `None` if no terminator has arrived yet.
    ///
    /// Consumes the line and its terminator from the buffer. `BytesMut::advance`
    /// keeps this an O(1) pointer bump after the newline scan.
    pub fn pop_line(&mut self) -> Option<String> {
        let nl = memchr(b'\n', &self.buffer)?;

        let mut line = self.buffer.split_to(nl);
        self.buffer.advance(1); // the newline itself

        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }

        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Whether a complete line is waiting to be popped.
    pub fn has_line(&self) -> bool {
        memchr(b'\n', &self.buffer).is_some()
    }

    /// Get a reference to the buffered bytes (terminated or not).
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
