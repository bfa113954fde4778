//! Partial-line state carried across window and chunk boundaries.

use bytes::BytesMut;
use memchr::memchr;

use crate::error::LineError;

/// Initial capacity of the accumulator; grows with the longest line seen.
const INITIAL_CAPACITY: usize = 256;

/// Collects the bytes of the current line between `\n` delimiters.
///
/// `\r` bytes are dropped wherever they occur, which normalises CRLF input
/// to LF. Both line readers feed their raw bytes through this type so that
/// every strategy and every window/chunk size splits a file identically.
#[derive(Debug)]
pub(crate) struct LineAccumulator {
    buf: BytesMut,
    lines: u64,
}

impl LineAccumulator {
    pub(crate) fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            lines: 0,
        }
    }

    /// Consumes `input` up to and including the first `\n`.
    ///
    /// Returns the number of bytes consumed and whether a line was completed.
    /// When no delimiter is present the whole input is consumed.
    pub(crate) fn feed(&mut self, input: &[u8]) -> (usize, bool) {
        match memchr(b'\n', input) {
            Some(pos) => {
                self.append(&input[..pos]);
                (pos + 1, true)
            }
            None => {
                self.append(input);
                (input.len(), false)
            }
        }
    }

    /// Takes the completed line and resets the accumulator.
    pub(crate) fn take_line(&mut self) -> Result<String, LineError> {
        self.lines += 1;
        let line = std::str::from_utf8(&self.buf)
            .map(str::to_owned)
            .map_err(|_| LineError::InvalidUtf8 { line: self.lines });
        self.buf.clear();
        line
    }

    /// Emits whatever is left at end of input, if anything.
    pub(crate) fn finish(&mut self) -> Result<Option<String>, LineError> {
        if self.buf.is_empty() {
            return Ok(None);
        }
        self.take_line().map(Some)
    }

    /// Number of lines emitted so far.
    pub(crate) fn lines(&self) -> u64 {
        self.lines
    }

    fn append(&mut self, mut segment: &[u8]) {
        while let Some(cr) = memchr(b'\r', segment) {
            self.buf.extend_from_slice(&segment[..cr]);
            segment = &segment[cr + 1..];
        }
        self.buf.extend_from_slice(segment);
    }
}

impl Default for LineAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
