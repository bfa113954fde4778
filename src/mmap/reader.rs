//! Line reader over successive mmap windows.
//!
//! The file is mapped one window at a time. Each window is scanned in place
//! for `\n` boundaries; a line that straddles two windows is carried over in
//! the line accumulator. The previous window is always unmapped before the
//! next one is mapped, so at most `window_size` bytes are mapped at any time
//! however large the file is.
//!
//! # Example
//!
//! ```no_run
//! use linemill::MmapLineReader;
//!
//! let reader = MmapLineReader::open("data.csv", 8 * 1024 * 1024)?;
//! for line in reader {
//!     println!("{}", line?);
//! }
//! # Ok::<(), linemill::LineError>(())
//! ```

use std::fs::File;
use std::path::Path;

use tracing::debug;

use super::window::Window;
use crate::error::LineError;
use crate::line::LineAccumulator;

/// Reads lines from a file through a sliding memory-mapped window.
#[derive(Debug)]
pub struct MmapLineReader {
    file: File,
    file_size: u64,
    file_position: u64,
    window_size: usize,
    window: Option<Window>,
    acc: LineAccumulator,
    finished: bool,
}

impl MmapLineReader {
    /// Opens `path` read-only and maps its first window.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidConfig`] if `window_size` is zero and
    /// [`LineError::Io`] if the file cannot be opened or mapped.
    pub fn open(path: impl AsRef<Path>, window_size: usize) -> Result<Self, LineError> {
        if window_size == 0 {
            return Err(LineError::InvalidConfig {
                message: "window_size must be non-zero",
            });
        }

        let path = path.as_ref();
        let file = File::open(path)?;
        let file_size = file.metadata()?.len();
        debug!(path = %path.display(), file_size, window_size, "opened mmap line reader");

        let mut reader = Self {
            file,
            file_size,
            file_position: 0,
            window_size,
            window: None,
            acc: LineAccumulator::new(),
            finished: false,
        };
        reader.map_next_window()?;
        Ok(reader)
    }

    /// Returns the next line, or `None` at end of input.
    ///
    /// A final line without a trailing `\n` is returned once. After an error
    /// the reader is finished and only returns `None`.
    pub fn next_line(&mut self) -> Result<Option<String>, LineError> {
        if self.finished {
            return Ok(None);
        }

        let result = self.read_line();
        if result.is_err() {
            self.finished = true;
            self.window = None;
        }
        result
    }

    fn read_line(&mut self) -> Result<Option<String>, LineError> {
        loop {
            if let Some(window) = self.window.as_mut() {
                if !window.is_exhausted() {
                    let (consumed, complete) = self.acc.feed(window.remaining());
                    window.advance(consumed);
                    if complete {
                        return self.acc.take_line().map(Some);
                    }
                }
            }

            if self.file_position >= self.file_size {
                self.window = None;
                self.finished = true;
                debug!(lines = self.acc.lines(), "mmap line reader reached end of file");
                return self.acc.finish();
            }

            self.map_next_window()?;
        }
    }

    fn map_next_window(&mut self) -> Result<(), LineError> {
        // Unmap before mapping again so only one window is ever live.
        self.window = None;

        let remaining = self.file_size - self.file_position;
        if remaining == 0 {
            return Ok(());
        }

        let len = remaining.min(self.window_size as u64) as usize;
        self.window = Some(Window::map(&self.file, self.file_position, len)?);
        self.file_position += len as u64;
        Ok(())
    }

    /// Size of the file recorded at open.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// File offset just past the current window; the sum of all window sizes
    /// mapped so far.
    pub fn file_position(&self) -> u64 {
        self.file_position
    }

    /// Bytes currently mapped (zero once the file is exhausted).
    pub fn mapped_len(&self) -> usize {
        self.window.as_ref().map_or(0, Window::len)
    }

    /// Unmaps the current window and closes the file.
    pub fn close(self) {
        drop(self);
    }
}

impl Iterator for MmapLineReader {
    type Item = Result<String, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn file_with(content: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();
        file
    }

    fn read_all(path: &Path, window_size: usize) -> Vec<String> {
        MmapLineReader::open(path, window_size)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_empty_file() {
        let file = file_with(b"");
        let mut reader = MmapLineReader::open(file.path(), 16).unwrap();
        assert_eq!(reader.mapped_len(), 0);
        assert!(reader.next_line().unwrap().is_none());
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn test_zero_window_rejected() {
        let file = file_with(b"x\n");
        assert!(matches!(
            MmapLineReader::open(file.path(), 0),
            Err(LineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            MmapLineReader::open("/definitely/not/here.csv", 16),
            Err(LineError::Io(_))
        ));
    }

    #[test]
    fn test_final_partial_line_once() {
        let file = file_with(b"a,1\nb,2\r\nc,3");
        let mut reader = MmapLineReader::open(file.path(), 4).unwrap();
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().unwrap() {
            lines.push(line);
        }
        assert_eq!(lines, vec!["a,1", "b,2", "c,3"]);
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn test_window_never_exceeds_size() {
        let content: Vec<u8> = (0..1000u32)
            .flat_map(|i| format!("row-{}\n", i).into_bytes())
            .collect();
        let file = file_with(&content);

        let mut reader = MmapLineReader::open(file.path(), 64).unwrap();
        let mut previous_position = 0;
        while reader.next_line().unwrap().is_some() {
            assert!(reader.mapped_len() <= 64);
            assert!(reader.file_position() >= previous_position);
            previous_position = reader.file_position();
        }
        assert_eq!(reader.file_position(), content.len() as u64);
        assert_eq!(reader.mapped_len(), 0);
    }

    #[test]
    fn test_line_spanning_windows() {
        let file = file_with(b"short\na-much-longer-line-than-the-window\nend");
        assert_eq!(
            read_all(file.path(), 3),
            vec!["short", "a-much-longer-line-than-the-window", "end"]
        );
    }

    #[test]
    fn test_invalid_utf8_finishes_reader() {
        let file = file_with(b"ok\n\xff\xfe\nnever\n");
        let mut reader = MmapLineReader::open(file.path(), 8).unwrap();
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("ok"));
        assert!(matches!(
            reader.next_line(),
            Err(LineError::InvalidUtf8 { line: 2 })
        ));
        assert!(reader.next_line().unwrap().is_none());
    }
}
