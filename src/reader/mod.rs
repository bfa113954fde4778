//! Strategy-selected line reading.
//!
//! - [`LineReader`] - One of the line readers, chosen by a [`ReadStrategy`]

use std::path::Path;

use crate::config::ReadStrategy;
use crate::error::LineError;
use crate::mmap::MmapLineReader;

#[cfg(all(unix, feature = "pipe-transfer"))]
use crate::pipe::PipeLineReader;

/// A line reader opened with a [`ReadStrategy`].
///
/// Every variant yields the same lines for the same file.
///
/// # Example
///
/// ```no_run
/// use linemill::{LineReader, ReadStrategy};
///
/// let strategy: ReadStrategy = "sendfile".parse()?;
/// for line in LineReader::open("data.csv", strategy)? {
///     println!("{}", line?);
/// }
/// # Ok::<(), linemill::LineError>(())
/// ```
#[derive(Debug)]
pub enum LineReader {
    /// Windowed mmap reader.
    Mmap(MmapLineReader),

    /// Pipe-transfer reader.
    #[cfg(all(unix, feature = "pipe-transfer"))]
    Pipe(PipeLineReader),
}

impl LineReader {
    /// Opens `path` with the given strategy.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidConfig`] for an invalid size or a strategy
    /// this build does not support, and [`LineError::Io`] if opening fails.
    pub fn open(path: impl AsRef<Path>, strategy: ReadStrategy) -> Result<Self, LineError> {
        strategy.validate()?;

        match strategy {
            ReadStrategy::WindowedMmap { window_size } => {
                MmapLineReader::open(path, window_size).map(LineReader::Mmap)
            }
            #[cfg(all(unix, feature = "pipe-transfer"))]
            ReadStrategy::PipeTransfer { chunk_size } => {
                PipeLineReader::open(path, chunk_size).map(LineReader::Pipe)
            }
            #[cfg(not(all(unix, feature = "pipe-transfer")))]
            ReadStrategy::PipeTransfer { .. } => Err(LineError::InvalidConfig {
                message: "pipe-transfer reading is not available in this build",
            }),
        }
    }

    /// Returns the next line, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<String>, LineError> {
        match self {
            LineReader::Mmap(reader) => reader.next_line(),
            #[cfg(all(unix, feature = "pipe-transfer"))]
            LineReader::Pipe(reader) => reader.next_line(),
        }
    }

    /// Releases the reader's file, mapping or pipe.
    pub fn close(self) {
        match self {
            LineReader::Mmap(reader) => reader.close(),
            #[cfg(all(unix, feature = "pipe-transfer"))]
            LineReader::Pipe(reader) => reader.close(),
        }
    }
}

impl Iterator for LineReader {
    type Item = Result<String, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}
