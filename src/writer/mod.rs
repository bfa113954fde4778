//! Line writer backed by pooled buffers.
//!
//! - [`PooledLineWriter`] - Encodes lines into a borrowed pool buffer and
//!   flushes it to the output file whenever it fills
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use linemill::{BufferPool, PooledLineWriter};
//!
//! let pool = Arc::new(BufferPool::default());
//! pool.preallocate();
//!
//! let mut writer = PooledLineWriter::open("out.csv", Arc::clone(&pool))?;
//! writer.write(["A,1", "B,2"])?;
//! writer.close()?;
//! # Ok::<(), linemill::LineError>(())
//! ```

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::buffer::{BufferPool, PooledBuffer};
use crate::config::WriterOptions;
use crate::error::LineError;

/// Terminator appended to every written line.
#[cfg(windows)]
pub const LINE_SEPARATOR: &str = "\r\n";

/// Terminator appended to every written line.
#[cfg(not(windows))]
pub const LINE_SEPARATOR: &str = "\n";

/// Writes UTF-8 lines to a file through a buffer borrowed from a [`BufferPool`].
///
/// Each [`write`](PooledLineWriter::write) call holds exactly one pool buffer
/// and returns it, empty, before the call ends, whether or not the write
/// succeeded.
#[derive(Debug)]
pub struct PooledLineWriter {
    file: File,
    pool: Arc<BufferPool>,
    options: WriterOptions,
    lines_written: u64,
    bytes_written: u64,
}

impl PooledLineWriter {
    /// Creates or truncates `path` for writing.
    pub fn open(path: impl AsRef<Path>, pool: Arc<BufferPool>) -> Result<Self, LineError> {
        Self::open_with(path, pool, WriterOptions::default())
    }

    /// Creates or truncates `path` for writing with explicit options.
    pub fn open_with(
        path: impl AsRef<Path>,
        pool: Arc<BufferPool>,
        options: WriterOptions,
    ) -> Result<Self, LineError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        debug!(path = %path.display(), "opened pooled line writer");

        Ok(Self {
            file,
            pool,
            options,
            lines_written: 0,
            bytes_written: 0,
        })
    }

    /// Appends `lines`, each followed by [`LINE_SEPARATOR`].
    ///
    /// Lines are packed into one pool buffer which is written out whenever
    /// the next line would not fit, and once more at the end. A line larger
    /// than a whole buffer is written straight to the file after the
    /// buffered lines before it.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::Io`] if writing fails. Lines already flushed stay
    /// in the file; the buffer is returned to the pool regardless.
    pub fn write<I, S>(&mut self, lines: I) -> Result<(), LineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buffer = self.pool.borrow();
        let separator = LINE_SEPARATOR.as_bytes();

        for line in lines {
            let line = line.as_ref().as_bytes();
            let encoded = line.len() + separator.len();

            if buffer.remaining() < encoded {
                self.bytes_written += flush(&mut self.file, &mut buffer)?;

                if buffer.capacity() < encoded {
                    self.file.write_all(line)?;
                    self.file.write_all(separator)?;
                    self.bytes_written += encoded as u64;
                    self.lines_written += 1;
                    continue;
                }
            }

            let fits = buffer.put_slice(line) && buffer.put_slice(separator);
            debug_assert!(fits, "line did not fit after flush");
            self.lines_written += 1;
        }

        self.bytes_written += flush(&mut self.file, &mut buffer)?;
        Ok(())
    }

    /// Lines written so far.
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Bytes written to the file so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Closes the output file, syncing it first if configured to.
    pub fn close(self) -> Result<(), LineError> {
        if self.options.sync_on_close {
            self.file.sync_all()?;
        }
        debug!(
            lines = self.lines_written,
            bytes = self.bytes_written,
            "closed pooled line writer"
        );
        Ok(())
    }
}

/// Writes out everything buffered and clears the buffer.
fn flush(file: &mut File, buffer: &mut PooledBuffer<'_>) -> Result<u64, LineError> {
    if buffer.is_empty() {
        return Ok(0);
    }

    // write_all loops over short writes
    file.write_all(buffer.as_slice())?;
    let flushed = buffer.len() as u64;
    buffer.clear();
    Ok(flushed)
}
