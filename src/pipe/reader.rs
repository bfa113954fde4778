//! Line reader fed through an OS pipe.
//!
//! A background thread splices the file into the write end of a pipe while
//! the caller reads and splits the other end. The kernel pipe buffer is the
//! only thing the two sides share: the producer blocks while it is full and
//! the reader blocks while it is empty, so memory stays bounded by the pipe
//! capacity plus one read buffer.
//!
//! The producer's outcome is checked once the pipe reports end of stream.
//! If the transfer failed, [`PipeLineReader::next_line`] returns
//! [`LineError::Transfer`] instead of treating the truncated input as
//! complete.
//!
//! Closing the reader while the producer is still running makes the
//! producer's next write fail with `EPIPE`, which ends it. The producer
//! blocks `SIGPIPE` for itself, so this holds even in hosts that restore the
//! default signal disposition.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::thread::JoinHandle;

use tracing::debug;

use super::{sys, transfer};
use crate::error::LineError;
use crate::line::LineAccumulator;

/// Reads lines from a file pushed through a pipe by a background transfer.
///
/// # Example
///
/// ```no_run
/// use linemill::PipeLineReader;
///
/// let mut reader = PipeLineReader::open("data.csv", 4 * 1024 * 1024)?;
/// while let Some(line) = reader.next_line()? {
///     println!("{}", line);
/// }
/// # Ok::<(), linemill::LineError>(())
/// ```
#[derive(Debug)]
pub struct PipeLineReader {
    source: Option<File>,
    producer: Option<JoinHandle<io::Result<u64>>>,
    buffer: Vec<u8>,
    pos: usize,
    filled: usize,
    acc: LineAccumulator,
    finished: bool,
}

impl PipeLineReader {
    /// Opens `path` and starts the background transfer.
    ///
    /// `chunk_size` bounds each transfer call and sizes the read buffer.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidConfig`] if `chunk_size` is zero and
    /// [`LineError::Io`] if the file, pipe or thread cannot be created.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self, LineError> {
        if chunk_size == 0 {
            return Err(LineError::InvalidConfig {
                message: "chunk_size must be non-zero",
            });
        }

        let path = path.as_ref();
        let file = File::open(path)?;
        let (source, sink) = sys::pipe()?;
        sys::grow_pipe(&sink, chunk_size);
        let producer = transfer::spawn(file, sink, chunk_size)?;
        debug!(path = %path.display(), chunk_size, "opened pipe line reader");

        Ok(Self {
            source: Some(source),
            producer: Some(producer),
            buffer: vec![0; chunk_size],
            pos: 0,
            filled: 0,
            acc: LineAccumulator::new(),
            finished: false,
        })
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
            self.shutdown();
        }
        result
    }

    fn read_line(&mut self) -> Result<Option<String>, LineError> {
        loop {
            if self.pos < self.filled {
                let (consumed, complete) = self.acc.feed(&self.buffer[self.pos..self.filled]);
                self.pos += consumed;
                if complete {
                    return self.acc.take_line().map(Some);
                }
            }

            if !self.fill()? {
                self.finished = true;
                self.source = None;
                self.join_producer()?;
                debug!(lines = self.acc.lines(), "pipe line reader reached end of stream");
                return self.acc.finish();
            }
        }
    }

    /// Refills the read buffer. Returns false at end of stream.
    fn fill(&mut self) -> Result<bool, LineError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(false);
        };

        self.pos = 0;
        self.filled = 0;
        loop {
            match source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.filled = n;
                    return Ok(true);
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Waits for the producer and surfaces its failure, if any.
    fn join_producer(&mut self) -> Result<(), LineError> {
        let Some(producer) = self.producer.take() else {
            return Ok(());
        };

        match producer.join() {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(err)) => Err(LineError::Transfer(err)),
            Err(_) => Err(LineError::Transfer(io::Error::other(
                "pipe transfer thread panicked",
            ))),
        }
    }

    /// Closes the read end, then reaps the producer ignoring its outcome.
    fn shutdown(&mut self) {
        self.source = None;
        if let Some(producer) = self.producer.take() {
            let _ = producer.join();
        }
    }

    /// Closes the pipe and the file, stopping the transfer if it is still
    /// running.
    pub fn close(mut self) {
        self.shutdown();
    }
}

impl Iterator for PipeLineReader {
    type Item = Result<String, LineError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl Drop for PipeLineReader {
    fn drop(&mut self) {
        self.shutdown();
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

    #[test]
    fn test_empty_file() {
        let file = file_with(b"");
        let mut reader = PipeLineReader::open(file.path(), 16).unwrap();
        assert!(reader.next_line().unwrap().is_none());
        assert!(reader.next_line().unwrap().is_none());
    }

    #[test]
    fn test_zero_chunk_rejected() {
        let file = file_with(b"x\n");
        assert!(matches!(
            PipeLineReader::open(file.path(), 0),
            Err(LineError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_mixed_line_endings() {
        let file = file_with(b"a,1\nb,2\r\nc,3");
        let lines: Vec<_> = PipeLineReader::open(file.path(), 2)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(lines, vec!["a,1", "b,2", "c,3"]);
    }

    #[test]
    fn test_close_mid_transfer() {
        // Larger than any pipe buffer so the producer is still busy
        let content: Vec<u8> = (0..200_000u32)
            .flat_map(|i| format!("{}\n", i).into_bytes())
            .collect();
        let file = file_with(&content);

        let mut reader = PipeLineReader::open(file.path(), 4096).unwrap();
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("0"));
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("1"));
        reader.close();
    }

    #[test]
    fn test_drop_mid_transfer() {
        let file = file_with(&vec![b'y'; 2 * 1024 * 1024]);
        let mut reader = PipeLineReader::open(file.path(), 1024).unwrap();
        // No newline anywhere: nothing is emitted until the end, so just
        // start the transfer and walk away.
        assert!(reader.fill().unwrap());
        drop(reader);
    }

    #[test]
    fn test_close_mid_transfer_with_default_sigpipe() {
        let content: Vec<u8> = (0..300_000u32)
            .flat_map(|i| format!("{}\n", i).into_bytes())
            .collect();
        let file = file_with(&content);

        // Hosts that restore SIG_DFL would be killed by a thread-directed
        // SIGPIPE from the producer
        let previous = unsafe { libc::signal(libc::SIGPIPE, libc::SIG_DFL) };

        let mut reader = PipeLineReader::open(file.path(), 4096).unwrap();
        assert_eq!(reader.next_line().unwrap().as_deref(), Some("0"));
        reader.close();

        unsafe { libc::signal(libc::SIGPIPE, previous) };
    }

    #[test]
    fn test_producer_failure_surfaces_as_transfer_error() {
        // A directory opens fine but cannot be spliced or read
        let dir = tempfile::tempdir().unwrap();
        let mut reader = PipeLineReader::open(dir.path(), 16).unwrap();

        assert!(matches!(reader.next_line(), Err(LineError::Transfer(_))));
        assert!(reader.next_line().unwrap().is_none());
    }
}
