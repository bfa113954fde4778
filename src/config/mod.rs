//! Configuration for line I/O.
//!
//! This module provides the types that size and select the I/O machinery:
//!
//! - [`PoolConfig`] - Number and size of pooled write buffers
//! - [`ReadStrategy`] - Which line reader to use and how large its window/chunk is
//! - [`WriterOptions`] - Behaviour of the pooled line writer on close
//! - [`FileRequest`] - One "rewrite this file" request, parsed from `mode:input:output`
//!
//! # Example
//!
//! ```
//! use linemill::{PoolConfig, ReadStrategy};
//!
//! // Smaller buffers for a memory-constrained host
//! let pool = PoolConfig::new(4, 256 * 1024)?;
//!
//! // Map 1 MiB at a time
//! let strategy = ReadStrategy::windowed_mmap().with_size(1024 * 1024);
//! strategy.validate()?;
//!
//! # Ok::<(), linemill::LineError>(())
//! ```

mod request;

use std::fmt;
use std::str::FromStr;

use crate::error::LineError;

pub use request::FileRequest;

/// Default number of buffers allocated by [`BufferPool::preallocate`](crate::BufferPool::preallocate).
pub const DEFAULT_BUFFER_COUNT: usize = 8;

/// Default size of each pooled buffer (1 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Default mapping window for [`ReadStrategy::WindowedMmap`] (8 MiB).
pub const DEFAULT_WINDOW_SIZE: usize = 8 * 1024 * 1024;

/// Default transfer chunk for [`ReadStrategy::PipeTransfer`] (4 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 4 * 1024 * 1024;

/// Sizing of a [`BufferPool`](crate::BufferPool).
///
/// # Example
///
/// ```
/// use linemill::PoolConfig;
///
/// let config = PoolConfig::default().with_buffer_count(16);
/// assert_eq!(config.buffer_count(), 16);
/// assert_eq!(config.buffer_size(), 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolConfig {
    /// Buffers allocated up front by `preallocate()`.
    buffer_count: usize,

    /// Fixed capacity of every buffer in bytes.
    buffer_size: usize,
}

impl PoolConfig {
    /// Creates a new pool configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidConfig`] if either value is zero.
    pub fn new(buffer_count: usize, buffer_size: usize) -> Result<Self, LineError> {
        if buffer_count == 0 {
            return Err(LineError::InvalidConfig {
                message: "buffer_count must be non-zero",
            });
        }

        if buffer_size == 0 {
            return Err(LineError::InvalidConfig {
                message: "buffer_size must be non-zero",
            });
        }

        Ok(Self {
            buffer_count,
            buffer_size,
        })
    }

    /// Sets the number of preallocated buffers.
    ///
    /// Note: This does not validate the configuration. Use [`PoolConfig::validate`].
    pub fn with_buffer_count(mut self, count: usize) -> Self {
        self.buffer_count = count;
        self
    }

    /// Sets the capacity of each buffer.
    ///
    /// Note: This does not validate the configuration. Use [`PoolConfig::validate`].
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    /// Returns the number of preallocated buffers.
    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    /// Returns the capacity of each buffer.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), LineError> {
        Self::new(self.buffer_count, self.buffer_size).map(|_| ())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_count: DEFAULT_BUFFER_COUNT,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// How an input file is turned into lines.
///
/// Both strategies produce exactly the same line sequence for the same file;
/// the size parameter only changes the memory footprint.
///
/// # Parsing
///
/// `mmap`/`windowed-mmap` and `sendfile`/`pipe-transfer` are accepted
/// (case-insensitive) and yield the default sizes.
///
/// ```
/// use linemill::ReadStrategy;
///
/// let strategy: ReadStrategy = "MMAP".parse()?;
/// assert_eq!(strategy, ReadStrategy::windowed_mmap());
/// # Ok::<(), linemill::LineError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadStrategy {
    /// Map successive windows of the file and scan them in place.
    WindowedMmap {
        /// Bytes mapped at a time.
        window_size: usize,
    },

    /// Splice the file into a pipe from a background thread and read the
    /// other end.
    PipeTransfer {
        /// Bytes moved per transfer call, also the size of the read buffer.
        chunk_size: usize,
    },
}

impl ReadStrategy {
    /// Windowed mmap with the default 8 MiB window.
    pub const fn windowed_mmap() -> Self {
        ReadStrategy::WindowedMmap {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }

    /// Pipe transfer with the default 4 MiB chunk.
    pub const fn pipe_transfer() -> Self {
        ReadStrategy::PipeTransfer {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Replaces the window or chunk size.
    ///
    /// Note: This does not validate the configuration. Use [`ReadStrategy::validate`].
    pub fn with_size(self, size: usize) -> Self {
        match self {
            ReadStrategy::WindowedMmap { .. } => ReadStrategy::WindowedMmap { window_size: size },
            ReadStrategy::PipeTransfer { .. } => ReadStrategy::PipeTransfer { chunk_size: size },
        }
    }

    /// Returns the window or chunk size.
    pub fn size(&self) -> usize {
        match *self {
            ReadStrategy::WindowedMmap { window_size } => window_size,
            ReadStrategy::PipeTransfer { chunk_size } => chunk_size,
        }
    }

    /// Returns the canonical name of the strategy.
    pub fn name(&self) -> &'static str {
        match self {
            ReadStrategy::WindowedMmap { .. } => "windowed-mmap",
            ReadStrategy::PipeTransfer { .. } => "pipe-transfer",
        }
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), LineError> {
        match *self {
            ReadStrategy::WindowedMmap { window_size: 0 } => Err(LineError::InvalidConfig {
                message: "window_size must be non-zero",
            }),
            ReadStrategy::PipeTransfer { chunk_size: 0 } => Err(LineError::InvalidConfig {
                message: "chunk_size must be non-zero",
            }),
            _ => Ok(()),
        }
    }
}

impl Default for ReadStrategy {
    fn default() -> Self {
        Self::windowed_mmap()
    }
}

impl fmt::Display for ReadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.size())
    }
}

impl FromStr for ReadStrategy {
    type Err = LineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mmap" | "windowed-mmap" => Ok(Self::windowed_mmap()),
            "sendfile" | "pipe-transfer" => Ok(Self::pipe_transfer()),
            other => Err(LineError::InvalidRequest {
                message: format!("unknown read strategy `{}`", other),
            }),
        }
    }
}

/// Options for [`PooledLineWriter`](crate::PooledLineWriter).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WriterOptions {
    /// Whether `close()` flushes file data and metadata to disk.
    pub sync_on_close: bool,
}

impl WriterOptions {
    /// Sets whether `close()` calls `sync_all`.
    pub const fn with_sync_on_close(mut self, sync: bool) -> Self {
        self.sync_on_close = sync;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_default() {
        let config = PoolConfig::default();
        assert_eq!(config.buffer_count(), 8);
        assert_eq!(config.buffer_size(), 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_pool_config_invalid_zero() {
        assert!(PoolConfig::new(0, 1024).is_err());
        assert!(PoolConfig::new(8, 0).is_err());
        assert!(PoolConfig::default().with_buffer_size(0).validate().is_err());
    }

    #[test]
    fn test_strategy_defaults() {
        assert_eq!(ReadStrategy::windowed_mmap().size(), 8 * 1024 * 1024);
        assert_eq!(ReadStrategy::pipe_transfer().size(), 4 * 1024 * 1024);
        assert_eq!(ReadStrategy::default(), ReadStrategy::windowed_mmap());
    }

    #[test]
    fn test_strategy_with_size_keeps_variant() {
        let strategy = ReadStrategy::pipe_transfer().with_size(4096);
        assert_eq!(strategy, ReadStrategy::PipeTransfer { chunk_size: 4096 });
        assert_eq!(strategy.to_string(), "pipe-transfer(4096)");
    }

    #[test]
    fn test_strategy_validate_zero() {
        assert!(ReadStrategy::windowed_mmap().with_size(0).validate().is_err());
        assert!(ReadStrategy::pipe_transfer().with_size(0).validate().is_err());
        assert!(ReadStrategy::windowed_mmap().with_size(1).validate().is_ok());
    }

    #[test]
    fn test_strategy_parse() {
        assert_eq!(
            "sendfile".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::pipe_transfer()
        );
        assert_eq!(
            " Windowed-Mmap ".parse::<ReadStrategy>().unwrap(),
            ReadStrategy::windowed_mmap()
        );
        assert!("splice".parse::<ReadStrategy>().is_err());
    }

    #[test]
    fn test_writer_options() {
        assert!(!WriterOptions::default().sync_on_close);
        assert!(WriterOptions::default().with_sync_on_close(true).sync_on_close);
    }
}
