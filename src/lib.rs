//! linemill
//!
//! Zero-copy line rewriting for large text files.
//!
//! `linemill` reads a line-delimited file, hands each line to a
//! transformation and writes the result, without ever holding the whole file
//! in memory. It provides:
//!
//! - a windowed mmap line reader ([`MmapLineReader`])
//! - a splice-to-pipe line reader fed by a background thread ([`PipeLineReader`], unix)
//! - a shared pool of fixed-size write buffers ([`BufferPool`])
//! - a line writer that packs lines into pooled buffers ([`PooledLineWriter`])
//!
//! Both readers split on `\n`, drop `\r` (so CRLF and LF both work) and emit a
//! final line that lacks a trailing newline. The window or chunk size changes
//! memory use only, never the lines produced.
//!
//! The crate intentionally:
//! - does NOT checkpoint or resume jobs
//! - does NOT validate file contents beyond UTF-8
//! - does NOT distribute work across processes
//!
//! # Reading
//!
//! ```no_run
//! use linemill::{LineError, LineReader, ReadStrategy};
//!
//! fn main() -> Result<(), LineError> {
//!     let reader = LineReader::open("data.csv", ReadStrategy::windowed_mmap())?;
//!     for line in reader {
//!         println!("{}", line?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Rewriting
//!
//! ```no_run
//! use std::sync::Arc;
//! use linemill::{BufferPool, CleanLine, FileProcessor, LineError, ReadStrategy};
//!
//! fn main() -> Result<(), LineError> {
//!     // Once per process: the pool is shared by every writer
//!     let pool = Arc::new(BufferPool::default());
//!     pool.preallocate();
//!
//!     let stats = FileProcessor::new(pool).process(
//!         "in.csv",
//!         ReadStrategy::pipe_transfer(),
//!         "out.csv",
//!         CleanLine,
//!     )?;
//!     println!("{} lines", stats.lines_written);
//!     Ok(())
//! }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]

mod buffer;
mod config;
mod error;
mod line; // internal line accumulator
mod mmap;
mod process;
mod reader;
mod writer;

#[cfg(all(unix, feature = "pipe-transfer"))]
mod pipe;

pub mod header;

//
// Public surface
//

pub use buffer::{BufferPool, PooledBuffer};
pub use config::{
    DEFAULT_BUFFER_COUNT, DEFAULT_BUFFER_SIZE, DEFAULT_CHUNK_SIZE, DEFAULT_WINDOW_SIZE,
    FileRequest, PoolConfig, ReadStrategy, WriterOptions,
};
pub use error::LineError;
pub use mmap::MmapLineReader;
pub use process::{CleanLine, DEFAULT_COMMIT_INTERVAL, FileProcessor, LineTransform, ProcessStats};
pub use reader::LineReader;
pub use writer::{LINE_SEPARATOR, PooledLineWriter};

#[cfg(all(unix, feature = "pipe-transfer"))]
pub use pipe::PipeLineReader;
