//! Pipe-mediated zero-copy line reading (unix).
//!
//! - [`PipeLineReader`] - Splices a file into a pipe from a background thread
//!   and splits the other end into lines
//!
//! On Linux the transfer uses splice(2), so file pages reach the pipe without
//! passing through user space. Other unix systems, and file systems that
//! cannot splice, fall back to positional reads.

mod reader;
mod sys;
mod transfer;

pub use reader::PipeLineReader;
