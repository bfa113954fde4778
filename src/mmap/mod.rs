//! Windowed memory-mapped line reading.
//!
//! - [`MmapLineReader`] - Maps a file one window at a time and splits it into lines

mod reader;
mod window;

pub use reader::MmapLineReader;
