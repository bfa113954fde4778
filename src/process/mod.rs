//! Read → transform → write, one file at a time.
//!
//! - [`LineTransform`] - The per-line hook; [`CleanLine`] is the stock one
//! - [`FileProcessor`] - Drives a reader, a transform and a writer in chunks

mod transform;

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::buffer::BufferPool;
use crate::config::{FileRequest, ReadStrategy};
use crate::error::LineError;
use crate::reader::LineReader;
use crate::writer::PooledLineWriter;

pub use transform::{CleanLine, LineTransform};

/// Default number of lines read before they are handed to the writer.
pub const DEFAULT_COMMIT_INTERVAL: usize = 200;

/// Counters for one processed file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Lines produced by the reader.
    pub lines_read: u64,
    /// Lines handed to the writer.
    pub lines_written: u64,
    /// Lines the transform returned `None` for.
    pub lines_dropped: u64,
    /// Number of writer calls.
    pub chunks: u64,
}

/// Rewrites files line by line through a shared [`BufferPool`].
///
/// Lines are read in chunks of `commit_interval`; each chunk is transformed
/// and passed to a single [`PooledLineWriter::write`] call. Any error aborts
/// the whole file.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use linemill::{BufferPool, CleanLine, FileProcessor, FileRequest};
///
/// let pool = Arc::new(BufferPool::default());
/// pool.preallocate();
///
/// let processor = FileProcessor::new(pool);
/// let request = FileRequest::parse("MMAP:/data/in.csv:/data/out.csv")?;
/// let stats = processor.run(&request, CleanLine)?;
/// println!("{} lines written", stats.lines_written);
/// # Ok::<(), linemill::LineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pool: Arc<BufferPool>,
    commit_interval: usize,
}

impl FileProcessor {
    /// Creates a processor with the default commit interval.
    pub fn new(pool: Arc<BufferPool>) -> Self {
        Self {
            pool,
            commit_interval: DEFAULT_COMMIT_INTERVAL,
        }
    }

    /// Sets how many lines are read per writer call. Zero is treated as one.
    pub fn with_commit_interval(mut self, lines: usize) -> Self {
        self.commit_interval = lines.max(1);
        self
    }

    /// Returns the commit interval.
    pub fn commit_interval(&self) -> usize {
        self.commit_interval
    }

    /// Processes one request.
    pub fn run<T: LineTransform>(
        &self,
        request: &FileRequest,
        transform: T,
    ) -> Result<ProcessStats, LineError> {
        self.process(&request.input, request.strategy, &request.output, transform)
    }

    /// Reads `input` with `strategy`, transforms each line and writes the
    /// survivors to `output`.
    ///
    /// The output file is created even when the input is empty.
    pub fn process<T: LineTransform>(
        &self,
        input: impl AsRef<Path>,
        strategy: ReadStrategy,
        output: impl AsRef<Path>,
        mut transform: T,
    ) -> Result<ProcessStats, LineError> {
        let (input, output) = (input.as_ref(), output.as_ref());
        info!(
            input = %input.display(),
            output = %output.display(),
            strategy = %strategy,
            "processing file"
        );

        let mut reader = LineReader::open(input, strategy)?;
        let mut writer = PooledLineWriter::open(output, Arc::clone(&self.pool))?;
        let mut stats = ProcessStats::default();
        let mut chunk = Vec::with_capacity(self.commit_interval);

        loop {
            let mut exhausted = false;
            while chunk.len() < self.commit_interval {
                let Some(line) = reader.next_line()? else {
                    exhausted = true;
                    break;
                };
                stats.lines_read += 1;
                match transform.apply(line) {
                    Some(line) => chunk.push(line),
                    None => stats.lines_dropped += 1,
                }
            }

            if !chunk.is_empty() {
                writer.write(&chunk)?;
                stats.lines_written += chunk.len() as u64;
                stats.chunks += 1;
                chunk.clear();
            }

            if exhausted {
                break;
            }
        }

        reader.close();
        writer.close()?;
        debug!(?stats, "file processed");
        Ok(stats)
    }
}
