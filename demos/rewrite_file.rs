//! Rewrites files described by `mode:input:output` requests.
//!
//! Every line is trimmed and upper-cased.
//!
//! Run with:
//!     RUST_LOG=linemill=debug cargo run --example rewrite_file -- MMAP:in.csv:out.csv SENDFILE:a.csv:b.csv

use std::env;
use std::sync::Arc;

use linemill::{BufferPool, CleanLine, FileProcessor, FileRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let requests = FileRequest::parse_all(env::args().skip(1))?;
    if requests.is_empty() {
        eprintln!("usage: rewrite_file MODE:INPUT:OUTPUT [...]");
        return Ok(());
    }

    // One pool for the whole process, filled up front
    let pool = Arc::new(BufferPool::default());
    pool.preallocate();
    let processor = FileProcessor::new(pool);

    for request in &requests {
        let stats = processor.run(request, CleanLine)?;
        println!(
            "{} -> {}: {} read, {} written, {} dropped ({} chunks)",
            request.input.display(),
            request.output.display(),
            stats.lines_read,
            stats.lines_written,
            stats.lines_dropped,
            stats.chunks
        );
    }

    Ok(())
}
