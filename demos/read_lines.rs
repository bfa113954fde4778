//! Line reading example.
//!
//! Run with:
//!     cargo run --example read_lines -- /path/to/file [mmap|sendfile]

use std::env;

use linemill::{LineReader, ReadStrategy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());
    let strategy: ReadStrategy = env::args()
        .nth(2)
        .as_deref()
        .unwrap_or("mmap")
        .parse()?;

    println!("Reading {} with {}\n", path, strategy);

    let mut total_lines = 0u64;
    let mut total_chars = 0usize;
    let mut longest = 0usize;

    for line in LineReader::open(&path, strategy)? {
        let line = line?;
        total_lines += 1;
        total_chars += line.chars().count();
        longest = longest.max(line.len());

        if total_lines <= 5 {
            println!("{:>6}: {}", total_lines, line);
        }
    }

    println!("\nTotal: {} lines, {} characters", total_lines, total_chars);
    println!("Longest line: {} bytes", longest);

    Ok(())
}
