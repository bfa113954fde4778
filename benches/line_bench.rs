//! Benchmarks for linemill.
//!
//! Run with:
//!     cargo bench

use std::io::Write;
use std::sync::Arc;

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use linemill::{BufferPool, LineReader, PoolConfig, PooledLineWriter, ReadStrategy};

/// Writes `size` bytes of CSV-like rows to a temp file.
fn sample_file(size: usize) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let mut written = 0;
    let mut row = 0u64;
    while written < size {
        let line = format!("{},customer-{},{}.{:02}\n", row, row % 9973, row * 7, row % 100);
        file.write_all(line.as_bytes()).unwrap();
        written += line.len();
        row += 1;
    }
    file.flush().unwrap();
    file
}

fn bench_readers(c: &mut Criterion) {
    let mut group = c.benchmark_group("readers");

    for size in [1024 * 1024, 16 * 1024 * 1024] {
        let file = sample_file(size);
        group.throughput(Throughput::Bytes(size as u64));

        let mut strategies = vec![
            ("mmap_64k", ReadStrategy::windowed_mmap().with_size(64 * 1024)),
            ("mmap_8m", ReadStrategy::windowed_mmap()),
        ];
        if cfg!(all(unix, feature = "pipe-transfer")) {
            strategies.push(("pipe_64k", ReadStrategy::pipe_transfer().with_size(64 * 1024)));
            strategies.push(("pipe_4m", ReadStrategy::pipe_transfer()));
        }

        for (name, strategy) in strategies {
            group.bench_function(format!("{}_{}mb", name, size / (1024 * 1024)), |b| {
                b.iter(|| {
                    let reader = LineReader::open(file.path(), strategy).unwrap();
                    let mut count = 0usize;
                    for line in reader {
                        count += black_box(line.unwrap()).len();
                    }
                    black_box(count)
                });
            });
        }
    }

    group.finish();
}

fn bench_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("writer");
    let lines: Vec<String> = (0..100_000).map(|i| format!("{},ROW-{}", i, i % 977)).collect();
    let bytes: usize = lines.iter().map(|l| l.len() + 1).sum();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    group.throughput(Throughput::Bytes(bytes as u64));
    for buffer_size in [64 * 1024, 1024 * 1024] {
        let pool = Arc::new(BufferPool::new(PoolConfig::new(8, buffer_size).unwrap()).unwrap());
        pool.preallocate();

        group.bench_function(format!("pooled_{}k", buffer_size / 1024), |b| {
            b.iter(|| {
                let mut writer = PooledLineWriter::open(&path, Arc::clone(&pool)).unwrap();
                for chunk in lines.chunks(200) {
                    writer.write(black_box(chunk)).unwrap();
                }
                writer.close().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_readers, bench_writer);
criterion_main!(benches);
