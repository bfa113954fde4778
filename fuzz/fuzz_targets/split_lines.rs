#![no_main]

use std::io::Write;

use libfuzzer_sys::fuzz_target;
use linemill::{LineError, LineReader, ReadStrategy};

fn read_all(path: &std::path::Path, strategy: ReadStrategy) -> Result<Vec<String>, String> {
    LineReader::open(path, strategy)
        .map_err(|e| e.to_string())?
        .collect::<Result<Vec<_>, LineError>>()
        .map_err(|e| e.to_string())
}

fuzz_target!(|input: (u8, Vec<u8>)| {
    let (window, data) = input;
    let window = window as usize + 1;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let reference = read_all(file.path(), ReadStrategy::windowed_mmap());

    // Window and chunk size never change the outcome
    let windowed = read_all(file.path(), ReadStrategy::windowed_mmap().with_size(window));
    assert_eq!(windowed, reference);

    let piped = read_all(file.path(), ReadStrategy::pipe_transfer().with_size(window));
    assert_eq!(piped, reference);

    // No line ever contains a delimiter
    if let Ok(lines) = reference {
        assert!(lines.iter().all(|l| !l.contains('\n') && !l.contains('\r')));
    }
});
