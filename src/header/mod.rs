//! Fixed-size header reservation and footer appends.
//!
//! A file is created with [`RESERVED_HEADER_SIZE`] zero bytes at the front so
//! a header can be written later, once its content is known, without moving
//! the body. Footers are appended at the current end of file. Neither
//! operation reads the body.

use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;

use crate::error::LineError;

/// Bytes reserved at the start of the file for the header.
pub const RESERVED_HEADER_SIZE: usize = 256;

/// Creates (or truncates) `path` and reserves the header space.
pub fn create_with_reserved_header(path: impl AsRef<Path>) -> Result<(), LineError> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.set_len(RESERVED_HEADER_SIZE as u64)?;
    Ok(())
}

/// Overwrites the start of `path` with `header`.
///
/// # Errors
///
/// Returns [`LineError::HeaderTooLarge`] without touching the file if the
/// UTF-8 header is longer than [`RESERVED_HEADER_SIZE`].
pub fn write_header(path: impl AsRef<Path>, header: &str) -> Result<(), LineError> {
    let bytes = header.as_bytes();
    if bytes.len() > RESERVED_HEADER_SIZE {
        return Err(LineError::HeaderTooLarge {
            actual: bytes.len(),
            reserved: RESERVED_HEADER_SIZE,
        });
    }

    let mut file = OpenOptions::new().write(true).open(path)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(bytes)?;
    Ok(())
}

/// Appends `footer` at the end of `path`.
pub fn append_footer(path: impl AsRef<Path>, footer: &str) -> Result<(), LineError> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(footer.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_body_footer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.txt");

        create_with_reserved_header(&path).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 256);

        append_footer(&path, "body\n").unwrap();
        write_header(&path, "HEADER\n").unwrap();
        append_footer(&path, "FOOTER\n").unwrap();

        let content = std::fs::read(&path).unwrap();
        assert_eq!(content.len(), 256 + 5 + 7);
        assert!(content.starts_with(b"HEADER\n"));
        assert!(content[7..256].iter().all(|&b| b == 0));
        assert!(content.ends_with(b"body\nFOOTER\n"));
    }

    #[test]
    fn test_oversized_header_rejected_before_io() {
        // The file does not exist; the size check must fire first
        let header = "h".repeat(RESERVED_HEADER_SIZE + 1);
        assert!(matches!(
            write_header("/no/such/dir/file.txt", &header),
            Err(LineError::HeaderTooLarge {
                actual: 257,
                reserved: 256
            })
        ));
    }

    #[test]
    fn test_header_exactly_reserved_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("full.txt");
        create_with_reserved_header(&path).unwrap();

        write_header(&path, &"h".repeat(RESERVED_HEADER_SIZE)).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 256);
    }
}
