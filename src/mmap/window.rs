//! A single read-only mapping of a file region.

use std::fs::File;
use std::io;

use memmap2::{Mmap, MmapOptions};
use tracing::trace;

/// A mapped `[offset, offset + len)` region of a file with a read cursor.
///
/// Dropping the window unmaps it. The unmap cannot fail from the caller's
/// point of view; the mapping layer ignores `munmap` errors.
#[derive(Debug)]
pub(crate) struct Window {
    map: Mmap,
    offset: u64,
    cursor: usize,
}

impl Window {
    /// Maps `len` bytes of `file` starting at `offset`. `len` must be non-zero.
    pub(crate) fn map(file: &File, offset: u64, len: usize) -> io::Result<Self> {
        // SAFETY: the mapping is read-only and private to this window. Another
        // process truncating the file while it is mapped is outside what the
        // reader can guard against, as with any mmap-based reader.
        let map = unsafe { MmapOptions::new().offset(offset).len(len).map(file)? };

        #[cfg(unix)]
        if let Err(err) = map.advise(memmap2::Advice::Sequential) {
            tracing::warn!(offset, len, error = %err, "madvise(SEQUENTIAL) failed");
        }

        trace!(offset, len, "mapped window");
        Ok(Self {
            map,
            offset,
            cursor: 0,
        })
    }

    /// Bytes not yet consumed.
    pub(crate) fn remaining(&self) -> &[u8] {
        &self.map[self.cursor..]
    }

    pub(crate) fn advance(&mut self, n: usize) {
        debug_assert!(self.cursor + n <= self.map.len());
        self.cursor += n;
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.cursor >= self.map.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        trace!(offset = self.offset, len = self.map.len(), "releasing window");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_map_unaligned_offset() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789abcdef").unwrap();

        let mut window = Window::map(&file, 3, 5).unwrap();
        assert_eq!(window.len(), 5);
        assert_eq!(window.remaining(), b"34567");

        window.advance(2);
        assert_eq!(window.remaining(), b"567");
        assert!(!window.is_exhausted());

        window.advance(3);
        assert!(window.is_exhausted());
        assert!(window.remaining().is_empty());
    }
}
