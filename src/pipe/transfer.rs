//! Background producer pushing a file into a pipe.

use std::fs::File;
use std::io::{self, Write};
use std::os::unix::fs::FileExt;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

/// Name of the producer thread.
const THREAD_NAME: &str = "pipe-transfer";

/// Spawns the producer thread.
///
/// The thread moves `file` into `sink` at most `chunk_size` bytes per call
/// until the file size recorded at start has been pushed or a transfer moves
/// zero bytes. `sink` is dropped when the thread finishes, on every path, so
/// the reading side always observes end of stream. The thread yields the
/// number of bytes pushed, or the error that stopped it.
pub(crate) fn spawn(
    file: File,
    sink: File,
    chunk_size: usize,
) -> io::Result<JoinHandle<io::Result<u64>>> {
    thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || {
            if let Err(err) = super::sys::block_sigpipe() {
                warn!(error = %err, "could not block SIGPIPE on producer");
            }
            let result = Transfer::new(&file, &sink, chunk_size).run();
            drop(sink);

            match &result {
                Ok(pushed) => debug!(pushed, "pipe transfer complete"),
                Err(err) => warn!(error = %err, "pipe transfer stopped"),
            }
            result
        })
}

/// How bytes get from the file into the pipe.
enum Mode {
    /// splice(2): the kernel moves pages, no user-space copy.
    #[cfg(target_os = "linux")]
    Splice,
    /// Positional read into a scratch buffer, then write.
    Copy(Vec<u8>),
}

struct Transfer<'a> {
    file: &'a File,
    sink: &'a File,
    chunk_size: usize,
    mode: Mode,
}

impl<'a> Transfer<'a> {
    fn new(file: &'a File, sink: &'a File, chunk_size: usize) -> Self {
        #[cfg(target_os = "linux")]
        let mode = Mode::Splice;
        #[cfg(not(target_os = "linux"))]
        let mode = Mode::Copy(Vec::new());

        Self {
            file,
            sink,
            chunk_size,
            mode,
        }
    }

    fn run(mut self) -> io::Result<u64> {
        let size = self.file.metadata()?.len();
        let mut position = 0u64;

        while position < size {
            let len = (size - position).min(self.chunk_size as u64) as usize;
            let moved = self.step(position, len)?;
            if moved == 0 {
                // The file shrank under us; what was pushed is all there is.
                break;
            }
            position += moved as u64;
        }
        Ok(position)
    }

    fn step(&mut self, position: u64, len: usize) -> io::Result<usize> {
        match self.mode {
            #[cfg(target_os = "linux")]
            Mode::Splice => match super::sys::splice_to_pipe(self.file, position, self.sink, len)? {
                super::sys::Spliced::Moved(n) => Ok(n),
                super::sys::Spliced::Unsupported => {
                    debug!("splice unsupported for this file, falling back to copying");
                    self.mode = Mode::Copy(Vec::new());
                    self.step(position, len)
                }
            },
            Mode::Copy(ref mut scratch) => copy_chunk(self.file, self.sink, scratch, position, len),
        }
    }
}

fn copy_chunk(
    file: &File,
    mut sink: &File,
    scratch: &mut Vec<u8>,
    position: u64,
    len: usize,
) -> io::Result<usize> {
    if scratch.len() < len {
        scratch.resize(len, 0);
    }

    let n = loop {
        match file.read_at(&mut scratch[..len], position) {
            Ok(n) => break n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    };
    sink.write_all(&scratch[..n])?;
    Ok(n)
}
