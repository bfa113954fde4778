//! Thin wrappers over pipe(2) and splice(2).

use std::fs::File;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

/// Upper bound for growing the pipe buffer; the default unprivileged
/// `/proc/sys/fs/pipe-max-size`.
#[cfg(target_os = "linux")]
const MAX_PIPE_CAPACITY: usize = 1024 * 1024;

/// Creates a close-on-exec pipe and returns `(read_end, write_end)`.
pub(crate) fn pipe() -> io::Result<(File, File)> {
    let mut fds: [libc::c_int; 2] = [-1; 2];

    #[cfg(target_os = "linux")]
    let ret = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_CLOEXEC) };
    #[cfg(not(target_os = "linux"))]
    let ret = unsafe { libc::pipe(fds.as_mut_ptr()) };

    if ret == -1 {
        return Err(io::Error::last_os_error());
    }

    // SAFETY: both descriptors were just returned by the kernel and are owned
    // by nothing else.
    let (read_end, write_end) =
        unsafe { (OwnedFd::from_raw_fd(fds[0]), OwnedFd::from_raw_fd(fds[1])) };

    #[cfg(not(target_os = "linux"))]
    for fd in [&read_end, &write_end] {
        // SAFETY: fd is a valid open descriptor owned above.
        if unsafe { libc::fcntl(fd.as_raw_fd(), libc::F_SETFD, libc::FD_CLOEXEC) } == -1 {
            return Err(io::Error::last_os_error());
        }
    }

    Ok((File::from(read_end), File::from(write_end)))
}

/// Asks the kernel for a pipe buffer of roughly `size` bytes.
///
/// Best-effort: the kernel may round, cap or refuse the request.
#[cfg(target_os = "linux")]
pub(crate) fn grow_pipe(pipe: &File, size: usize) {
    let size = size.min(MAX_PIPE_CAPACITY) as libc::c_int;
    // SAFETY: fcntl on a valid descriptor with an integer argument.
    if unsafe { libc::fcntl(pipe.as_raw_fd(), libc::F_SETPIPE_SZ, size) } == -1 {
        tracing::debug!(
            size,
            error = %io::Error::last_os_error(),
            "could not grow pipe buffer"
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn grow_pipe(_pipe: &File, _size: usize) {}

/// Blocks `SIGPIPE` for the calling thread only.
///
/// A write to a pipe whose read end is closed then fails with `EPIPE` instead
/// of raising a signal, whatever disposition the host process installed.
pub(crate) fn block_sigpipe() -> io::Result<()> {
    // SAFETY: the set is initialised by sigemptyset before use and both
    // pointers are valid for the duration of the calls.
    let ret = unsafe {
        let mut set: libc::sigset_t = std::mem::zeroed();
        libc::sigemptyset(&mut set);
        libc::sigaddset(&mut set, libc::SIGPIPE);
        libc::pthread_sigmask(libc::SIG_BLOCK, &set, std::ptr::null_mut())
    };
    if ret != 0 {
        return Err(io::Error::from_raw_os_error(ret));
    }
    Ok(())
}

/// Outcome of one splice attempt.
#[cfg(target_os = "linux")]
pub(crate) enum Spliced {
    /// Bytes moved; zero means end of input.
    Moved(usize),
    /// The source file system cannot splice; use a copying fallback.
    Unsupported,
}

/// Moves up to `len` bytes from `file` at `offset` into the pipe `sink`
/// without copying through user space. Retries on `EINTR`.
#[cfg(target_os = "linux")]
pub(crate) fn splice_to_pipe(
    file: &File,
    offset: u64,
    sink: &File,
    len: usize,
) -> io::Result<Spliced> {
    let mut off_in = offset as libc::loff_t;
    loop {
        // SAFETY: both descriptors are open for the duration of the call and
        // off_in outlives it. The output offset must be null for a pipe.
        let ret = unsafe {
            libc::splice(
                file.as_raw_fd(),
                &mut off_in,
                sink.as_raw_fd(),
                std::ptr::null_mut(),
                len,
                libc::SPLICE_F_MOVE | libc::SPLICE_F_MORE,
            )
        };

        if ret >= 0 {
            return Ok(Spliced::Moved(ret as usize));
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(libc::EINVAL) | Some(libc::ENOSYS) => return Ok(Spliced::Unsupported),
            _ => return Err(err),
        }
    }
}
