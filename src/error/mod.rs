//! Error types for linemill.

use std::fmt;

/// Errors that can occur while reading, writing or configuring line I/O.
#[derive(Debug)]
pub enum LineError {
    /// An I/O error occurred while opening, mapping, reading or writing a file.
    Io(std::io::Error),

    /// The background transfer feeding a pipe reader failed before the whole
    /// file was pushed.
    Transfer(std::io::Error),

    /// A line was not valid UTF-8.
    InvalidUtf8 {
        /// 1-based number of the offending line.
        line: u64,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A request descriptor could not be parsed.
    InvalidRequest {
        /// Description of what was wrong with the descriptor.
        message: String,
    },

    /// Header content does not fit into the reserved header space.
    HeaderTooLarge {
        /// The encoded header size.
        actual: usize,
        /// The reserved space.
        reserved: usize,
    },
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineError::Io(e) => write!(f, "io error: {}", e),
            LineError::Transfer(e) => write!(f, "pipe transfer failed: {}", e),
            LineError::InvalidUtf8 { line } => {
                write!(f, "line {} is not valid utf-8", line)
            }
            LineError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            LineError::InvalidRequest { message } => {
                write!(f, "invalid request: {}", message)
            }
            LineError::HeaderTooLarge { actual, reserved } => {
                write!(
                    f,
                    "header too large: {} bytes (reserved {})",
                    actual, reserved
                )
            }
        }
    }
}

impl std::error::Error for LineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LineError::Io(e) | LineError::Transfer(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for LineError {
    fn from(e: std::io::Error) -> Self {
        LineError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: LineError = io_err.into();
        assert!(matches!(err, LineError::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_display() {
        let err = LineError::HeaderTooLarge {
            actual: 300,
            reserved: 256,
        };
        assert!(err.to_string().contains("header too large"));

        let err = LineError::InvalidUtf8 { line: 7 };
        assert_eq!(err.to_string(), "line 7 is not valid utf-8");
    }

    #[test]
    fn test_transfer_keeps_source() {
        let err = LineError::Transfer(std::io::Error::other("broken"));
        assert!(err.to_string().starts_with("pipe transfer failed"));
        assert!(err.source().is_some());
    }
}
