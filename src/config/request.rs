//! File processing requests - one request per input file.

use std::path::PathBuf;

use super::ReadStrategy;
use crate::error::LineError;

/// A request to rewrite one input file into one output file.
///
/// Requests are usually parsed from the descriptor `mode:input:output`,
/// for example `MMAP:/data/in.csv:/data/out.csv`. Only the first two `:`
/// separate fields, so the output path may itself contain colons.
///
/// # Example
///
/// ```
/// use linemill::{FileRequest, ReadStrategy};
///
/// let request = FileRequest::parse("sendfile:/data/in.csv:/data/out.csv")?;
/// assert_eq!(request.strategy, ReadStrategy::pipe_transfer());
/// assert_eq!(request.input.to_str(), Some("/data/in.csv"));
/// # Ok::<(), linemill::LineError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRequest {
    /// How the input is read.
    pub strategy: ReadStrategy,

    /// File to read lines from.
    pub input: PathBuf,

    /// File the transformed lines are written to (created or truncated).
    pub output: PathBuf,
}

impl FileRequest {
    /// Creates a request.
    pub fn new(strategy: ReadStrategy, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            strategy,
            input: input.into(),
            output: output.into(),
        }
    }

    /// Parses a `mode:input:output` descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`LineError::InvalidRequest`] if the descriptor is blank, has
    /// fewer than three fields, names an unknown mode or has an empty path.
    pub fn parse(descriptor: &str) -> Result<Self, LineError> {
        if descriptor.trim().is_empty() {
            return Err(LineError::InvalidRequest {
                message: "request descriptor must not be empty".to_string(),
            });
        }

        let mut parts = descriptor.splitn(3, ':');
        let (Some(mode), Some(input), Some(output)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(LineError::InvalidRequest {
                message: format!(
                    "expected mode:input:output (e.g. MMAP:/data/in.csv:/data/out.csv), got `{}`",
                    descriptor
                ),
            });
        };

        let strategy = mode.parse::<ReadStrategy>()?;
        let (input, output) = (input.trim(), output.trim());
        if input.is_empty() || output.is_empty() {
            return Err(LineError::InvalidRequest {
                message: format!("input and output paths are required, got `{}`", descriptor),
            });
        }

        Ok(Self::new(strategy, input, output))
    }

    /// Parses a list of descriptors, skipping blank entries.
    ///
    /// Fails on the first malformed descriptor.
    pub fn parse_all<I, S>(descriptors: I) -> Result<Vec<Self>, LineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        descriptors
            .into_iter()
            .filter(|d| !d.as_ref().trim().is_empty())
            .map(|d| Self::parse(d.as_ref().trim()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mmap() {
        let request = FileRequest::parse("MMAP:/data/in.csv:/data/out.csv").unwrap();
        assert_eq!(request.strategy, ReadStrategy::windowed_mmap());
        assert_eq!(request.input, PathBuf::from("/data/in.csv"));
        assert_eq!(request.output, PathBuf::from("/data/out.csv"));
    }

    #[test]
    fn test_parse_trims_fields() {
        let request = FileRequest::parse(" sendfile : in.csv : out.csv ").unwrap();
        assert_eq!(request.strategy, ReadStrategy::pipe_transfer());
        assert_eq!(request.input, PathBuf::from("in.csv"));
        assert_eq!(request.output, PathBuf::from("out.csv"));
    }

    #[test]
    fn test_parse_output_may_contain_colon() {
        let request = FileRequest::parse("mmap:in.csv:out:v2.csv").unwrap();
        assert_eq!(request.output, PathBuf::from("out:v2.csv"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(FileRequest::parse("").is_err());
        assert!(FileRequest::parse("   ").is_err());
        assert!(FileRequest::parse("MMAP:/data/in.csv").is_err());
        assert!(FileRequest::parse("COPY:/a:/b").is_err());
        assert!(FileRequest::parse("MMAP: :/b").is_err());
    }

    #[test]
    fn test_parse_all_skips_blank() {
        let requests =
            FileRequest::parse_all(["MMAP:a:b", "", "  ", "sendfile:c:d"]).unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].strategy, ReadStrategy::pipe_transfer());

        assert!(FileRequest::parse_all(["MMAP:a:b", "bogus"]).is_err());
    }
}
