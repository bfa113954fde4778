//! Per-line transformation hook.

/// Maps one input line to zero or one output line.
///
/// Returning `None` drops the line. Implemented for every
/// `FnMut(String) -> Option<String>`, so a closure can be passed directly.
///
/// # Example
///
/// ```
/// use linemill::LineTransform;
///
/// let mut skip_comments = |line: String| (!line.starts_with('#')).then_some(line);
/// assert_eq!(skip_comments.apply("# note".to_string()), None);
/// assert_eq!(skip_comments.apply("a,1".to_string()), Some("a,1".to_string()));
/// ```
pub trait LineTransform {
    /// Transforms one line.
    fn apply(&mut self, line: String) -> Option<String>;
}

impl<F> LineTransform for F
where
    F: FnMut(String) -> Option<String>,
{
    fn apply(&mut self, line: String) -> Option<String> {
        self(line)
    }
}

/// Trims surrounding whitespace and upper-cases the line.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanLine;

impl LineTransform for CleanLine {
    fn apply(&mut self, line: String) -> Option<String> {
        Some(line.trim().to_uppercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_line() {
        assert_eq!(CleanLine.apply("  b,2 \t".to_string()).as_deref(), Some("B,2"));
        assert_eq!(CleanLine.apply(String::new()).as_deref(), Some(""));
    }

    #[test]
    fn test_closure_can_drop() {
        let mut drop_empty = |line: String| (!line.is_empty()).then_some(line);
        assert!(drop_empty.apply(String::new()).is_none());
        assert_eq!(drop_empty.apply("x".into()).as_deref(), Some("x"));
    }
}
