//! Code span scanning.
//!
//! Code spans have highest precedence among inline elements.
//! Backtick runs must match exactly.

use crate::limits;

/// Outcome of scanning at a backtick run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeSpanScan {
    /// A complete span of `len` bytes with its normalized content.
    Span { len: usize, content: String },
    /// No matching closer: the opening run is literal text.
    Literal { len: usize },
}

/// Remembers which run lengths have no closer left in the current text.
#[derive(Debug, Default)]
pub struct CodeSpanScanner {
    missing: u64,
}

impl CodeSpanScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.missing = 0;
    }

    /// Scan a code span at the start of `rest`, which begins with a backtick.
    pub fn scan(&mut self, rest: &str) -> CodeSpanScan {
        let bytes = rest.as_bytes();
        let run = bytes.iter().take_while(|&&b| b == b'`').count();

        if run > limits::MAX_CODE_SPAN_BACKTICKS || self.missing & (1 << run) != 0 {
            return CodeSpanScan::Literal { len: run };
        }

        let mut pos = run;
        while let Some(offset) = memchr::memchr(b'`', &bytes[pos..]) {
            let start = pos + offset;
            let closer = bytes[start..].iter().take_while(|&&b| b == b'`').count();
            if closer == run {
                return CodeSpanScan::Span {
                    len: start + closer,
                    content: normalize(&rest[run..start]),
                };
            }
            pos = start + closer;
        }

        self.missing |= 1 << run;
        CodeSpanScan::Literal { len: run }
    }
}

/// Line endings become spaces; one surrounding space is stripped when the
/// content is not only spaces.
fn normalize(raw: &str) -> String {
    let content = raw.replace('\n', " ");
    let bytes = content.as_bytes();
    if bytes.len() >= 2
        && bytes[0] == b' '
        && bytes[bytes.len() - 1] == b' '
        && bytes.iter().any(|&b| b != b' ')
    {
        content[1..content.len() - 1].to_string()
    } else {
        content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(text: &str) -> CodeSpanScan {
        CodeSpanScanner::new().scan(text)
    }

    #[test]
    fn test_simple_code_span() {
        assert_eq!(
            scan("`code` after"),
            CodeSpanScan::Span {
                len: 6,
                content: "code".to_string()
            }
        );
    }

    #[test]
    fn test_run_lengths_must_match() {
        assert_eq!(
            scan("``a`b``"),
            CodeSpanScan::Span {
                len: 7,
                content: "a`b".to_string()
            }
        );
        assert_eq!(scan("``a`"), CodeSpanScan::Literal { len: 2 });
    }

    #[test]
    fn test_space_stripping() {
        assert_eq!(normalize(" `` "), "``");
        assert_eq!(normalize("  "), "  ");
        assert_eq!(normalize("a\nb"), "a b");
        assert_eq!(normalize(" a"), " a");
    }

    #[test]
    fn test_missing_closer_is_remembered() {
        let mut scanner = CodeSpanScanner::new();
        assert_eq!(scanner.scan("`a"), CodeSpanScan::Literal { len: 1 });
        // A later run of the same length cannot find a closer either.
        assert_eq!(scanner.scan("`b"), CodeSpanScan::Literal { len: 1 });
        scanner.reset();
        assert!(matches!(scanner.scan("`b`"), CodeSpanScan::Span { .. }));
    }

    #[test]
    fn test_multibyte_content() {
        assert_eq!(
            scan("`かくちょうきのう`》"),
            CodeSpanScan::Span {
                len: "`かくちょうきのう`".len(),
                content: "かくちょうきのう".to_string()
            }
        );
    }
}
