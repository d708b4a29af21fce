//! Opener and ruby-text matching.
//!
//! [`RubyScanner`] answers the two questions the inline loop asks: "does
//! base text start here?" and "is there a `》` for this `《`?". Both answers
//! are memoised so a paragraph is scanned in linear time no matter how many
//! markers fail to pair.

use super::kugiri::{SHAPE_RULES, ShapeRule};
use super::ANNOTATION_CLOSE;
use crate::cursor::Cursor;
use crate::trace::trace_log;

/// A shape rule that matched at the cursor.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenerMatch {
    pub rule: &'static ShapeRule,
    /// Byte offset of the `《` that ends the base text.
    pub annotation_at: usize,
}

/// Per-paragraph matching state.
#[derive(Debug, Default)]
pub(crate) struct RubyScanner {
    /// Offsets before which each rule is known not to match.
    blocked_until: [usize; SHAPE_RULES.len()],
    closes: CloseFinder,
}

impl RubyScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything learned about the previous text.
    pub fn reset(&mut self) {
        self.blocked_until = [0; SHAPE_RULES.len()];
        self.closes = CloseFinder::default();
    }

    /// Try the shape rules in priority order at the cursor position.
    pub fn match_opener(&mut self, cursor: &Cursor<'_>) -> Option<OpenerMatch> {
        let pos = cursor.offset();
        let rest = cursor.rest();

        for (i, rule) in SHAPE_RULES.iter().enumerate() {
            if pos < self.blocked_until[i] {
                continue;
            }
            match rule.base_len(rest) {
                Ok(len) => {
                    let annotation_at = pos + len;
                    if self.close_after(cursor.input(), annotation_at).is_some() {
                        trace_log!("ruby: {} opener at {}", rule.name, pos);
                        return Some(OpenerMatch {
                            rule,
                            annotation_at,
                        });
                    }
                    trace_log!("ruby: {} declined at {}, no closing marker", rule.name, pos);
                    self.blocked_until[i] = annotation_at;
                }
                Err(end) => self.blocked_until[i] = pos + end,
            }
        }
        None
    }

    /// Offset of the first `》` after the `《` at `at`, on the same line.
    #[inline]
    pub fn close_after(&mut self, text: &str, at: usize) -> Option<usize> {
        self.closes.find(text, at)
    }
}

/// Cached "next `》` on this line" lookup.
#[derive(Debug, Default)]
struct CloseFinder {
    valid: bool,
    from: usize,
    found: Option<usize>,
    line_end: usize,
}

impl CloseFinder {
    fn find(&mut self, text: &str, at: usize) -> Option<usize> {
        if self.valid && at >= self.from {
            match self.found {
                Some(close) if at < close => return Some(close),
                None if at < self.line_end => return None,
                _ => {}
            }
        }

        let cursor = Cursor::new_at(text, at);
        let mut marker = [0u8; 4];
        let needle = ANNOTATION_CLOSE.encode_utf8(&mut marker);
        self.found = cursor.find_str_in_line(needle).map(|i| at + i);
        self.line_end = at + cursor.find(b'\n').unwrap_or(cursor.remaining());
        self.from = at;
        self.valid = true;
        self.found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opener_at(text: &str, offset: usize) -> Option<&'static str> {
        let mut scanner = RubyScanner::new();
        scanner
            .match_opener(&Cursor::new_at(text, offset))
            .map(|m| m.rule.name)
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let text = "この拡張機能《かくちょうきのう》";
        assert_eq!(opener_at(text, 0), None);
        assert_eq!(opener_at(text, "この".len()), Some("kanji"));
    }

    #[test]
    fn test_requires_close_on_same_line() {
        assert_eq!(opener_at("漢字《かんじ", 0), None);
        assert_eq!(opener_at("漢字《かん\nじ》", 0), None);
        assert_eq!(opener_at("漢字《》", 0), Some("kanji"));
    }

    #[test]
    fn test_blocked_positions_are_skipped() {
        let text = "abc def《x";
        let mut scanner = RubyScanner::new();
        assert!(scanner.match_opener(&Cursor::new(text)).is_none());
        // The hankaku run was already shown to fail up to the `《`.
        assert!(scanner.blocked_until[3] >= "abc def".len());
        assert!(scanner.match_opener(&Cursor::new_at(text, 2)).is_none());
    }

    #[test]
    fn test_close_finder_reuses_result() {
        let text = "《a》《b》\n《c";
        let mut scanner = RubyScanner::new();
        assert_eq!(scanner.close_after(text, 0), Some("《a".len()));
        assert_eq!(scanner.close_after(text, 0), Some("《a".len()));
        assert_eq!(scanner.close_after(text, "《a》".len()), Some("《a》《b".len()));
        let last = text.rfind('《').unwrap();
        assert_eq!(scanner.close_after(text, last), None);
    }
}
