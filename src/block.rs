//! Block-level parser.
//!
//! Line-oriented and deliberately small: blank lines separate paragraphs,
//! every other line is paragraph content. Each paragraph is handed to the
//! inline parser as one string with lines joined by `\n`.

use crate::cursor::Cursor;

/// Leading spaces stripped from each paragraph line.
const MAX_INDENT: usize = 3;

/// Block parser state.
pub struct BlockParser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> BlockParser<'a> {
    /// Create a new block parser.
    pub fn new(input: &'a str) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Collect the next paragraph into `content` (cleared first).
    ///
    /// Returns `false` once the input is exhausted.
    pub fn next_paragraph(&mut self, content: &mut String) -> bool {
        content.clear();

        while let Some(line) = self.next_line() {
            if is_blank(line) {
                if content.is_empty() {
                    continue;
                }
                break;
            }
            if !content.is_empty() {
                content.push('\n');
            }
            content.push_str(strip_indent(line));
        }

        // Trailing spaces/tabs never reach the inline parser
        let trimmed = content.trim_end_matches([' ', '\t']).len();
        content.truncate(trimmed);
        !content.is_empty()
    }

    /// Next line without its line ending (`\n` or `\r\n`).
    fn next_line(&mut self) -> Option<&'a str> {
        if self.cursor.is_eof() {
            return None;
        }
        let start = self.cursor.offset();
        let line = match self.cursor.find(b'\n') {
            Some(len) => {
                self.cursor.advance(len + 1);
                let line = &self.cursor.input()[start..start + len];
                line.strip_suffix('\r').unwrap_or(line)
            }
            None => {
                self.cursor.advance(self.cursor.remaining());
                &self.cursor.input()[start..]
            }
        };
        Some(line)
    }
}

impl<'a> Iterator for BlockParser<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut content = String::new();
        self.next_paragraph(&mut content).then_some(content)
    }
}

#[inline]
fn is_blank(line: &str) -> bool {
    line.bytes().all(|b| b == b' ' || b == b'\t')
}

#[inline]
fn strip_indent(line: &str) -> &str {
    let indent = line
        .bytes()
        .take(MAX_INDENT)
        .take_while(|&b| b == b' ')
        .count();
    &line[indent..]
}
