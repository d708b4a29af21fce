//! Character cursor over inline text.
//!
//! The ruby markers are multi-byte characters, so unlike a pure byte
//! scanner the cursor steps by `char`. Offsets are still byte offsets into
//! the input, which keeps slicing cheap and lets `memchr` do the searching.

use memchr::memmem;

/// A cursor for scanning a `&str` one character at a time.
///
/// The cursor is `Copy`, so saving and restoring a position is a plain
/// assignment.
///
/// # Example
/// ```
/// use furimark::cursor::Cursor;
///
/// let mut cursor = Cursor::new("漢字《かんじ》");
///
/// assert_eq!(cursor.peek(), Some('漢'));
/// cursor.bump();
/// cursor.bump();
/// assert_eq!(cursor.peek(), Some('《'));
/// ```
#[derive(Clone, Copy)]
pub struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of `input`.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Create a cursor starting at a byte offset.
    #[inline]
    pub fn new_at(input: &'a str, offset: usize) -> Self {
        debug_assert!(input.is_char_boundary(offset));
        Self { input, pos: offset }
    }

    /// Current byte offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Check if cursor is at end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// The whole input the cursor runs over.
    #[inline]
    pub fn input(&self) -> &'a str {
        self.input
    }

    /// The unconsumed part of the input.
    #[inline]
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    /// Text between a previous offset and the current position.
    #[inline]
    pub fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }

    /// Peek the current character without advancing.
    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Peek at the character `n` positions ahead.
    #[inline]
    pub fn peek_ahead(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    /// Character immediately before the cursor.
    #[inline]
    pub fn peek_back(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    /// Advance by `n` bytes. `n` must land on a character boundary.
    #[inline]
    pub fn advance(&mut self, n: usize) {
        debug_assert!(n <= self.remaining());
        self.pos += n;
        debug_assert!(self.input.is_char_boundary(self.pos));
    }

    /// Advance past the current character.
    #[inline]
    pub fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Skip while predicate is true, returning the number of bytes skipped.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(char) -> bool,
    {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.pos - start
    }

    /// Find the next occurrence of a byte, relative to the cursor.
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        memchr::memchr(needle, self.rest().as_bytes())
    }

    /// Find `needle` before the end of the current line, relative to the cursor.
    #[inline]
    pub fn find_str_in_line(&self, needle: &str) -> Option<usize> {
        let line_end = self.find(b'\n').unwrap_or(self.remaining());
        memmem::find(&self.rest().as_bytes()[..line_end], needle.as_bytes())
    }
}

impl std::fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor")
            .field("offset", &self.offset())
            .field("remaining", &self.remaining())
            .finish()
    }
}
