//! Pending delimiter stack.
//!
//! One stack is owned by one inline pass. Emphasis runs (`*`, `_`) and the
//! ruby markers (`｜` for an opener, `《` for the ruby-text boundary, `》`
//! for a closer) all live on it, so a resolution pass can tell which
//! delimiters lie between an opener and its closer.

use crate::limits;
use crate::tree::NodeId;

/// A pending delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    /// Delimiter character.
    pub ch: char,
    /// Unconsumed characters of the run.
    pub run_len: usize,
    /// Length of the run as scanned, used by the rule of three.
    pub orig_len: usize,
    /// Node holding the delimiter text (or the ruby placeholder).
    pub node: NodeId,
    pub can_open: bool,
    pub can_close: bool,
    /// Inactive delimiters stay on the stack but can no longer pair.
    pub active: bool,
}

impl Delimiter {
    /// A single-character ruby marker delimiter.
    pub fn marker(ch: char, node: NodeId, can_open: bool, can_close: bool) -> Self {
        Self {
            ch,
            run_len: 1,
            orig_len: 1,
            node,
            can_open,
            can_close,
            active: true,
        }
    }

    #[inline]
    pub fn is_emphasis(&self) -> bool {
        matches!(self.ch, '*' | '_')
    }
}

/// Stack of pending delimiters, bottom first.
#[derive(Debug, Default)]
pub struct DelimiterStack {
    items: Vec<Delimiter>,
}

impl DelimiterStack {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(32),
        }
    }

    /// Push a delimiter. Returns `false` when the stack is full.
    pub fn push(&mut self, delim: Delimiter) -> bool {
        if self.items.len() >= limits::MAX_DELIMITER_STACK {
            return false;
        }
        self.items.push(delim);
        true
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<&Delimiter> {
        self.items.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Delimiter> {
        self.items.get_mut(index)
    }

    /// Index of the topmost delimiter with character `ch`.
    pub fn search_by_char(&self, ch: char) -> Option<usize> {
        self.items.iter().rposition(|d| d.ch == ch)
    }

    /// Index of the topmost delimiter with character `ch` above `bottom`.
    pub fn search_by_char_above(&self, ch: char, bottom: usize) -> Option<usize> {
        self.items
            .get(bottom..)?
            .iter()
            .rposition(|d| d.ch == ch)
            .map(|i| i + bottom)
    }

    pub fn remove_at(&mut self, index: usize) -> Delimiter {
        self.items.remove(index)
    }

    /// Remove the delimiters in `start..end`.
    pub fn remove_range(&mut self, start: usize, end: usize) {
        self.items.drain(start..end);
    }

    /// Keep only the first `len` delimiters.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Drop delimiters at or above `bottom` that fail the predicate.
    pub fn retain_above<F>(&mut self, bottom: usize, mut keep: F)
    where
        F: FnMut(&Delimiter) -> bool,
    {
        let mut index = 0;
        self.items.retain(|d| {
            let kept = index < bottom || keep(d);
            index += 1;
            kept
        });
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Delimiter> + '_ {
        self.items.iter()
    }
}
