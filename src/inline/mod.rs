//! Inline parser.
//!
//! One left-to-right pass over the text of a paragraph:
//! 1. Text, code spans, breaks and delimiter runs become nodes appended to
//!    the paragraph, in order.
//! 2. `*`/`_` runs and the ruby markers are pushed on a [`DelimiterStack`].
//! 3. A `》` resolves the ruby annotation it closes (emphasis inside it
//!    first), and the end of the pass resolves what is left.
//!
//! At every position the ruby escapes are checked first, then (while no
//! ruby opener is active) the base-text shape rules, then the ordinary
//! inline syntax.

mod code_span;
pub mod delimiter;
mod emphasis;

pub use delimiter::{Delimiter, DelimiterStack};
pub use emphasis::process_emphasis;

use crate::cursor::Cursor;
use crate::escape::entity_ref_len;
use crate::limits;
use crate::ruby::pairing::{self, RubyParts};
use crate::ruby::parser::RubyScanner;
use crate::ruby::{self, ANNOTATION_CLOSE, ANNOTATION_OPEN, OPEN_MARKER};
use crate::trace::trace_log;
use crate::tree::{NodeId, NodeKind, Placeholder, Tree};
use crate::Options;
use code_span::{CodeSpanScan, CodeSpanScanner};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;

/// Inline parser state, reusable across paragraphs.
pub struct InlineParser {
    delimiters: DelimiterStack,
    ruby: RubyScanner,
    code_spans: CodeSpanScanner,
    /// Pending literal text, flushed into a `Text` node before any other node.
    text: String,
    /// A ruby opener is on the stack and still active.
    ruby_active: bool,
    /// Offset of the `《` the active opener was matched against, until
    /// that `《` is reached.
    pending_annotation: Option<usize>,
    /// Ruby text leaves already transliterated in this pass.
    transliterated: FxHashSet<NodeId>,
}

impl InlineParser {
    /// Create a new inline parser.
    pub fn new() -> Self {
        Self {
            delimiters: DelimiterStack::new(),
            ruby: RubyScanner::new(),
            code_spans: CodeSpanScanner::new(),
            text: String::with_capacity(256),
            ruby_active: false,
            pending_annotation: None,
            transliterated: FxHashSet::default(),
        }
    }

    fn reset(&mut self) {
        self.delimiters.clear();
        self.ruby.reset();
        self.code_spans.reset();
        self.text.clear();
        self.ruby_active = false;
        self.pending_annotation = None;
        self.transliterated.clear();
    }

    /// Parse `text` and append the resulting nodes to `parent`.
    pub fn parse(&mut self, text: &str, tree: &mut Tree, parent: NodeId, options: &Options) {
        self.reset();
        let mut cursor = Cursor::new(text);

        while let Some(c) = cursor.peek() {
            if self.ruby_active
                && self
                    .pending_annotation
                    .is_some_and(|at| cursor.offset() > at)
            {
                self.drop_stale_opener(tree);
            }

            if c == '\\' {
                if let Some(marker) = cursor.peek_ahead(1).filter(|&m| ruby::is_marker(m)) {
                    self.text.push(marker);
                    cursor.advance(1 + marker.len_utf8());
                    continue;
                }
            }

            if !self.ruby_active && self.try_opener(&mut cursor, tree, parent) {
                continue;
            }

            match c {
                '\\' => self.parse_backslash(&mut cursor, tree, parent),
                '`' => self.parse_code_span(&mut cursor, tree, parent),
                '*' | '_' => self.parse_delimiter_run(&mut cursor, tree, parent, c),
                '&' => self.parse_entity(&mut cursor),
                '\n' => self.parse_line_break(&mut cursor, tree, parent, false),
                ANNOTATION_OPEN => self.parse_ruby_text(&mut cursor, tree, parent),
                ANNOTATION_CLOSE => self.parse_ruby_close(&mut cursor, tree, parent, options),
                _ => {
                    self.text.push(c);
                    cursor.bump();
                }
            }
        }

        self.finish(tree, parent);
    }

    /// Move pending text into a node.
    fn flush_text(&mut self, tree: &mut Tree, parent: NodeId) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text);
        self.append(tree, parent, NodeKind::Text(text));
    }

    #[inline]
    fn append(&mut self, tree: &mut Tree, parent: NodeId, kind: NodeKind) -> NodeId {
        let node = tree.new_node(kind);
        tree.append_child(parent, node);
        node
    }

    /// Try the shape rules. Returns `true` if the cursor moved (the
    /// explicit `｜` was consumed); implicit openers are zero-width and
    /// leave the current character to the ordinary syntax.
    fn try_opener(&mut self, cursor: &mut Cursor<'_>, tree: &mut Tree, parent: NodeId) -> bool {
        let Some(matched) = self.ruby.match_opener(cursor) else {
            return false;
        };
        let explicit = matched.rule.is_explicit();

        self.flush_text(tree, parent);
        let node = self.append(
            tree,
            parent,
            NodeKind::Placeholder(Placeholder::Open { explicit }),
        );
        if !self
            .delimiters
            .push(Delimiter::marker(OPEN_MARKER, node, true, false))
        {
            tree.detach(node);
            return false;
        }
        self.ruby_active = true;
        self.pending_annotation = Some(matched.annotation_at);

        if explicit {
            cursor.advance(OPEN_MARKER.len_utf8());
        }
        explicit
    }

    /// Revert an opener whose `《` was consumed by other syntax (a code
    /// span) before the ruby text could start.
    fn drop_stale_opener(&mut self, tree: &mut Tree) {
        self.ruby_active = false;
        self.pending_annotation = None;
        if let Some(index) = self.delimiters.search_by_char(OPEN_MARKER) {
            let opener = self.delimiters.remove_at(index);
            trace_log!("ruby: opener lost its annotation marker, reverting");
            pairing::revert_placeholder(tree, opener.node);
        }
    }

    /// Index of the current ruby opener and whether its `《` was seen.
    fn ruby_opener(&self) -> Option<(usize, bool)> {
        let index = self.delimiters.search_by_char(OPEN_MARKER)?;
        let has_boundary = self
            .delimiters
            .search_by_char_above(ANNOTATION_OPEN, index)
            .is_some();
        Some((index, has_boundary))
    }

    fn parse_ruby_text(&mut self, cursor: &mut Cursor<'_>, tree: &mut Tree, parent: NodeId) {
        let at = cursor.offset();
        cursor.bump();

        let Some((index, has_boundary)) = self.ruby_opener() else {
            self.text.push(ANNOTATION_OPEN);
            return;
        };
        let Some(opener) = self.delimiters.get(index).copied() else {
            self.text.push(ANNOTATION_OPEN);
            return;
        };

        if !opener.active {
            trace_log!("ruby: stale opener dropped at {}", at);
            self.flush_text(tree, parent);
            self.delimiters.remove_at(index);
            pairing::revert_placeholder(tree, opener.node);
            self.text.push(ANNOTATION_OPEN);
            return;
        }

        if has_boundary || self.ruby.close_after(cursor.input(), at).is_none() {
            self.text.push(ANNOTATION_OPEN);
            return;
        }

        self.flush_text(tree, parent);
        let ruby_text = self.append(tree, parent, NodeKind::RubyText { visible_chars: 0 });
        let boundary = self.append(tree, parent, NodeKind::Placeholder(Placeholder::Boundary));
        if self
            .delimiters
            .push(Delimiter::marker(ANNOTATION_OPEN, boundary, false, false))
        {
            self.pending_annotation = None;
        } else {
            tree.detach(boundary);
            tree.detach(ruby_text);
            self.text.push(ANNOTATION_OPEN);
        }
    }

    fn parse_ruby_close(
        &mut self,
        cursor: &mut Cursor<'_>,
        tree: &mut Tree,
        parent: NodeId,
        options: &Options,
    ) {
        cursor.bump();

        let opener = self
            .ruby_opener()
            .and_then(|(index, has_boundary)| {
                let d = self.delimiters.get(index)?;
                d.active.then_some((index, d.node, has_boundary))
            });
        let Some((open_index, open_node, has_boundary)) = opener else {
            self.text.push(ANNOTATION_CLOSE);
            return;
        };

        self.flush_text(tree, parent);
        self.ruby_active = false;

        if !has_boundary {
            trace_log!("ruby: closer without ruby text, reverting opener");
            self.delimiters.remove_at(open_index);
            pairing::revert_placeholder(tree, open_node);
            self.text.push(ANNOTATION_CLOSE);
            return;
        }

        let close = self.append(tree, parent, NodeKind::Placeholder(Placeholder::Close));
        self.delimiters
            .push(Delimiter::marker(ANNOTATION_CLOSE, close, false, true));

        // Emphasis never crosses the `《`: resolve the ruby text, then the base.
        let Some(boundary_index) = self
            .delimiters
            .search_by_char_above(ANNOTATION_OPEN, open_index)
        else {
            return;
        };
        process_emphasis(tree, &mut self.delimiters, boundary_index + 1);
        let boundary = self.delimiters.remove_at(boundary_index);
        process_emphasis(tree, &mut self.delimiters, open_index + 1);
        self.delimiters.truncate(open_index);

        let Some(ruby_text) = tree.prev_sibling(boundary.node) else {
            return;
        };
        let parts = RubyParts {
            open: open_node,
            ruby_text,
            boundary: boundary.node,
            close,
        };
        if pairing::pair(tree, parts, options, &mut self.transliterated).is_some() {
            trace_log!("ruby: paired at {}", cursor.offset());
        }
    }

    fn parse_backslash(&mut self, cursor: &mut Cursor<'_>, tree: &mut Tree, parent: NodeId) {
        match cursor.peek_ahead(1) {
            Some('\n') => {
                cursor.bump();
                self.parse_line_break(cursor, tree, parent, true);
            }
            Some(next) if next.is_ascii_punctuation() => {
                self.text.push(next);
                cursor.advance(2);
            }
            _ => {
                self.text.push('\\');
                cursor.bump();
            }
        }
    }

    fn parse_code_span(&mut self, cursor: &mut Cursor<'_>, tree: &mut Tree, parent: NodeId) {
        match self.code_spans.scan(cursor.rest()) {
            CodeSpanScan::Span { len, content } => {
                self.flush_text(tree, parent);
                self.append(tree, parent, NodeKind::Code(content));
                cursor.advance(len);
            }
            CodeSpanScan::Literal { len } => {
                self.text.push_str(&cursor.rest()[..len]);
                cursor.advance(len);
            }
        }
    }

    fn parse_delimiter_run(
        &mut self,
        cursor: &mut Cursor<'_>,
        tree: &mut Tree,
        parent: NodeId,
        ch: char,
    ) {
        let start = cursor.offset();
        let before = cursor.peek_back();
        let len = cursor.skip_while(|c| c == ch);
        let after = cursor.peek();
        let run = cursor.slice_from(start);

        let (can_open, can_close) = flanking(ch, before, after);
        if len > limits::MAX_EMPHASIS_RUN || !(can_open || can_close) {
            self.text.push_str(run);
            return;
        }

        self.flush_text(tree, parent);
        let node = self.append(tree, parent, NodeKind::Text(run.to_string()));
        let pushed = self.delimiters.push(Delimiter {
            ch,
            run_len: len,
            orig_len: len,
            node,
            can_open,
            can_close,
            active: true,
        });
        if !pushed {
            trace_log!("inline: delimiter stack full at {}", start);
        }
    }

    fn parse_entity(&mut self, cursor: &mut Cursor<'_>) {
        let rest = cursor.rest();
        if let Some(len) = entity_ref_len(rest) {
            let candidate = &rest[..len];
            let decoded = html_escape::decode_html_entities(candidate);
            if decoded != candidate {
                if decoded.contains('\0') {
                    self.text.push('\u{FFFD}');
                } else {
                    self.text.push_str(&decoded);
                }
                cursor.advance(len);
                return;
            }
        }
        self.text.push('&');
        cursor.bump();
    }

    /// Cursor is on the `\n`.
    fn parse_line_break(
        &mut self,
        cursor: &mut Cursor<'_>,
        tree: &mut Tree,
        parent: NodeId,
        forced_hard: bool,
    ) {
        let kept = self.text.trim_end_matches(' ').len();
        let trailing = self.text.len() - kept;
        self.text.truncate(kept);
        self.flush_text(tree, parent);

        let kind = if forced_hard || trailing >= 2 {
            NodeKind::HardBreak
        } else {
            NodeKind::SoftBreak
        };
        self.append(tree, parent, kind);
        cursor.bump();
        cursor.skip_while(|c| c == ' ' || c == '\t');

        // An opener whose `《` never showed up on its line can no longer pair.
        if self.ruby_active {
            if let Some((index, false)) = self.ruby_opener() {
                if let Some(d) = self.delimiters.get_mut(index) {
                    d.active = false;
                }
                self.ruby_active = false;
                trace_log!("ruby: opener deactivated by line break");
            }
        }
    }

    /// Revert unpaired ruby markers and resolve the remaining emphasis.
    fn finish(&mut self, tree: &mut Tree, parent: NodeId) {
        self.flush_text(tree, parent);

        let leftovers: SmallVec<[(char, NodeId); 4]> = self
            .delimiters
            .iter()
            .filter(|d| !d.is_emphasis())
            .map(|d| (d.ch, d.node))
            .collect();
        for (ch, node) in leftovers {
            if ch == ANNOTATION_OPEN {
                if let Some(container) = tree.prev_sibling(node) {
                    if matches!(tree.kind(container), NodeKind::RubyText { .. }) {
                        tree.detach(container);
                    }
                }
            }
            trace_log!("ruby: reverting unpaired {}", ch);
            pairing::revert_placeholder(tree, node);
        }
        self.delimiters.retain_above(0, |d| d.is_emphasis());
        self.ruby_active = false;

        process_emphasis(tree, &mut self.delimiters, 0);
        self.delimiters.clear();
    }
}

impl Default for InlineParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Unicode whitespace for flanking purposes.
#[inline]
fn is_whitespace(c: char) -> bool {
    c.is_whitespace()
}

/// ASCII punctuation plus the common Unicode punctuation and symbol blocks.
fn is_punctuation(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_punctuation();
    }
    matches!(c,
        '\u{00A1}'..='\u{00BF}'
        | '\u{00D7}' | '\u{00F7}'
        | '\u{2010}'..='\u{2027}'
        | '\u{2030}'..='\u{205E}'
        | '\u{2190}'..='\u{23FF}'
        | '\u{2E00}'..='\u{2E7F}'
        | '\u{3001}'..='\u{3004}'
        | '\u{3008}'..='\u{3020}'
        | '\u{3030}'
        | '\u{30FB}'
        | '\u{FE10}'..='\u{FE19}'
        | '\u{FE30}'..='\u{FE6B}'
        | '\u{FF01}'..='\u{FF0F}'
        | '\u{FF1A}'..='\u{FF20}'
        | '\u{FF3B}'..='\u{FF40}'
        | '\u{FF5B}'..='\u{FF65}')
}

/// `(can_open, can_close)` for a delimiter run between `before` and `after`.
fn flanking(ch: char, before: Option<char>, after: Option<char>) -> (bool, bool) {
    let before_ws = before.is_none_or(is_whitespace);
    let after_ws = after.is_none_or(is_whitespace);
    let before_punct = before.is_some_and(is_punctuation);
    let after_punct = after.is_some_and(is_punctuation);

    let left = !after_ws && (!after_punct || before_ws || before_punct);
    let right = !before_ws && (!before_punct || after_ws || after_punct);

    if ch == '_' {
        (left && (!right || before_punct), right && (!left || after_punct))
    } else {
        (left, right)
    }
}
