//! HTML output writer and tree renderer.
//!
//! Uses md4c's growth strategy: 1.5x + 128-byte alignment.

use crate::escape;
use crate::tree::{NodeId, NodeKind, Tree};

/// HTML output writer with pre-allocated, reusable buffer.
///
/// # Example
/// ```
/// use furimark::HtmlWriter;
///
/// let mut writer = HtmlWriter::with_capacity_for(1000);
/// writer.ruby_start();
/// writer.write_escaped_text("漢字");
/// writer.rt_start();
/// writer.write_escaped_text("<かんじ>");
/// writer.rt_end();
/// writer.ruby_end();
///
/// let html = writer.into_string();
/// assert_eq!(html, "<ruby>漢字<rt>&lt;かんじ&gt;</rt></ruby>");
/// ```
pub struct HtmlWriter {
    out: Vec<u8>,
}

impl HtmlWriter {
    /// Create a new writer with default capacity.
    #[inline]
    pub fn new() -> Self {
        Self {
            out: Vec::with_capacity(1024),
        }
    }

    /// Create with pre-allocated capacity based on expected input size.
    ///
    /// Typical HTML is ~1.25x input size; ruby markup adds a little more.
    #[inline]
    pub fn with_capacity_for(input_len: usize) -> Self {
        let capacity = input_len + input_len / 4;
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Create with explicit capacity.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: Vec::with_capacity(capacity),
        }
    }

    /// Grow buffer using md4c's strategy: 1.5x + 128-byte alignment.
    #[cold]
    #[inline(never)]
    fn grow(&mut self, needed: usize) {
        let new_cap = ((self.out.len() + needed) * 3 / 2 + 128) & !127;
        self.out.reserve(new_cap.saturating_sub(self.out.len()));
    }

    /// Ensure capacity for additional bytes.
    #[inline]
    fn ensure_capacity(&mut self, additional: usize) {
        if self.out.len() + additional > self.out.capacity() {
            self.grow(additional);
        }
    }

    /// Write a static string (compile-time known).
    #[inline]
    pub fn write_str(&mut self, s: &'static str) {
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write a dynamic string without escaping.
    #[inline]
    pub fn write_string(&mut self, s: &str) {
        self.ensure_capacity(s.len());
        self.out.extend_from_slice(s.as_bytes());
    }

    /// Write a single ASCII byte.
    #[inline]
    fn write_byte(&mut self, b: u8) {
        debug_assert!(b.is_ascii());
        self.out.push(b);
    }

    /// Write text with HTML escaping (for text content).
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        self.ensure_capacity(text.len());
        escape::escape_text_into(&mut self.out, text.as_bytes());
    }

    /// Write a newline.
    #[inline]
    pub fn newline(&mut self) {
        self.out.push(b'\n');
    }

    /// Current output length.
    #[inline]
    pub fn len(&self) -> usize {
        self.out.len()
    }

    /// Check if output is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    /// Clear output for reuse (keeps capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.out.clear();
    }

    /// Get output as str.
    #[inline]
    pub fn as_str(&self) -> &str {
        // SAFETY: only `&str` content and ASCII markup are ever written
        unsafe { std::str::from_utf8_unchecked(&self.out) }
    }

    /// Take ownership as String.
    #[inline]
    pub fn into_string(self) -> String {
        // SAFETY: only `&str` content and ASCII markup are ever written
        unsafe { String::from_utf8_unchecked(self.out) }
    }

    /// Get mutable reference to internal buffer, for swapping in a
    /// caller-provided buffer. The buffer must hold valid UTF-8.
    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut Vec<u8> {
        &mut self.out
    }

    // --- HTML Tag Helpers ---

    /// Write opening tag: `<tagname>`
    #[inline]
    pub fn open_tag(&mut self, tag: &'static str) {
        self.write_byte(b'<');
        self.write_str(tag);
        self.write_byte(b'>');
    }

    /// Write closing tag: `</tagname>`
    #[inline]
    pub fn close_tag(&mut self, tag: &'static str) {
        self.write_str("</");
        self.write_str(tag);
        self.write_byte(b'>');
    }

    // --- Common HTML Elements ---

    /// Write paragraph start: `<p>`
    #[inline]
    pub fn paragraph_start(&mut self) {
        self.write_str("<p>");
    }

    /// Write paragraph end: `</p>\n`
    #[inline]
    pub fn paragraph_end(&mut self) {
        self.write_str("</p>\n");
    }

    /// Write inline code: `<code>content</code>`
    #[inline]
    pub fn inline_code(&mut self, content: &str) {
        self.write_str("<code>");
        self.write_escaped_text(content);
        self.write_str("</code>");
    }

    #[inline]
    pub fn em_start(&mut self) {
        self.write_str("<em>");
    }

    #[inline]
    pub fn em_end(&mut self) {
        self.write_str("</em>");
    }

    #[inline]
    pub fn strong_start(&mut self) {
        self.write_str("<strong>");
    }

    #[inline]
    pub fn strong_end(&mut self) {
        self.write_str("</strong>");
    }

    /// Write hard line break: `<br />\n`
    #[inline]
    pub fn line_break(&mut self) {
        self.write_str("<br />\n");
    }

    // --- Ruby ---

    #[inline]
    pub fn ruby_start(&mut self) {
        self.open_tag("ruby");
    }

    #[inline]
    pub fn ruby_end(&mut self) {
        self.close_tag("ruby");
    }

    #[inline]
    pub fn rt_start(&mut self) {
        self.open_tag("rt");
    }

    #[inline]
    pub fn rt_end(&mut self) {
        self.close_tag("rt");
    }

    /// Write a fallback parenthesis: `<rp>(</rp>`
    #[inline]
    pub fn rp(&mut self, paren: char) {
        self.open_tag("rp");
        let mut buf = [0u8; 4];
        self.write_escaped_text(paren.encode_utf8(&mut buf));
        self.close_tag("rp");
    }
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Write for HtmlWriter {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.write_string(s);
        Ok(())
    }
}

enum Step {
    Enter(NodeId),
    Leave(NodeId),
}

/// Render the subtree at `root`.
///
/// Walks the tree with an explicit stack, so nesting depth is bounded by
/// memory rather than by the call stack.
pub fn render_tree(tree: &Tree, root: NodeId, writer: &mut HtmlWriter) {
    let mut stack = vec![Step::Enter(root)];

    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) => {
                if enter(tree.kind(id), writer) {
                    stack.push(Step::Leave(id));
                    let mut child = tree.last_child(id);
                    while let Some(c) = child {
                        stack.push(Step::Enter(c));
                        child = tree.prev_sibling(c);
                    }
                }
            }
            Step::Leave(id) => leave(tree.kind(id), writer),
        }
    }
}

/// Write the opening part of a node. Returns whether it has children to visit.
fn enter(kind: &NodeKind, writer: &mut HtmlWriter) -> bool {
    match kind {
        NodeKind::Document => true,
        NodeKind::Paragraph => {
            writer.paragraph_start();
            true
        }
        NodeKind::Text(s) => {
            writer.write_escaped_text(s);
            false
        }
        NodeKind::Code(s) => {
            writer.inline_code(s);
            false
        }
        NodeKind::Emphasis => {
            writer.em_start();
            true
        }
        NodeKind::Strong => {
            writer.strong_start();
            true
        }
        NodeKind::SoftBreak => {
            writer.newline();
            false
        }
        NodeKind::HardBreak => {
            writer.line_break();
            false
        }
        NodeKind::Ruby => {
            writer.ruby_start();
            true
        }
        NodeKind::RubyText { .. } => {
            writer.rt_start();
            true
        }
        NodeKind::RubyParen(c) => {
            writer.rp(*c);
            false
        }
        NodeKind::Placeholder(p) => {
            writer.write_escaped_text(p.literal());
            false
        }
    }
}

fn leave(kind: &NodeKind, writer: &mut HtmlWriter) {
    match kind {
        NodeKind::Paragraph => writer.paragraph_end(),
        NodeKind::Emphasis => writer.em_end(),
        NodeKind::Strong => writer.strong_end(),
        NodeKind::Ruby => writer.ruby_end(),
        NodeKind::RubyText { .. } => writer.rt_end(),
        _ => {}
    }
}
