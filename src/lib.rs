//! furimark: Japanese ruby (furigana) annotations for Markdown
//!
//! Turns `漢字《かんじ》` and `｜素晴らしい《Wonderful》` into
//! `<ruby>` markup while parsing a small Markdown dialect (paragraphs,
//! emphasis, code spans, escapes and line breaks).
//!
//! # Design Principles
//! - Arena node tree: ruby needs to regroup nodes after the fact
//! - No regex: character-class scanning over `&str`
//! - Linear scanning: failed base-text runs are memoised
//! - Never fails: malformed ruby degrades to literal text
//!
//! # Example
//! ```
//! let html = furimark::to_html("この拡張機能《かくちょうきのう》は素晴らしい");
//! assert_eq!(
//!     html,
//!     "<p>この<ruby>拡張機能<rt>かくちょうきのう</rt></ruby>は素晴らしい</p>\n"
//! );
//! ```

mod trace;

pub mod block;
pub mod cursor;
pub mod escape;
pub mod inline;
pub mod limits;
pub mod render;
pub mod ruby;
pub mod tree;

// Re-export primary types
pub use block::BlockParser;
pub use inline::InlineParser;
pub use render::HtmlWriter;
pub use ruby::TagError;
pub use tree::{NodeId, NodeKind, Tree};

/// Parsing/rendering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Replace small kana in ruby text with their full-size forms
    /// (`ょ` → `よ`).
    pub use_sutegana: bool,
    /// Wrap ruby text in `<rp>(</rp>` … `<rp>)</rp>` for browsers without
    /// ruby support.
    pub use_rp_tag: bool,
    /// Split ruby whose text has one space-separated segment per base
    /// character into one `<rt>` per character.
    pub mono_ruby: bool,
}

/// Convert Markdown to HTML.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let html = furimark::to_html("｜素晴らしい《Wonderful》");
/// assert_eq!(html, "<p><ruby>素晴らしい<rt>Wonderful</rt></ruby></p>\n");
/// ```
pub fn to_html(input: &str) -> String {
    to_html_with_options(input, &Options::default())
}

/// Convert Markdown to HTML with options.
///
/// # Example
/// ```
/// use furimark::{to_html_with_options, Options};
///
/// let options = Options { use_rp_tag: true, ..Options::default() };
/// assert_eq!(
///     to_html_with_options("漢字《かんじ》", &options),
///     "<p><ruby>漢字<rp>(</rp><rt>かんじ</rt><rp>)</rp></ruby></p>\n"
/// );
/// ```
pub fn to_html_with_options(input: &str, options: &Options) -> String {
    let mut writer = HtmlWriter::with_capacity_for(input.len());
    render_to_writer(input, &mut writer, options);
    writer.into_string()
}

/// Convert Markdown to HTML, writing into a provided buffer.
///
/// This avoids allocation if the buffer has sufficient capacity.
pub fn to_html_into(input: &str, out: &mut Vec<u8>) {
    to_html_into_with_options(input, out, &Options::default());
}

/// Convert Markdown to HTML into a provided buffer with options.
pub fn to_html_into_with_options(input: &str, out: &mut Vec<u8>, options: &Options) {
    out.clear();
    out.reserve(input.len() + input.len() / 4);
    let mut writer = HtmlWriter::with_capacity(0);
    // Use the provided buffer directly
    std::mem::swap(writer.buffer_mut(), out);
    render_to_writer(input, &mut writer, options);
    std::mem::swap(writer.buffer_mut(), out);
}

fn render_to_writer(input: &str, writer: &mut HtmlWriter, options: &Options) {
    let document = parse_document(input, options);
    write_document(&document, writer);
}

fn write_document(document: &Document, writer: &mut HtmlWriter) {
    render::render_tree(&document.tree, document.root, writer);
    if document.options.mono_ruby {
        let html = ruby::apply_mono_ruby(writer.as_str());
        writer.clear();
        writer.write_string(&html);
    }
}

/// A parsed document: the node tree with ruby already paired.
pub struct Document {
    tree: Tree,
    root: NodeId,
    options: Options,
}

impl Document {
    /// The node tree.
    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The `Document` node.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Options the document was parsed with.
    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Every `Ruby` node, in document order.
    pub fn ruby_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.tree
            .descendants(self.root)
            .filter(|&id| matches!(self.tree.kind(id), NodeKind::Ruby))
    }

    /// Visible character count of every ruby text, in document order.
    ///
    /// # Example
    /// ```
    /// use furimark::{parse_document, Options};
    ///
    /// let doc = parse_document("拡張機能《**かくちょう**きのう》", &Options::default());
    /// assert_eq!(doc.visible_character_counts().collect::<Vec<_>>(), [8]);
    /// ```
    pub fn visible_character_counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.tree
            .descendants(self.root)
            .filter_map(|id| match self.tree.kind(id) {
                NodeKind::RubyText { visible_chars } => Some(*visible_chars),
                _ => None,
            })
    }
}

/// Parse Markdown into a [`Document`].
pub fn parse_document(input: &str, options: &Options) -> Document {
    let mut tree = Tree::with_capacity_for(input.len());
    let root = tree.new_node(NodeKind::Document);

    let mut blocks = BlockParser::new(input);
    let mut inline = InlineParser::new();
    let mut content = String::with_capacity(256);

    while blocks.next_paragraph(&mut content) {
        let paragraph = tree.new_node(NodeKind::Paragraph);
        tree.append_child(root, paragraph);
        inline.parse(&content, &mut tree, paragraph, options);
    }

    Document {
        tree,
        root,
        options: *options,
    }
}

/// Render a parsed [`Document`] to HTML.
pub fn render_document(document: &Document) -> String {
    let mut writer = HtmlWriter::with_capacity(document.tree.len() * 8);
    write_document(document, &mut writer);
    writer.into_string()
}
