//! `<rp>` fallback parentheses.

use crate::tree::{NodeId, NodeKind, Tree};

/// Put a `(` node right before and a `)` node right after `ruby_text`.
///
/// Called once per ruby text node, when its `Ruby` node is built.
pub(crate) fn decorate(tree: &mut Tree, ruby_text: NodeId) {
    let open = tree.new_node(NodeKind::RubyParen('('));
    tree.insert_before(ruby_text, open);
    let close = tree.new_node(NodeKind::RubyParen(')'));
    tree.insert_after(ruby_text, close);
}
