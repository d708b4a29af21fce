//! Builds the `Ruby` node once a `》` has matched an opener.

use rustc_hash::FxHashSet;

use super::{parentheses, sutegana};
use crate::trace::trace_log;
use crate::tree::{NodeId, NodeKind, Tree};
use crate::Options;

/// The four nodes marking one annotation in the paragraph, in order:
/// `open`, base text, `ruby_text` (still empty), `boundary`, ruby text,
/// `close`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RubyParts {
    pub open: NodeId,
    pub ruby_text: NodeId,
    pub boundary: NodeId,
    pub close: NodeId,
}

/// Move the base text and the ruby text into a new `Ruby` node placed
/// where the opener was. Returns `None`, reverting everything to literal
/// text, when there is no base text.
///
/// `visited` collects the ruby text leaves already transliterated in this
/// pass.
pub(crate) fn pair(
    tree: &mut Tree,
    parts: RubyParts,
    options: &Options,
    visited: &mut FxHashSet<NodeId>,
) -> Option<NodeId> {
    let well_formed = matches!(tree.kind(parts.ruby_text), NodeKind::RubyText { .. })
        && tree.next_sibling(parts.open) != Some(parts.ruby_text);
    if !well_formed {
        trace_log!("ruby: empty base text, pairing skipped");
        if matches!(tree.kind(parts.ruby_text), NodeKind::RubyText { .. }) {
            tree.detach(parts.ruby_text);
        }
        for node in [parts.open, parts.boundary, parts.close] {
            revert_placeholder(tree, node);
        }
        return None;
    }

    let ruby = tree.new_node(NodeKind::Ruby);
    tree.insert_before(parts.open, ruby);
    tree.move_siblings_between(parts.open, Some(parts.ruby_text), ruby);
    tree.append_child(ruby, parts.ruby_text);
    tree.move_siblings_between(parts.boundary, Some(parts.close), parts.ruby_text);
    for node in [parts.open, parts.boundary, parts.close] {
        tree.detach(node);
    }

    let visible = sutegana::transliterate(tree, parts.ruby_text, options.use_sutegana, visited);
    if let NodeKind::RubyText { visible_chars } = tree.kind_mut(parts.ruby_text) {
        *visible_chars = visible;
    }
    if options.use_rp_tag {
        parentheses::decorate(tree, parts.ruby_text);
    }

    Some(ruby)
}

/// Turn an unpaired placeholder back into the text it stands for.
pub(crate) fn revert_placeholder(tree: &mut Tree, node: NodeId) {
    let NodeKind::Placeholder(placeholder) = *tree.kind(node) else {
        return;
    };
    let literal = placeholder.literal();
    if literal.is_empty() {
        tree.detach(node);
    } else {
        *tree.kind_mut(node) = NodeKind::Text(literal.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Placeholder;

    struct Fixture {
        tree: Tree,
        para: NodeId,
        parts: RubyParts,
    }

    fn fixture(base: &[&str], ruby_text: &[&str]) -> Fixture {
        let mut tree = Tree::new();
        let para = tree.new_node(NodeKind::Paragraph);
        let add = |tree: &mut Tree, kind: NodeKind| {
            let node = tree.new_node(kind);
            tree.append_child(para, node);
            node
        };

        add(&mut tree, NodeKind::Text("before".into()));
        let open = add(&mut tree, NodeKind::Placeholder(Placeholder::Open { explicit: true }));
        for s in base {
            add(&mut tree, NodeKind::Text(s.to_string()));
        }
        let rt = add(&mut tree, NodeKind::RubyText { visible_chars: 0 });
        let boundary = add(&mut tree, NodeKind::Placeholder(Placeholder::Boundary));
        for s in ruby_text {
            add(&mut tree, NodeKind::Text(s.to_string()));
        }
        let close = add(&mut tree, NodeKind::Placeholder(Placeholder::Close));
        add(&mut tree, NodeKind::Text("after".into()));

        Fixture {
            tree,
            para,
            parts: RubyParts {
                open,
                ruby_text: rt,
                boundary,
                close,
            },
        }
    }

    #[test]
    fn test_pair_moves_regions() {
        let mut f = fixture(&["拡張", "機能"], &["かくちょう", "きのう"]);
        let ruby = pair(&mut f.tree, f.parts, &Options::default(), &mut FxHashSet::default()).unwrap();

        let top: Vec<_> = f.tree.children(f.para).collect();
        assert_eq!(top.len(), 3);
        assert_eq!(top[1], ruby);
        assert_eq!(f.tree.plain_text(ruby), "拡張機能かくちょうきのう");
        assert_eq!(f.tree.last_child(ruby), Some(f.parts.ruby_text));
        assert_eq!(f.tree.plain_text(f.parts.ruby_text), "かくちょうきのう");
        assert_eq!(
            f.tree.kind(f.parts.ruby_text),
            &NodeKind::RubyText { visible_chars: 8 }
        );
    }

    #[test]
    fn test_pair_with_parentheses() {
        let mut f = fixture(&["漢字"], &["かんじ"]);
        let options = Options {
            use_rp_tag: true,
            ..Options::default()
        };
        let ruby = pair(&mut f.tree, f.parts, &options, &mut FxHashSet::default()).unwrap();
        let kinds: Vec<_> = f.tree.children(ruby).map(|c| f.tree.kind(c).clone()).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Text("漢字".into()),
                NodeKind::RubyParen('('),
                NodeKind::RubyText { visible_chars: 3 },
                NodeKind::RubyParen(')'),
            ]
        );
    }

    #[test]
    fn test_empty_base_reverts() {
        let mut f = fixture(&[], &["かんじ"]);
        assert!(pair(&mut f.tree, f.parts, &Options::default(), &mut FxHashSet::default()).is_none());
        assert_eq!(f.tree.plain_text(f.para), "before｜《かんじ》after");
    }

    #[test]
    fn test_revert_implicit_open_disappears() {
        let mut tree = Tree::new();
        let para = tree.new_node(NodeKind::Paragraph);
        let open = tree.new_node(NodeKind::Placeholder(Placeholder::Open { explicit: false }));
        tree.append_child(para, open);
        revert_placeholder(&mut tree, open);
        assert!(!tree.has_children(para));
    }
}
