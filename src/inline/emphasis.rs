//! Emphasis and strong emphasis resolution.
//!
//! CommonMark's "process emphasis" procedure over the delimiter stack:
//! closers are visited bottom-up, each looks down the stack for the
//! nearest compatible opener, and the nodes between the two delimiter runs
//! are wrapped in an `Emphasis` or `Strong` node. `openers_bottom` records,
//! per closer class, how far down a previous search already failed.

use super::delimiter::DelimiterStack;
use crate::trace::trace_log;
use crate::tree::{NodeKind, Tree};

/// Index into `openers_bottom`: delimiter char x closer-can-open x length mod 3.
#[inline]
fn bucket(ch: char, can_open: bool, orig_len: usize) -> usize {
    let char_offset = if ch == '_' { 6 } else { 0 };
    let open_offset = if can_open { 3 } else { 0 };
    char_offset + open_offset + orig_len % 3
}

/// Resolve emphasis among the delimiters at or above `bottom`.
///
/// All emphasis delimiters at or above `bottom` are removed from the stack
/// afterwards, matched or not; other delimiters (ruby markers) are kept.
pub fn process_emphasis(tree: &mut Tree, stack: &mut DelimiterStack, bottom: usize) {
    let mut openers_bottom = [bottom; 12];
    let mut closer = bottom;

    while let Some(&current) = stack.get(closer) {
        if !current.is_emphasis() || !current.can_close || !current.active {
            closer += 1;
            continue;
        }

        let slot = bucket(current.ch, current.can_open, current.orig_len);
        let floor = openers_bottom[slot].max(bottom);

        let mut opener = None;
        let mut i = closer;
        while i > floor {
            i -= 1;
            let Some(candidate) = stack.get(i) else {
                break;
            };
            if candidate.ch != current.ch || !candidate.can_open || !candidate.active {
                continue;
            }
            // Rule of three.
            let odd_match = (current.can_open || candidate.can_close)
                && (candidate.orig_len + current.orig_len) % 3 == 0
                && !(candidate.orig_len % 3 == 0 && current.orig_len % 3 == 0);
            if !odd_match {
                opener = Some(i);
                break;
            }
        }

        match opener {
            Some(open) => {
                closer = insert_emphasis(tree, stack, open, closer, &mut openers_bottom);
            }
            None => {
                openers_bottom[slot] = closer;
                if current.can_open {
                    closer += 1;
                } else {
                    // Stays as literal text.
                    stack.remove_at(closer);
                }
            }
        }
    }

    stack.retain_above(bottom, |d| !d.is_emphasis());
}

/// Wrap the nodes between `open` and `close` and return the stack index of
/// the closer to look at next.
fn insert_emphasis(
    tree: &mut Tree,
    stack: &mut DelimiterStack,
    open: usize,
    close: usize,
    openers_bottom: &mut [usize; 12],
) -> usize {
    let (Some(&opener), Some(&closer)) = (stack.get(open), stack.get(close)) else {
        return close + 1;
    };
    let used = if opener.run_len >= 2 && closer.run_len >= 2 { 2 } else { 1 };

    if let NodeKind::Text(s) = tree.kind_mut(opener.node) {
        s.truncate(s.len() - used);
    }
    if let NodeKind::Text(s) = tree.kind_mut(closer.node) {
        s.drain(..used);
    }

    let kind = if used == 2 {
        NodeKind::Strong
    } else {
        NodeKind::Emphasis
    };
    let wrapper = tree.new_node(kind);
    tree.move_siblings_between(opener.node, Some(closer.node), wrapper);
    tree.insert_after(opener.node, wrapper);
    trace_log!("emphasis: matched {} x{} ({} -> {})", closer.ch, used, open, close);

    // Delimiters between the pair can no longer match anything.
    stack.remove_range(open + 1, close);
    for b in openers_bottom.iter_mut() {
        if *b > open {
            *b = open + 1;
        }
    }
    let mut next = open + 1;

    let opener_left = opener.run_len - used;
    let closer_left = closer.run_len - used;

    if let Some(d) = stack.get_mut(open) {
        d.run_len = opener_left;
    }
    if let Some(d) = stack.get_mut(next) {
        d.run_len = closer_left;
    }

    if opener_left == 0 {
        tree.detach(opener.node);
        stack.remove_at(open);
        next -= 1;
        for b in openers_bottom.iter_mut() {
            if *b > open {
                *b -= 1;
            }
        }
    }
    if closer_left == 0 {
        tree.detach(closer.node);
        stack.remove_at(next);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inline::delimiter::Delimiter;
    use crate::tree::NodeId;

    /// Builds a paragraph from `(text, delimiter)` parts, where the
    /// delimiter is `(can_open, can_close)` for `*`/`_` runs.
    fn build(parts: &[(&str, Option<(bool, bool)>)]) -> (Tree, NodeId, DelimiterStack) {
        let mut tree = Tree::new();
        let para = tree.new_node(NodeKind::Paragraph);
        let mut stack = DelimiterStack::new();
        for &(text, flags) in parts {
            let node = tree.new_node(NodeKind::Text(text.to_string()));
            tree.append_child(para, node);
            if let Some((can_open, can_close)) = flags {
                let ch = text.chars().next().unwrap();
                stack.push(Delimiter {
                    ch,
                    run_len: text.len(),
                    orig_len: text.len(),
                    node,
                    can_open,
                    can_close,
                    active: true,
                });
            }
        }
        (tree, para, stack)
    }

    fn shape(tree: &Tree, node: NodeId) -> String {
        let mut out = String::new();
        for child in tree.children(node) {
            match tree.kind(child) {
                NodeKind::Text(s) => out.push_str(s),
                NodeKind::Emphasis => {
                    out.push_str("<em>");
                    out.push_str(&shape(tree, child));
                    out.push_str("</em>");
                }
                NodeKind::Strong => {
                    out.push_str("<strong>");
                    out.push_str(&shape(tree, child));
                    out.push_str("</strong>");
                }
                _ => {}
            }
        }
        out
    }

    #[test]
    fn test_simple_emphasis() {
        let (mut tree, para, mut stack) =
            build(&[("*", Some((true, false))), ("world", None), ("*", Some((false, true)))]);
        process_emphasis(&mut tree, &mut stack, 0);
        assert_eq!(shape(&tree, para), "<em>world</em>");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_strong_emphasis() {
        let (mut tree, para, mut stack) =
            build(&[("**", Some((true, false))), ("world", None), ("**", Some((false, true)))]);
        process_emphasis(&mut tree, &mut stack, 0);
        assert_eq!(shape(&tree, para), "<strong>world</strong>");
    }

    #[test]
    fn test_triple_run_nests() {
        let (mut tree, para, mut stack) =
            build(&[("***", Some((true, false))), ("x", None), ("***", Some((false, true)))]);
        process_emphasis(&mut tree, &mut stack, 0);
        assert_eq!(shape(&tree, para), "<em><strong>x</strong></em>");
    }

    #[test]
    fn test_mixed_lengths() {
        // **a*b***
        let (mut tree, para, mut stack) = build(&[
            ("**", Some((true, false))),
            ("a", None),
            ("*", Some((true, true))),
            ("b", None),
            ("***", Some((false, true))),
        ]);
        process_emphasis(&mut tree, &mut stack, 0);
        assert_eq!(shape(&tree, para), "<strong>a<em>b</em></strong>");
    }

    #[test]
    fn test_mismatched_characters_stay_literal() {
        let (mut tree, para, mut stack) =
            build(&[("*", Some((true, false))), ("hello", None), ("_", Some((false, true)))]);
        process_emphasis(&mut tree, &mut stack, 0);
        assert_eq!(shape(&tree, para), "*hello_");
        assert!(stack.is_empty());
    }

    #[test]
    fn test_bottom_keeps_lower_delimiters() {
        let (mut tree, para, mut stack) = build(&[
            ("*", Some((true, false))),
            ("a", None),
            ("*", Some((true, false))),
            ("b", None),
            ("*", Some((false, true))),
        ]);
        process_emphasis(&mut tree, &mut stack, 1);
        assert_eq!(shape(&tree, para), "*a<em>b</em>");
        assert_eq!(stack.len(), 1);
    }
}
