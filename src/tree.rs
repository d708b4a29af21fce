//! Arena-backed document tree.
//!
//! All nodes of one document live in a single `Vec`, addressed by
//! [`NodeId`]. Sibling and parent links are indices, so moving a run of
//! nodes under a new parent (what delimiter processing does all the time)
//! is a handful of index updates and never copies node payloads.

/// Index of a node in its [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Zero-width markers inserted while a ruby annotation is being scanned.
///
/// They only exist during one inline pass: pairing removes them, and any
/// left over at the end of the pass are reverted to literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Start of the base text. `explicit` is set when a `｜` was consumed.
    Open { explicit: bool },
    /// Position of the `《` that starts the ruby text.
    Boundary,
    /// Position of the closing `》`.
    Close,
}

impl Placeholder {
    /// Text this marker stands for if it never gets paired.
    pub fn literal(self) -> &'static str {
        match self {
            Placeholder::Open { explicit: true } => "｜",
            Placeholder::Open { explicit: false } => "",
            Placeholder::Boundary => "《",
            Placeholder::Close => "》",
        }
    }
}

/// Every kind of node the parser produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Paragraph,
    /// Literal text (unescaped; escaping happens at render time).
    Text(String),
    /// Code span content.
    Code(String),
    Emphasis,
    Strong,
    SoftBreak,
    HardBreak,
    /// Ruby annotation: base text children followed by one [`NodeKind::RubyText`].
    Ruby,
    /// Ruby text container. `visible_chars` counts the characters of its
    /// rendered plain text, whatever markup splits it.
    RubyText { visible_chars: usize },
    /// Fallback parenthesis around ruby text, for renderers without ruby support.
    RubyParen(char),
    Placeholder(Placeholder),
}

impl NodeKind {
    /// Literal content of text-bearing leaves.
    pub fn literal(&self) -> Option<&str> {
        match self {
            NodeKind::Text(s) | NodeKind::Code(s) => Some(s),
            _ => None,
        }
    }
}

/// A node and its links.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
}

/// Arena of nodes.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Create an empty tree sized for an input length.
    pub fn with_capacity_for(input_len: usize) -> Self {
        Self {
            nodes: Vec::with_capacity((input_len / 8).max(16)),
        }
    }

    /// Allocate a detached node.
    pub fn new_node(&mut self, kind: NodeKind) -> NodeId {
        debug_assert!(self.nodes.len() < u32::MAX as usize);
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev: None,
            next: None,
        });
        id
    }

    /// Number of allocated nodes (attached or not).
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was ever allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].first_child
    }

    #[inline]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].last_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].next
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].prev
    }

    #[inline]
    pub fn has_children(&self, id: NodeId) -> bool {
        self.nodes[id.index()].first_child.is_some()
    }

    /// Unlink a node from its parent and siblings. Its own children stay attached.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let node = &self.nodes[id.index()];
            (node.parent, node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p.index()].next = next,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].first_child = next;
                }
            }
        }
        match next {
            Some(n) => self.nodes[n.index()].prev = prev,
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].last_child = prev;
                }
            }
        }

        let node = &mut self.nodes[id.index()];
        node.parent = None;
        node.prev = None;
        node.next = None;
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.nodes[parent.index()].last_child;
        {
            let node = &mut self.nodes[child.index()];
            node.parent = Some(parent);
            node.prev = last;
        }
        match last {
            Some(l) => self.nodes[l.index()].next = Some(child),
            None => self.nodes[parent.index()].first_child = Some(child),
        }
        self.nodes[parent.index()].last_child = Some(child);
    }

    /// Insert `node` as the sibling right after `anchor`.
    pub fn insert_after(&mut self, anchor: NodeId, node: NodeId) {
        self.detach(node);
        let (parent, next) = {
            let a = &self.nodes[anchor.index()];
            (a.parent, a.next)
        };
        {
            let n = &mut self.nodes[node.index()];
            n.parent = parent;
            n.prev = Some(anchor);
            n.next = next;
        }
        self.nodes[anchor.index()].next = Some(node);
        match next {
            Some(nx) => self.nodes[nx.index()].prev = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].last_child = Some(node);
                }
            }
        }
    }

    /// Insert `node` as the sibling right before `anchor`.
    pub fn insert_before(&mut self, anchor: NodeId, node: NodeId) {
        self.detach(node);
        let (parent, prev) = {
            let a = &self.nodes[anchor.index()];
            (a.parent, a.prev)
        };
        {
            let n = &mut self.nodes[node.index()];
            n.parent = parent;
            n.prev = prev;
            n.next = Some(anchor);
        }
        self.nodes[anchor.index()].prev = Some(node);
        match prev {
            Some(p) => self.nodes[p.index()].next = Some(node),
            None => {
                if let Some(parent) = parent {
                    self.nodes[parent.index()].first_child = Some(node);
                }
            }
        }
    }

    /// Move the siblings strictly between `from` and `until` under `parent`,
    /// preserving their order. With `until == None` the run extends to the
    /// last sibling.
    pub fn move_siblings_between(&mut self, from: NodeId, until: Option<NodeId>, parent: NodeId) {
        let mut cursor = self.next_sibling(from);
        while let Some(id) = cursor {
            if Some(id) == until {
                break;
            }
            cursor = self.next_sibling(id);
            self.append_child(parent, id);
        }
    }

    /// Iterate over the direct children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Depth-first, pre-order iteration over `id` and everything below it.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            root: id,
            next: Some(id),
        }
    }

    /// Concatenated literal text below a node.
    pub fn plain_text(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(s) = self.kind(node).literal() {
                out.push_str(s);
            }
        }
        out
    }
}

/// Iterator over the children of a node.
pub struct Children<'t> {
    tree: &'t Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.next_sibling(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'t> {
    tree: &'t Tree,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = if let Some(child) = self.tree.first_child(current) {
            Some(child)
        } else {
            // Climb until a node with a next sibling, never leaving the root.
            let mut node = current;
            loop {
                if node == self.root {
                    break None;
                }
                if let Some(sibling) = self.tree.next_sibling(node) {
                    break Some(sibling);
                }
                match self.tree.parent(node) {
                    Some(parent) => node = parent,
                    None => break None,
                }
            }
        };

        Some(current)
    }
}
