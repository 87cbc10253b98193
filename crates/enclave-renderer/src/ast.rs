//! Arena-backed document tree.
//!
//! Nodes live in a single `Vec` and are addressed by [`NodeId`]. Every node
//! stores explicit parent, sibling and first/last child indices, so
//! structural edits such as [`Document::replace`] are O(1) index rewires.
//! Detached nodes stay in the arena until the document is dropped.

use pulldown_cmark::Alignment;

use crate::enclave::Enclave;

/// Stable index of a node inside a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Payload-free node kind tag, used to register node renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Document,
    Paragraph,
    Heading,
    BlockQuote,
    CodeBlock,
    List,
    Item,
    TaskListMarker,
    Table,
    TableHead,
    TableRow,
    TableCell,
    DefinitionList,
    DefinitionTitle,
    DefinitionDetails,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link,
    Image,
    Enclave,
    Text,
    Code,
    Html,
    SoftBreak,
    HardBreak,
    Rule,
}

/// Node kind with its payload.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Document,
    Paragraph,
    Heading {
        level: u8,
    },
    /// Blockquote; `alert` holds the GFM alert class (`note`, `tip`, ...).
    BlockQuote {
        alert: Option<&'static str>,
    },
    CodeBlock {
        language: Option<String>,
    },
    List {
        start: Option<u64>,
    },
    Item,
    TaskListMarker {
        checked: bool,
    },
    Table,
    TableHead,
    TableRow,
    TableCell {
        header: bool,
        align: Alignment,
    },
    DefinitionList,
    DefinitionTitle,
    DefinitionDetails,
    Emphasis,
    Strong,
    Strikethrough,
    Superscript,
    Subscript,
    Link {
        url: String,
        title: String,
    },
    /// Image reference; its children carry the alt text.
    Image {
        url: String,
        title: String,
    },
    /// Resolved embed that replaced an image reference.
    Enclave(Box<Enclave>),
    Text(String),
    Code(String),
    Html(String),
    SoftBreak,
    HardBreak,
    Rule,
}

impl NodeKind {
    /// Tag of this kind, without payload.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Document => Kind::Document,
            Self::Paragraph => Kind::Paragraph,
            Self::Heading { .. } => Kind::Heading,
            Self::BlockQuote { .. } => Kind::BlockQuote,
            Self::CodeBlock { .. } => Kind::CodeBlock,
            Self::List { .. } => Kind::List,
            Self::Item => Kind::Item,
            Self::TaskListMarker { .. } => Kind::TaskListMarker,
            Self::Table => Kind::Table,
            Self::TableHead => Kind::TableHead,
            Self::TableRow => Kind::TableRow,
            Self::TableCell { .. } => Kind::TableCell,
            Self::DefinitionList => Kind::DefinitionList,
            Self::DefinitionTitle => Kind::DefinitionTitle,
            Self::DefinitionDetails => Kind::DefinitionDetails,
            Self::Emphasis => Kind::Emphasis,
            Self::Strong => Kind::Strong,
            Self::Strikethrough => Kind::Strikethrough,
            Self::Superscript => Kind::Superscript,
            Self::Subscript => Kind::Subscript,
            Self::Link { .. } => Kind::Link,
            Self::Image { .. } => Kind::Image,
            Self::Enclave(_) => Kind::Enclave,
            Self::Text(_) => Kind::Text,
            Self::Code(_) => Kind::Code,
            Self::Html(_) => Kind::Html,
            Self::SoftBreak => Kind::SoftBreak,
            Self::HardBreak => Kind::HardBreak,
            Self::Rule => Kind::Rule,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }
}

/// Parsed markdown document.
///
/// The root node (a [`NodeKind::Document`]) is created with the document and
/// can never be detached or replaced.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document containing only the root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
        }
    }

    /// The root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.0].kind
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].first_child
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].last_child
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].next_sibling
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].prev_sibling
    }

    /// Whether the node is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = id;
        loop {
            if current == self.root() {
                return true;
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// Allocate a detached node.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(kind));
        id
    }

    /// Append a detached node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` is already linked into a tree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.assert_detached(child);
        let last = self.nodes[parent.0].last_child;
        {
            let node = &mut self.nodes[child.0];
            node.parent = Some(parent);
            node.prev_sibling = last;
        }
        match last {
            Some(last) => self.nodes[last.0].next_sibling = Some(child),
            None => self.nodes[parent.0].first_child = Some(child),
        }
        self.nodes[parent.0].last_child = Some(child);
    }

    /// Insert a detached node immediately before `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if `sibling` has no parent or `new` is already linked.
    pub fn insert_before(&mut self, sibling: NodeId, new: NodeId) {
        self.assert_detached(new);
        let parent = self.require_parent(sibling);
        let prev = self.nodes[sibling.0].prev_sibling;
        {
            let node = &mut self.nodes[new.0];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(sibling);
        }
        self.nodes[sibling.0].prev_sibling = Some(new);
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(new),
            None => self.nodes[parent.0].first_child = Some(new),
        }
    }

    /// Insert a detached node immediately after `sibling`.
    ///
    /// # Panics
    ///
    /// Panics if `sibling` has no parent or `new` is already linked.
    pub fn insert_after(&mut self, sibling: NodeId, new: NodeId) {
        self.assert_detached(new);
        let parent = self.require_parent(sibling);
        let next = self.nodes[sibling.0].next_sibling;
        {
            let node = &mut self.nodes[new.0];
            node.parent = Some(parent);
            node.prev_sibling = Some(sibling);
            node.next_sibling = next;
        }
        self.nodes[sibling.0].next_sibling = Some(new);
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = Some(new),
            None => self.nodes[parent.0].last_child = Some(new),
        }
    }

    /// Put the detached node `new` at the exact position of `old`.
    ///
    /// `new` takes over the parent and both sibling links of `old`; `old` is
    /// left detached with its own children untouched.
    ///
    /// # Panics
    ///
    /// Panics if `old` has no parent or `new` is already linked.
    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        self.assert_detached(new);
        let parent = self.require_parent(old);
        let prev = self.nodes[old.0].prev_sibling;
        let next = self.nodes[old.0].next_sibling;
        {
            let node = &mut self.nodes[new.0];
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = next;
        }
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = Some(new),
            None => self.nodes[parent.0].first_child = Some(new),
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = Some(new),
            None => self.nodes[parent.0].last_child = Some(new),
        }
        self.unlink_fields(old);
    }

    /// Unlink a node (and its subtree) from its parent.
    ///
    /// Detaching an already detached node is a no-op.
    ///
    /// # Panics
    ///
    /// Panics when called on the root.
    pub fn detach(&mut self, id: NodeId) {
        assert!(id != self.root(), "the document root cannot be detached");
        let Some(parent) = self.nodes[id.0].parent else {
            return;
        };
        let prev = self.nodes[id.0].prev_sibling;
        let next = self.nodes[id.0].next_sibling;
        match prev {
            Some(prev) => self.nodes[prev.0].next_sibling = next,
            None => self.nodes[parent.0].first_child = next,
        }
        match next {
            Some(next) => self.nodes[next.0].prev_sibling = prev,
            None => self.nodes[parent.0].last_child = prev,
        }
        self.unlink_fields(id);
    }

    /// Detach every child of `id`.
    pub fn remove_children(&mut self, id: NodeId) {
        let mut child = self.first_child(id);
        while let Some(current) = child {
            child = self.next_sibling(current);
            self.unlink_fields(current);
        }
        let node = &mut self.nodes[id.0];
        node.first_child = None;
        node.last_child = None;
    }

    /// Move all children of `from` to the end of `to`, keeping their order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let mut child = self.first_child(from);
        while let Some(current) = child {
            child = self.next_sibling(current);
            self.detach(current);
            self.append_child(to, current);
        }
    }

    /// Iterate over the direct children of `id`.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.first_child(id),
        }
    }

    /// Iterate over `id` and all of its descendants in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            doc: self,
            root: id,
            next: Some(id),
        }
    }

    /// Next node in pre-order after `id`, bounded by the subtree at `root`.
    ///
    /// With `descend == false` the children of `id` are skipped.
    #[must_use]
    pub fn next_in_preorder(&self, id: NodeId, root: NodeId, descend: bool) -> Option<NodeId> {
        if descend && let Some(child) = self.first_child(id) {
            return Some(child);
        }
        let mut current = id;
        loop {
            if current == root {
                return None;
            }
            if let Some(next) = self.next_sibling(current) {
                return Some(next);
            }
            current = self.parent(current)?;
        }
    }

    /// Concatenated text and inline code of the subtree at `id`.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            match self.kind(node) {
                NodeKind::Text(t) | NodeKind::Code(t) => text.push_str(t),
                NodeKind::SoftBreak | NodeKind::HardBreak => text.push(' '),
                _ => {}
            }
        }
        text
    }

    fn require_parent(&self, id: NodeId) -> NodeId {
        match self.nodes[id.0].parent {
            Some(parent) => parent,
            None => panic!("node {} has no parent", id.0),
        }
    }

    fn assert_detached(&self, id: NodeId) {
        let node = &self.nodes[id.0];
        assert!(
            id != self.root()
                && node.parent.is_none()
                && node.prev_sibling.is_none()
                && node.next_sibling.is_none(),
            "node {} is already linked into a tree",
            id.0
        );
    }

    fn unlink_fields(&mut self, id: NodeId) {
        let node = &mut self.nodes[id.0];
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the direct children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_sibling(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
pub struct Descendants<'a> {
    doc: &'a Document,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.doc.next_in_preorder(current, self.root, true);
        Some(current)
    }
}
