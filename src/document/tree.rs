//! Arena-backed YAML document trees.
//!
//! A [`Document`] owns every node it contains. Nodes refer to their children
//! and to their parent through [`NodeId`] handles, and the document keeps the
//! anchor registry used to resolve aliases.
//!
//! # Example
//!
//! ```
//! use ypath::document::tree::Document;
//!
//! let mut doc = Document::new();
//! let one = doc.add_scalar("1");
//! let two = doc.add_scalar("2");
//! let items = doc.add_sequence(vec![one, two]);
//! let key = doc.add_scalar("items");
//! let root = doc.add_mapping(vec![(key, items)]);
//! doc.set_root(root);
//!
//! let items = doc.root().unwrap().get("items").unwrap();
//! assert_eq!(items.children().len(), 2);
//! assert_eq!(items.children()[1].parent(), Some(items));
//! ```

use super::node::{Node, NodeData, NodeId, NodeKind, ScalarStyle};
use indexmap::IndexMap;
use std::fmt;
use std::ptr;

/// A complete YAML document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    anchors: IndexMap<String, NodeId>,
}

impl Document {
    /// Creates an empty document with no root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the first document of a YAML stream.
    ///
    /// See [`parse_yaml`](super::parser::parse_yaml).
    pub fn parse_str(source: &str) -> Result<Self, super::parser::DocumentError> {
        super::parser::parse_yaml(source)
    }

    /// Returns the root node, or `None` for an empty document.
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.root.map(|id| self.node(id))
    }

    pub fn root_id(&self) -> Option<NodeId> {
        self.root
    }

    /// Makes `id` the document root. The root has no parent.
    pub fn set_root(&mut self, id: NodeId) {
        self.nodes[id.0].parent = None;
        self.root = Some(id);
    }

    /// Number of nodes stored in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a handle to a node of this document.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this document.
    pub fn node(&self, id: NodeId) -> NodeRef<'_> {
        assert!(id.0 < self.nodes.len(), "node {} is not part of this document", id);
        NodeRef { doc: self, id }
    }

    /// Returns the stored node, or `None` if `id` is out of range.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Adds a plain scalar.
    pub fn add_scalar(&mut self, text: impl Into<String>) -> NodeId {
        self.add_scalar_with_style(text, ScalarStyle::Plain)
    }

    pub fn add_scalar_with_style(&mut self, text: impl Into<String>, style: ScalarStyle) -> NodeId {
        self.push(Node::new(NodeData::Scalar {
            text: text.into(),
            style,
        }))
    }

    /// Adds a sequence owning `items`, which become its children in order.
    pub fn add_sequence(&mut self, items: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        for item in &items {
            self.nodes[item.0].parent = Some(id);
        }
        self.push(Node::new(NodeData::Sequence(items)))
    }

    /// Adds a mapping owning the given key/value pairs, in order.
    pub fn add_mapping(&mut self, pairs: Vec<(NodeId, NodeId)>) -> NodeId {
        let id = NodeId(self.nodes.len());
        for (key, value) in &pairs {
            self.nodes[key.0].parent = Some(id);
            self.nodes[value.0].parent = Some(id);
        }
        self.push(Node::new(NodeData::Mapping(pairs)))
    }

    /// Replaces the payload of a collection created empty, adopting its
    /// children. Lets the YAML loader allocate a collection before its items.
    pub(crate) fn fill(&mut self, id: NodeId, data: NodeData) {
        match &data {
            NodeData::Sequence(items) => {
                for item in items {
                    self.nodes[item.0].parent = Some(id);
                }
            }
            NodeData::Mapping(pairs) => {
                for (key, value) in pairs {
                    self.nodes[key.0].parent = Some(id);
                    self.nodes[value.0].parent = Some(id);
                }
            }
            _ => {}
        }
        self.nodes[id.0].data = data;
    }

    /// Adds an alias node referring to anchor `name`.
    pub fn add_alias(&mut self, name: impl Into<String>) -> NodeId {
        self.push(Node::new(NodeData::Alias(name.into())))
    }

    /// Names node `id` with an anchor. A later anchor with the same name
    /// replaces the earlier registration.
    pub fn set_anchor(&mut self, id: NodeId, name: impl Into<String>) {
        let name = name.into();
        self.nodes[id.0].anchor = Some(name.clone());
        self.anchors.insert(name, id);
    }

    pub fn set_tag(&mut self, id: NodeId, tag: impl Into<String>) {
        self.nodes[id.0].tag = Some(tag.into());
    }

    /// Looks up the node registered under anchor `name`.
    pub fn lookup_anchor(&self, name: &str) -> Option<NodeId> {
        self.anchors.get(name).copied()
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.nodes[id.0].kind()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Returns the immediate children of a node in declared order: sequence
    /// items, or mapping values. Scalars and aliases have none.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id.0].data {
            NodeData::Sequence(items) => items.clone(),
            NodeData::Mapping(pairs) => pairs.iter().map(|(_, value)| *value).collect(),
            _ => Vec::new(),
        }
    }

    /// Returns the items of a sequence node, `None` for other kinds.
    pub fn sequence_items(&self, id: NodeId) -> Option<&[NodeId]> {
        match &self.nodes[id.0].data {
            NodeData::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the pairs of a mapping node, `None` for other kinds.
    pub fn mapping_pairs(&self, id: NodeId) -> Option<&[(NodeId, NodeId)]> {
        match &self.nodes[id.0].data {
            NodeData::Mapping(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Finds the value stored under a scalar key with the given text.
    pub fn lookup_by_simple_key(&self, mapping: NodeId, key: &str) -> Option<NodeId> {
        self.mapping_pairs(mapping)?
            .iter()
            .find(|(k, _)| self.nodes[k.0].text() == Some(key))
            .map(|(_, v)| *v)
    }

    /// Finds the value whose key is structurally equal to node `key` of the
    /// (possibly different) document `probe`.
    pub fn lookup_by_key(&self, mapping: NodeId, probe: &Document, key: NodeId) -> Option<NodeId> {
        self.mapping_pairs(mapping)?
            .iter()
            .find(|(k, _)| self.nodes_equal(*k, probe, key))
            .map(|(_, v)| *v)
    }

    /// Structural comparison of node `a` of this document with node `b` of
    /// `other`.
    ///
    /// Scalars compare by text, sequences item by item, mappings as unordered
    /// sets of pairs and aliases by anchor name. A tag on `b` must be matched
    /// by the same tag on `a`; an untagged `b` accepts any tag.
    pub fn nodes_equal(&self, a: NodeId, other: &Document, b: NodeId) -> bool {
        let na = &self.nodes[a.0];
        let nb = &other.nodes[b.0];

        if let Some(tag) = nb.tag() {
            if na.tag() != Some(tag) {
                return false;
            }
        }

        match (&na.data, &nb.data) {
            (NodeData::Scalar { text: ta, .. }, NodeData::Scalar { text: tb, .. }) => ta == tb,
            (NodeData::Alias(x), NodeData::Alias(y)) => x == y,
            (NodeData::Sequence(xs), NodeData::Sequence(ys)) => {
                xs.len() == ys.len()
                    && xs
                        .iter()
                        .zip(ys.iter())
                        .all(|(x, y)| self.nodes_equal(*x, other, *y))
            }
            (NodeData::Mapping(xs), NodeData::Mapping(ys)) => {
                xs.len() == ys.len()
                    && ys.iter().all(|(ky, vy)| {
                        xs.iter().any(|(kx, vx)| {
                            self.nodes_equal(*kx, other, *ky) && self.nodes_equal(*vx, other, *vy)
                        })
                    })
            }
            _ => false,
        }
    }
}

/// A borrowed handle to one node of a [`Document`].
///
/// Two handles are equal when they point at the same node of the same
/// document (identity, not structural equality).
#[derive(Clone, Copy)]
pub struct NodeRef<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl<'d> NodeRef<'d> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    fn node(&self) -> &'d Node {
        &self.doc.nodes[self.id.0]
    }

    pub fn kind(&self) -> NodeKind {
        self.node().kind()
    }

    pub fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }

    pub fn is_sequence(&self) -> bool {
        self.kind() == NodeKind::Sequence
    }

    pub fn is_mapping(&self) -> bool {
        self.kind() == NodeKind::Mapping
    }

    pub fn is_alias(&self) -> bool {
        self.kind() == NodeKind::Alias
    }

    pub fn parent(&self) -> Option<NodeRef<'d>> {
        self.node().parent.map(|id| self.doc.node(id))
    }

    /// Sequence items or mapping values, in declared order.
    pub fn children(&self) -> Vec<NodeRef<'d>> {
        self.doc
            .children(self.id)
            .into_iter()
            .map(|id| self.doc.node(id))
            .collect()
    }

    /// Mapping key/value pairs in declared order; empty for other kinds.
    pub fn pairs(&self) -> Vec<(NodeRef<'d>, NodeRef<'d>)> {
        self.doc
            .mapping_pairs(self.id)
            .unwrap_or(&[])
            .iter()
            .map(|(k, v)| (self.doc.node(*k), self.doc.node(*v)))
            .collect()
    }

    /// Looks up a mapping value by scalar key text.
    pub fn get(&self, key: &str) -> Option<NodeRef<'d>> {
        self.doc
            .lookup_by_simple_key(self.id, key)
            .map(|id| self.doc.node(id))
    }

    /// Returns the sequence item at `index`.
    pub fn item(&self, index: usize) -> Option<NodeRef<'d>> {
        self.doc
            .sequence_items(self.id)?
            .get(index)
            .map(|id| self.doc.node(*id))
    }

    pub fn text(&self) -> Option<&'d str> {
        self.node().text()
    }

    pub fn style(&self) -> Option<ScalarStyle> {
        match self.node().data {
            NodeData::Scalar { style, .. } => Some(style),
            _ => None,
        }
    }

    pub fn tag(&self) -> Option<&'d str> {
        self.node().tag()
    }

    pub fn anchor(&self) -> Option<&'d str> {
        self.node().anchor()
    }

    pub fn alias_target(&self) -> Option<&'d str> {
        self.node().alias_target()
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("NodeRef");
        s.field("id", &self.id).field("kind", &self.kind());
        if let Some(text) = self.text() {
            s.field("text", &text);
        }
        if let Some(target) = self.alias_target() {
            s.field("alias", &target);
        }
        s.finish()
    }
}
