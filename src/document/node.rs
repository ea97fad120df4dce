//! Node storage for YAML document trees.
//!
//! Nodes live in a [`Document`](super::tree::Document) arena and refer to each
//! other through [`NodeId`] handles. A node knows its parent, so walking up the
//! tree never needs a second owning reference.

use std::fmt;

/// Handle of a node inside its owning document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Returns the arena slot of this node.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The runtime kind of a document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
    Alias,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Scalar => "scalar",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
            NodeKind::Alias => "alias",
        }
    }

    /// Returns true for sequences and mappings.
    pub fn is_collection(self) -> bool {
        matches!(self, NodeKind::Sequence | NodeKind::Mapping)
    }
}

/// How a scalar was written in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
    Folded,
}

/// The payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeData {
    /// Scalar text exactly as decoded by the YAML parser (no type resolution)
    Scalar { text: String, style: ScalarStyle },
    /// Ordered sequence items
    Sequence(Vec<NodeId>),
    /// Ordered key/value pairs; keys are nodes so complex keys are possible
    Mapping(Vec<(NodeId, NodeId)>),
    /// Reference to an anchor by name
    Alias(String),
}

/// A node stored in a document arena.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) anchor: Option<String>,
    pub(crate) tag: Option<String>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            anchor: None,
            tag: None,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Scalar { .. } => NodeKind::Scalar,
            NodeData::Sequence(_) => NodeKind::Sequence,
            NodeData::Mapping(_) => NodeKind::Mapping,
            NodeData::Alias(_) => NodeKind::Alias,
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the anchor name if this node has one.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Returns the resolved tag (handle prefix + suffix) if one was given.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Returns the scalar text, or `None` for non-scalars.
    pub fn text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Scalar { text, .. } => Some(text),
            _ => None,
        }
    }

    /// Returns the anchor name an alias node points at.
    pub fn alias_target(&self) -> Option<&str> {
        match &self.data {
            NodeData::Alias(name) => Some(name),
            _ => None,
        }
    }
}
