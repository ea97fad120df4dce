//! Expression trees produced by the path parser.
//!
//! An [`ExpressionTree`] is an arena of [`ExprNode`]s. Children are listed by
//! [`ExprId`] in evaluation order; the parent id kept on each node is a plain
//! back-reference used for diagnostics. Trees are never mutated after parsing
//! and can be shared between threads and evaluated any number of times.

use super::token::{Mark, Span};
use super::utf8::{format_escaped, EscapePolicy};
use crate::document::tree::Document;
use std::fmt;
use std::fmt::Write as _;

/// Handle of a node inside its [`ExpressionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExprId(pub(crate) usize);

impl ExprId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The kind of an expression node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprKind {
    Root,
    This,
    Parent,
    EveryChild,
    EveryChildR,
    FilterCollection,
    FilterScalar,
    FilterSequence,
    FilterMapping,
    SeqIndex,
    SeqSlice,
    MapKey,
    Alias,
    Multi,
    Chain,
    LogicalOr,
    LogicalAnd,
}

/// Display names of every kind, indexed by discriminant.
pub const KIND_NAMES: [&str; 17] = [
    "root",
    "this",
    "parent",
    "every-child",
    "every-child-r",
    "filter-collection",
    "filter-scalar",
    "filter-sequence",
    "filter-mapping",
    "seq-index",
    "seq-slice",
    "map-key",
    "alias",
    "multi",
    "chain",
    "logical-or",
    "logical-and",
];

impl ExprKind {
    pub fn name(self) -> &'static str {
        KIND_NAMES[self as usize]
    }

    /// Combinators own one or more children; every other kind is a leaf.
    pub fn is_combinator(self) -> bool {
        matches!(
            self,
            ExprKind::Multi | ExprKind::Chain | ExprKind::LogicalOr | ExprKind::LogicalAnd
        )
    }

    /// Leaves that contribute at most one node per input node.
    pub fn is_single_result(self) -> bool {
        !self.is_combinator()
            && !matches!(
                self,
                ExprKind::EveryChild | ExprKind::EveryChildR | ExprKind::SeqSlice
            )
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A `start:end:stride` slice. Missing bounds default to the sequence bounds
/// in the direction of the stride.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// Never zero
    pub stride: i64,
}

impl Slice {
    /// Returns the selected positions of a sequence of length `len`, in
    /// emission order.
    ///
    /// Negative bounds count from the end and bounds are clamped, so a slice
    /// never selects a position outside the sequence.
    ///
    /// # Example
    ///
    /// ```
    /// use ypath::ypath::ast::Slice;
    ///
    /// let every_other = Slice { start: None, end: None, stride: 2 };
    /// assert_eq!(every_other.indices(5), vec![0, 2, 4]);
    ///
    /// let reversed = Slice { start: None, end: None, stride: -1 };
    /// assert_eq!(reversed.indices(3), vec![2, 1, 0]);
    /// ```
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let len = len as i64;
        let step = self.stride;
        if step == 0 {
            return Vec::new();
        }

        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };
        let clamp = |bound: i64| {
            if bound < 0 {
                (bound + len).max(lower)
            } else {
                bound.min(upper)
            }
        };

        let start = self
            .start
            .map(clamp)
            .unwrap_or(if step > 0 { lower } else { upper });
        let end = self
            .end
            .map(clamp)
            .unwrap_or(if step > 0 { upper } else { lower });

        let mut out = Vec::new();
        let mut i = start;
        while (step > 0 && i < end) || (step < 0 && i > end) {
            out.push(i as usize);
            match i.checked_add(step) {
                Some(next) => i = next,
                None => break,
            }
        }
        out
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        f.write_str(":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        write!(f, ":{}", self.stride)
    }
}

/// The key a `map-key` step looks up.
#[derive(Debug, Clone, PartialEq)]
pub enum MapKey {
    /// Matches scalar keys by text
    Simple(String),
    /// A `{ ... }` literal, compared structurally with the document's keys
    Complex { text: String, key: Document },
}

/// Payload and kind of an expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprData {
    Root,
    This,
    Parent,
    EveryChild,
    EveryChildR,
    FilterCollection,
    FilterScalar,
    FilterSequence,
    FilterMapping,
    SeqIndex(i64),
    SeqSlice(Slice),
    MapKey(MapKey),
    Alias(String),
    Multi,
    Chain,
    LogicalOr,
    LogicalAnd,
}

impl ExprData {
    pub fn kind(&self) -> ExprKind {
        match self {
            ExprData::Root => ExprKind::Root,
            ExprData::This => ExprKind::This,
            ExprData::Parent => ExprKind::Parent,
            ExprData::EveryChild => ExprKind::EveryChild,
            ExprData::EveryChildR => ExprKind::EveryChildR,
            ExprData::FilterCollection => ExprKind::FilterCollection,
            ExprData::FilterScalar => ExprKind::FilterScalar,
            ExprData::FilterSequence => ExprKind::FilterSequence,
            ExprData::FilterMapping => ExprKind::FilterMapping,
            ExprData::SeqIndex(_) => ExprKind::SeqIndex,
            ExprData::SeqSlice(_) => ExprKind::SeqSlice,
            ExprData::MapKey(_) => ExprKind::MapKey,
            ExprData::Alias(_) => ExprKind::Alias,
            ExprData::Multi => ExprKind::Multi,
            ExprData::Chain => ExprKind::Chain,
            ExprData::LogicalOr => ExprKind::LogicalOr,
            ExprData::LogicalAnd => ExprKind::LogicalAnd,
        }
    }

    /// Builds the payload-free data of a combinator kind.
    pub(crate) fn combinator(kind: ExprKind) -> Option<ExprData> {
        match kind {
            ExprKind::Multi => Some(ExprData::Multi),
            ExprKind::Chain => Some(ExprData::Chain),
            ExprKind::LogicalOr => Some(ExprData::LogicalOr),
            ExprKind::LogicalAnd => Some(ExprData::LogicalAnd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprNode {
    pub(crate) data: ExprData,
    pub(crate) parent: Option<ExprId>,
    pub(crate) children: Vec<ExprId>,
    pub(crate) span: Span,
}

impl ExprNode {
    pub fn kind(&self) -> ExprKind {
        self.data.kind()
    }

    pub fn data(&self) -> &ExprData {
        &self.data
    }

    pub fn parent(&self) -> Option<ExprId> {
        self.parent
    }

    pub fn children(&self) -> &[ExprId] {
        &self.children
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

/// A parsed path expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    pub(crate) nodes: Vec<ExprNode>,
    pub(crate) root: ExprId,
    pub(crate) source: String,
}

impl ExpressionTree {
    /// The path text this tree was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> ExprId {
        self.root
    }

    pub fn node(&self, id: ExprId) -> &ExprNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: ExprId) -> Option<&ExprNode> {
        self.nodes.get(id.0)
    }

    pub fn kind(&self, id: ExprId) -> ExprKind {
        self.node(id).kind()
    }

    pub fn children(&self, id: ExprId) -> &[ExprId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: ExprId) -> Option<ExprId> {
        self.node(id).parent
    }

    /// Position of the first character of the node in the path text.
    pub fn start_mark(&self, id: ExprId) -> Mark {
        self.node(id).span.start
    }

    /// Position just after the last character of the node.
    pub fn end_mark(&self, id: ExprId) -> Mark {
        self.node(id).span.end
    }

    /// Number of nodes in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders the tree one node per line, children indented under their
    /// parent.
    ///
    /// # Example
    ///
    /// ```
    /// let tree = ypath::ypath::parse("/a,/b").unwrap();
    /// assert_eq!(
    ///     tree.dump(),
    ///     "multi\n  chain\n    root\n    map-key \"a\"\n  chain\n    root\n    map-key \"b\"\n"
    /// );
    /// ```
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_node(self.root, 0, &mut out);
        out
    }

    fn dump_node(&self, id: ExprId, depth: usize, out: &mut String) {
        let node = self.node(id);
        let _ = write!(out, "{:indent$}{}", "", node.kind(), indent = depth * 2);
        match &node.data {
            ExprData::SeqIndex(index) => {
                let _ = write!(out, " {}", index);
            }
            ExprData::SeqSlice(slice) => {
                let _ = write!(out, " {}", slice);
            }
            ExprData::MapKey(MapKey::Simple(key)) => {
                let escaped: String = key
                    .chars()
                    .map(|c| format_escaped(c, EscapePolicy::DoubleQuoted))
                    .collect();
                let _ = write!(out, " \"{}\"", escaped);
            }
            ExprData::MapKey(MapKey::Complex { text, .. }) => {
                let _ = write!(out, " {{{}}}", text);
            }
            ExprData::Alias(name) => {
                let _ = write!(out, " *{}", name);
            }
            _ => {}
        }
        out.push('\n');
        for child in &node.children {
            self.dump_node(*child, depth + 1, out);
        }
    }
}

impl fmt::Display for ExpressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dump())
    }
}
