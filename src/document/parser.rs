//! YAML parsing into [`Document`] trees.
//!
//! Parsing is driven by the yaml-rust2 event parser. Unlike the yaml-rust2
//! loader, aliases are kept as alias nodes instead of being expanded, so path
//! queries can decide whether to follow them.
//!
//! The event stream only carries numeric anchor ids. Anchor names come from a
//! token pass over the same source: the parser numbers anchors from 1 in the
//! order the scanner reports them, so the n-th anchor token is anchor n.
//!
//! # Example
//!
//! ```
//! use ypath::document::parser::parse_yaml;
//!
//! let doc = parse_yaml("base: &b {port: 80}\nprod: *b\n").unwrap();
//! let prod = doc.root().unwrap().get("prod").unwrap();
//! assert_eq!(prod.alias_target(), Some("b"));
//! assert!(doc.lookup_anchor("b").is_some());
//! ```

use super::node::{NodeData, NodeId, ScalarStyle};
use super::tree::Document;
use thiserror::Error;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Scanner, TScalarStyle, Token, TokenType};

/// Errors raised while building a document from YAML text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The YAML text is malformed
    #[error("YAML syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
}

/// Parses the first document of a YAML stream into a [`Document`].
///
/// An empty stream yields a document without a root.
///
/// # Errors
///
/// Returns [`DocumentError::Syntax`] when yaml-rust2 rejects the input, for
/// instance on an alias to an anchor that was never defined.
pub fn parse_yaml(source: &str) -> Result<Document, DocumentError> {
    let mut builder = TreeBuilder::new(source);
    let mut parser = Parser::new_from_str(source);

    parser
        .load(&mut builder, false)
        .map_err(|err| DocumentError::Syntax {
            message: err.info().to_string(),
            line: err.marker().line(),
            column: err.marker().col() + 1,
        })?;

    log::debug!(
        "parsed YAML document: {} nodes, {} anchors",
        builder.doc.len(),
        builder.anchor_names.len()
    );

    Ok(builder.doc)
}

/// A collection whose items are still being received.
enum Frame {
    Sequence {
        id: NodeId,
        items: Vec<NodeId>,
    },
    Mapping {
        id: NodeId,
        pairs: Vec<(NodeId, NodeId)>,
        pending_key: Option<NodeId>,
    },
}

struct TreeBuilder {
    doc: Document,
    stack: Vec<Frame>,
    anchor_names: Vec<String>,
    finished: bool,
}

impl TreeBuilder {
    fn new(source: &str) -> Self {
        Self {
            doc: Document::new(),
            stack: Vec::new(),
            anchor_names: scan_anchor_names(source),
            finished: false,
        }
    }

    fn anchor_name(&self, anchor_id: usize) -> String {
        match self.anchor_names.get(anchor_id.wrapping_sub(1)) {
            Some(name) => name.clone(),
            None => {
                log::warn!("no source name found for anchor #{}", anchor_id);
                format!("anchor-{}", anchor_id)
            }
        }
    }

    /// Applies anchor and tag properties of a freshly created node.
    fn decorate(&mut self, id: NodeId, anchor_id: usize, tag: Option<Tag>) {
        if anchor_id > 0 {
            let name = self.anchor_name(anchor_id);
            self.doc.set_anchor(id, name);
        }
        if let Some(tag) = tag {
            self.doc.set_tag(id, format!("{}{}", tag.handle, tag.suffix));
        }
    }

    /// Hands a completed node to the enclosing collection, or makes it the root.
    fn attach(&mut self, id: NodeId) {
        match self.stack.last_mut() {
            None => {
                if self.doc.root_id().is_none() {
                    self.doc.set_root(id);
                }
            }
            Some(Frame::Sequence { items, .. }) => items.push(id),
            Some(Frame::Mapping {
                pairs, pending_key, ..
            }) => match pending_key.take() {
                None => *pending_key = Some(id),
                Some(key) => pairs.push((key, id)),
            },
        }
    }
}

impl EventReceiver for TreeBuilder {
    fn on_event(&mut self, ev: Event) {
        if self.finished {
            return;
        }

        match ev {
            Event::Scalar(text, style, anchor_id, tag) => {
                let id = self.doc.add_scalar_with_style(text, scalar_style(style));
                self.decorate(id, anchor_id, tag);
                self.attach(id);
            }
            Event::Alias(anchor_id) => {
                let name = self.anchor_name(anchor_id);
                let id = self.doc.add_alias(name);
                self.attach(id);
            }
            Event::SequenceStart(anchor_id, tag) => {
                let id = self.doc.add_sequence(Vec::new());
                self.decorate(id, anchor_id, tag);
                self.stack.push(Frame::Sequence {
                    id,
                    items: Vec::new(),
                });
            }
            Event::MappingStart(anchor_id, tag) => {
                let id = self.doc.add_mapping(Vec::new());
                self.decorate(id, anchor_id, tag);
                self.stack.push(Frame::Mapping {
                    id,
                    pairs: Vec::new(),
                    pending_key: None,
                });
            }
            Event::SequenceEnd | Event::MappingEnd => {
                if let Some(frame) = self.stack.pop() {
                    let id = match frame {
                        Frame::Sequence { id, items } => {
                            self.doc.fill(id, NodeData::Sequence(items));
                            id
                        }
                        Frame::Mapping { id, pairs, .. } => {
                            self.doc.fill(id, NodeData::Mapping(pairs));
                            id
                        }
                    };
                    self.attach(id);
                }
            }
            Event::DocumentEnd => self.finished = true,
            _ => {}
        }
    }
}

fn scalar_style(style: TScalarStyle) -> ScalarStyle {
    match style {
        TScalarStyle::SingleQuoted => ScalarStyle::SingleQuoted,
        TScalarStyle::DoubleQuoted => ScalarStyle::DoubleQuoted,
        TScalarStyle::Literal => ScalarStyle::Literal,
        TScalarStyle::Folded => ScalarStyle::Folded,
        _ => ScalarStyle::Plain,
    }
}

/// Returns anchor names in the order the scanner meets them, which is the
/// order the event parser numbers anchors in.
fn scan_anchor_names(source: &str) -> Vec<String> {
    Scanner::new(source.chars())
        .filter_map(|Token(_, token)| match token {
            TokenType::Anchor(name) => Some(name),
            _ => None,
        })
        .collect()
}
