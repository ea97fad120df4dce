//! YPath compiler and executor for structural YAML queries.
//!
//! A path expression is compiled into an [`ExpressionTree`] by [`parse`] and
//! evaluated against a [`Document`] node by [`execute`], which returns the
//! matched nodes in evaluation order.
//!
//! # Supported Syntax
//!
//! - `/` - Root at the start of an expression, step separator in between,
//!   collection filter at the end
//! - `^` - Root
//! - `.` / `..` - This node / parent node
//! - `*` / `**` - Every child / the node and every descendant
//! - `name`, `"quoted"`, `'quoted'` - Mapping key
//! - `{ key }` - Key literal in YAML flow syntax, e.g. `{ [1, 2] }` or `{ !!str 1 }`
//! - `:name` - Sibling (parent, then key)
//! - `3`, `-1`, `[3]` - Sequence index (negative counts from the end)
//! - `[0, 2]` - Several indices
//! - `1:3`, `[start:end:stride]` - Slice, any part may be omitted
//! - `$` `%` `[]` `{}` - Keep scalars / collections / sequences / mappings
//! - `*anchor`, `&anchor` - Node with that anchor
//! - `a, b` - Both results, concatenated
//! - `a & b` - Result of `b` if both match (`&&` also accepted)
//! - `a | b` - Result of `a` if it matches, else `b` (`||` also accepted)
//! - `( ... )` - Grouping
//!
//! `,` binds tighter than `&`, which binds tighter than `|`.
//!
//! # Examples
//!
//! ```
//! use ypath::document::tree::Document;
//!
//! let doc = Document::parse_str("a: 1\nb: 2\nc: 3\n").unwrap();
//! let found = ypath::ypath::query(&doc, "/a,/c").unwrap();
//! let texts: Vec<_> = found.iter().map(|n| n.text().unwrap()).collect();
//! assert_eq!(texts, vec!["1", "3"]);
//!
//! // /servers/*/host      - every server's host
//! // /**/$                - every scalar in the document
//! // /defaults | /fallback - the first of the two that exists
//! ```

pub mod ast;
pub mod error;
pub mod executor;
pub mod lexer;
pub mod parser;
pub mod results;
pub mod tag;
pub mod token;
pub mod utf8;

pub use ast::{ExprId, ExprKind, ExpressionTree};
pub use error::{ExecError, LexError, ParseError, YPathError};
pub use executor::{execute, ExecConfig, PathExecutor};
pub use token::Mark;

use crate::document::tree::{Document, NodeRef};

/// Compiles path text into an expression tree.
pub fn parse(text: &str) -> Result<ExpressionTree, ParseError> {
    parse_bytes(text.as_bytes())
}

/// Compiles path text given as raw bytes. Malformed UTF-8 is reported as a
/// [`LexError`] at its position.
pub fn parse_bytes(bytes: &[u8]) -> Result<ExpressionTree, ParseError> {
    let tree = parser::Parser::new(bytes).parse()?;
    log::debug!(
        "parsed path '{}' into {} expression node(s)",
        tree.source(),
        tree.len()
    );
    log::trace!("expression tree:\n{}", tree.dump());
    Ok(tree)
}

/// Parses `path` and evaluates it from the document root with the default
/// configuration. A document without a root matches nothing.
pub fn query<'d>(doc: &'d Document, path: &str) -> Result<Vec<NodeRef<'d>>, YPathError> {
    let tree = parse(path)?;
    match doc.root() {
        Some(root) => Ok(execute(&tree, root, &ExecConfig::default())?),
        None => Ok(Vec::new()),
    }
}
