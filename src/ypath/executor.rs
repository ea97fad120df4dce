//! Tree-walking evaluation of expression trees against a document.
//!
//! Evaluation is set-at-a-time: every node maps an ordered list of input
//! document nodes to an ordered list of output nodes, starting from the
//! single start node. Results keep duplicates and follow evaluation order.
//! An empty result means "no match"; [`ExecError`] is reserved for broken
//! aliases and runaway recursion.
//!
//! # Example
//!
//! ```
//! use ypath::document::tree::Document;
//! use ypath::ypath::executor::{execute, ExecConfig};
//! use ypath::ypath::parse;
//!
//! let doc = Document::parse_str("a: {b: [1, 2, 3]}").unwrap();
//! let tree = parse("/a/b/[1]").unwrap();
//! let found = execute(&tree, doc.root().unwrap(), &ExecConfig::default()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].text(), Some("2"));
//! ```

use super::ast::{ExprData, ExprId, ExpressionTree, MapKey};
use super::error::{ExecError, ExecResult};
use super::results::MergePolicy;
use crate::document::node::{NodeId, NodeKind};
use crate::document::tree::{Document, NodeRef};

/// Default limit on nested evaluation and descendant walks.
pub const DEFAULT_MAX_RECURSION_DEPTH: usize = 256;

/// Options controlling one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecConfig {
    /// Replace alias nodes reached by navigation with their anchor target
    pub follow_aliases: bool,
    /// Deepest nesting of evaluation plus descendant levels before
    /// [`ExecError::DepthExceeded`]
    pub max_recursion_depth: usize,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            follow_aliases: true,
            max_recursion_depth: DEFAULT_MAX_RECURSION_DEPTH,
        }
    }
}

/// Evaluates `tree` starting at `start` and returns the matched nodes.
pub fn execute<'d>(
    tree: &ExpressionTree,
    start: NodeRef<'d>,
    config: &ExecConfig,
) -> ExecResult<Vec<NodeRef<'d>>> {
    let doc = start.document();
    let walk = Walk { tree, doc, config };

    log::debug!(
        "executing '{}' from node {} (follow_aliases: {})",
        tree.source(),
        start.id(),
        config.follow_aliases
    );

    let found = walk.eval(tree.root(), vec![start.id()], 0)?;
    log::debug!("'{}' matched {} node(s)", tree.source(), found.len());
    Ok(found.into_iter().map(|id| doc.node(id)).collect())
}

/// A reusable executor holding its configuration and the results of the
/// last run.
///
/// # Example
///
/// ```
/// use ypath::document::tree::Document;
/// use ypath::ypath::executor::{ExecConfig, PathExecutor};
/// use ypath::ypath::parse;
///
/// let doc = Document::parse_str("[a, b, c]").unwrap();
/// let mut exec = PathExecutor::new(ExecConfig::default());
///
/// exec.execute(&parse("[-1]").unwrap(), doc.root().unwrap()).unwrap();
/// assert_eq!(exec.results()[0].text(), Some("c"));
///
/// exec.execute(&parse("*").unwrap(), doc.root().unwrap()).unwrap();
/// assert_eq!(exec.results().len(), 3);
/// ```
#[derive(Debug)]
pub struct PathExecutor<'d> {
    config: ExecConfig,
    results: Vec<NodeRef<'d>>,
}

impl<'d> PathExecutor<'d> {
    pub fn new(config: ExecConfig) -> Self {
        Self {
            config,
            results: Vec::new(),
        }
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    /// Runs `tree` from `start`, replacing the previous results.
    ///
    /// On error the previous results are cleared.
    pub fn execute(&mut self, tree: &ExpressionTree, start: NodeRef<'d>) -> ExecResult<&[NodeRef<'d>]> {
        self.results.clear();
        self.results = execute(tree, start, &self.config)?;
        Ok(&self.results)
    }

    /// Results of the last successful run.
    pub fn results(&self) -> &[NodeRef<'d>] {
        &self.results
    }

    /// Takes the results out, leaving the executor empty.
    pub fn take_results(&mut self) -> Vec<NodeRef<'d>> {
        std::mem::take(&mut self.results)
    }

    pub fn reset(&mut self) {
        self.results.clear();
    }
}

struct Walk<'a, 'd> {
    tree: &'a ExpressionTree,
    doc: &'d Document,
    config: &'a ExecConfig,
}

impl Walk<'_, '_> {
    fn check_depth(&self, depth: usize) -> ExecResult<()> {
        if depth > self.config.max_recursion_depth {
            return Err(ExecError::DepthExceeded {
                limit: self.config.max_recursion_depth,
            });
        }
        Ok(())
    }

    /// Replaces an alias by its anchor target when aliases are followed.
    fn resolve(&self, id: NodeId, depth: usize) -> ExecResult<NodeId> {
        if !self.config.follow_aliases {
            return Ok(id);
        }

        let mut current = id;
        let mut hops = 0;
        while let Some(name) = self.doc.node(current).alias_target() {
            self.check_depth(depth + hops)?;
            current = self
                .doc
                .lookup_anchor(name)
                .ok_or_else(|| ExecError::UnresolvedAlias {
                    name: name.to_string(),
                })?;
            hops += 1;
        }
        Ok(current)
    }

    fn eval(&self, id: ExprId, input: Vec<NodeId>, depth: usize) -> ExecResult<Vec<NodeId>> {
        self.check_depth(depth)?;
        let node = self.tree.node(id);

        log::trace!(
            "{:indent$}{} <- {} node(s)",
            "",
            node.kind(),
            input.len(),
            indent = depth * 2
        );

        let doc = self.doc;
        let mut out = if node.kind().is_single_result() {
            Vec::with_capacity(input.len())
        } else {
            Vec::new()
        };

        match node.data() {
            ExprData::Root => {
                if !input.is_empty() {
                    out.extend(doc.root_id());
                }
            }
            ExprData::This => out = input,
            ExprData::Parent => {
                out.extend(input.iter().filter_map(|n| doc.parent(*n)));
            }
            ExprData::EveryChild => {
                for n in &input {
                    for child in doc.children(*n) {
                        out.push(self.resolve(child, depth)?);
                    }
                }
            }
            ExprData::EveryChildR => {
                for n in &input {
                    out.push(*n);
                    self.descendants(*n, depth + 1, &mut out)?;
                }
            }
            ExprData::FilterCollection => {
                out = filter_kind(doc, input, |k| k.is_collection());
            }
            ExprData::FilterScalar => {
                out = filter_kind(doc, input, |k| matches!(k, NodeKind::Scalar | NodeKind::Alias));
            }
            ExprData::FilterSequence => {
                out = filter_kind(doc, input, |k| k == NodeKind::Sequence);
            }
            ExprData::FilterMapping => {
                out = filter_kind(doc, input, |k| k == NodeKind::Mapping);
            }
            ExprData::SeqIndex(index) => {
                for n in &input {
                    let items = match doc.sequence_items(*n) {
                        Some(items) => items,
                        None => continue,
                    };
                    let len = items.len() as i64;
                    let pos = if *index < 0 { index.saturating_add(len) } else { *index };
                    if (0..len).contains(&pos) {
                        out.push(self.resolve(items[pos as usize], depth)?);
                    }
                }
            }
            ExprData::SeqSlice(slice) => {
                for n in &input {
                    if let Some(items) = doc.sequence_items(*n) {
                        for pos in slice.indices(items.len()) {
                            out.push(self.resolve(items[pos], depth)?);
                        }
                    }
                }
            }
            ExprData::MapKey(key) => {
                for n in &input {
                    let found = match key {
                        MapKey::Simple(text) => doc.lookup_by_simple_key(*n, text),
                        MapKey::Complex { key, .. } => key
                            .root_id()
                            .and_then(|probe| doc.lookup_by_key(*n, key, probe)),
                    };
                    if let Some(value) = found {
                        out.push(self.resolve(value, depth)?);
                    }
                }
            }
            ExprData::Alias(name) => {
                let target = doc
                    .lookup_anchor(name)
                    .ok_or_else(|| ExecError::UnresolvedAlias { name: name.clone() })?;
                let target = self.resolve(target, depth)?;
                out.extend(std::iter::repeat(target).take(input.len()));
            }
            ExprData::Multi | ExprData::Chain | ExprData::LogicalOr | ExprData::LogicalAnd => {
                if let Some(policy) = MergePolicy::for_kind(node.kind()) {
                    out = policy.combine(node.children(), input, |child, input| {
                        self.eval(*child, input, depth + 1)
                    })?;
                }
            }
        }

        Ok(out)
    }

    /// Appends every strict descendant of `id` in pre-order.
    fn descendants(&self, id: NodeId, depth: usize, out: &mut Vec<NodeId>) -> ExecResult<()> {
        self.check_depth(depth)?;
        for child in self.doc.children(id) {
            let child = self.resolve(child, depth)?;
            out.push(child);
            self.descendants(child, depth + 1, out)?;
        }
        Ok(())
    }
}

fn filter_kind(doc: &Document, input: Vec<NodeId>, keep: impl Fn(NodeKind) -> bool) -> Vec<NodeId> {
    input.into_iter().filter(|n| keep(doc.kind(*n))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ypath::parse;

    fn texts(doc: &Document, path: &str) -> Vec<String> {
        let tree = parse(path).unwrap();
        execute(&tree, doc.root().unwrap(), &ExecConfig::default())
            .unwrap()
            .iter()
            .map(|n| n.text().unwrap_or("<collection>").to_string())
            .collect()
    }

    #[test]
    fn test_every_child_r_is_preorder_with_input_first() {
        let doc = Document::parse_str("a: [1, 2]\nb: {c: 3}\n").unwrap();
        assert_eq!(
            texts(&doc, "/**"),
            vec!["<collection>", "<collection>", "1", "2", "<collection>", "3"]
        );
        assert_eq!(texts(&doc, "/**/$"), vec!["1", "2", "3"]);
        // a scalar is its own subtree
        assert_eq!(texts(&doc, "/b/c/**"), vec!["3"]);
    }

    #[test]
    fn test_huge_slice_stride_stops_at_the_end() {
        let doc = Document::parse_str("[a, b, c]").unwrap();
        assert_eq!(texts(&doc, "[1::9223372036854775807]"), vec!["b"]);
        assert_eq!(texts(&doc, "[::-9223372036854775807]"), vec!["c"]);
    }

    #[test]
    fn test_index_out_of_range_is_empty() {
        let doc = Document::parse_str("[a, b]").unwrap();
        assert!(texts(&doc, "[2]").is_empty());
        assert!(texts(&doc, "[-3]").is_empty());
        assert_eq!(texts(&doc, "[-2]"), vec!["a"]);
    }

    #[test]
    fn test_steps_on_wrong_kind_contribute_nothing() {
        let doc = Document::parse_str("a: text\nb: [1]\n").unwrap();
        assert!(texts(&doc, "/a/*").is_empty());
        assert!(texts(&doc, "/a/[0]").is_empty());
        assert!(texts(&doc, "/b/key").is_empty());
    }

    #[test]
    fn test_parent_of_root_is_empty() {
        let doc = Document::parse_str("a: 1").unwrap();
        assert!(texts(&doc, "/..").is_empty());
        assert_eq!(texts(&doc, "/a/../a"), vec!["1"]);
    }

    #[test]
    fn test_root_step_needs_input() {
        let doc = Document::parse_str("a: 1").unwrap();
        // the chain stops at the empty key lookup, so the root is not produced
        assert!(texts(&doc, "/missing/^/a").is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let doc = Document::parse_str("a: {b: {c: {d: 1}}}").unwrap();
        let tree = parse("/**").unwrap();
        let shallow = ExecConfig {
            max_recursion_depth: 2,
            ..ExecConfig::default()
        };
        assert_eq!(
            execute(&tree, doc.root().unwrap(), &shallow),
            Err(ExecError::DepthExceeded { limit: 2 })
        );
        assert!(execute(&tree, doc.root().unwrap(), &ExecConfig::default()).is_ok());
    }

    #[test]
    fn test_executor_reuse_and_reset() {
        let doc = Document::parse_str("{x: 1, y: 2}").unwrap();
        let mut exec = PathExecutor::new(ExecConfig::default());
        assert_eq!(exec.execute(&parse("/*").unwrap(), doc.root().unwrap()).unwrap().len(), 2);
        assert_eq!(exec.execute(&parse("/x").unwrap(), doc.root().unwrap()).unwrap().len(), 1);
        let taken = exec.take_results();
        assert_eq!(taken[0].text(), Some("1"));
        assert!(exec.results().is_empty());
        exec.reset();
        assert!(exec.config().follow_aliases);
    }
}
