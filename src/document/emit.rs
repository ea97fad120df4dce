//! Conversion of document nodes into serde values for output.
//!
//! Matched nodes are printed through `serde_yaml` or `serde_json`. Plain
//! scalars are type-resolved with the YAML core schema (so `42` becomes a
//! number and `true` a boolean); quoted scalars and `!!str` scalars stay
//! strings. Aliases are expanded to their anchor target. An alias that cannot
//! be resolved, or that nests deeper than [`MAX_ALIAS_NESTING`], is written as
//! the string `*name`.

use super::node::{NodeData, NodeKind, ScalarStyle};
use super::tree::{Document, NodeRef};
use crate::ypath::utf8::{format_escaped, EscapePolicy};
use yaml_rust2::Yaml;

/// Limit on nested alias expansion, so self-referencing documents terminate.
pub const MAX_ALIAS_NESTING: usize = 64;

/// A scalar after core schema resolution.
enum Resolved<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

fn resolve_scalar<'a>(text: &'a str, style: ScalarStyle, tag: Option<&str>) -> Resolved<'a> {
    if style != ScalarStyle::Plain || tag.is_some_and(|t| t.ends_with(":str") || t == "!") {
        return Resolved::Str(text);
    }

    let yaml = Yaml::from_str(text);
    match yaml {
        Yaml::Null => Resolved::Null,
        Yaml::Boolean(b) => Resolved::Bool(b),
        Yaml::Integer(i) => Resolved::Int(i),
        Yaml::Real(_) => match yaml.as_f64() {
            Some(f) => Resolved::Float(f),
            None => Resolved::Str(text),
        },
        _ => Resolved::Str(text),
    }
}

/// Converts a node and its subtree into a `serde_yaml::Value`.
pub fn to_yaml_value(node: NodeRef<'_>) -> serde_yaml::Value {
    yaml_value(node, 0)
}

fn yaml_value(node: NodeRef<'_>, nesting: usize) -> serde_yaml::Value {
    let doc = node.document();
    match doc.get(node.id()).map(|n| n.data()) {
        Some(NodeData::Scalar { text, style }) => match resolve_scalar(text, *style, node.tag()) {
            Resolved::Null => serde_yaml::Value::Null,
            Resolved::Bool(b) => serde_yaml::Value::Bool(b),
            Resolved::Int(i) => serde_yaml::Value::Number(serde_yaml::Number::from(i)),
            Resolved::Float(f) => serde_yaml::Value::Number(serde_yaml::Number::from(f)),
            Resolved::Str(s) => serde_yaml::Value::String(s.to_string()),
        },
        Some(NodeData::Sequence(_)) => serde_yaml::Value::Sequence(
            node.children()
                .into_iter()
                .map(|item| yaml_value(item, nesting))
                .collect(),
        ),
        Some(NodeData::Mapping(_)) => {
            let map: serde_yaml::Mapping = node
                .pairs()
                .into_iter()
                .map(|(k, v)| (yaml_value(k, nesting), yaml_value(v, nesting)))
                .collect();
            serde_yaml::Value::Mapping(map)
        }
        Some(NodeData::Alias(name)) => match expand_alias(doc, name, nesting) {
            Some(target) => yaml_value(target, nesting + 1),
            None => serde_yaml::Value::String(format!("*{}", name)),
        },
        None => serde_yaml::Value::Null,
    }
}

/// Converts a node and its subtree into a `serde_json::Value`.
///
/// Mapping keys that are not scalars are rendered as compact JSON text,
/// since JSON object keys must be strings.
pub fn to_json_value(node: NodeRef<'_>) -> serde_json::Value {
    json_value(node, 0)
}

fn json_value(node: NodeRef<'_>, nesting: usize) -> serde_json::Value {
    let doc = node.document();
    match doc.get(node.id()).map(|n| n.data()) {
        Some(NodeData::Scalar { text, style }) => match resolve_scalar(text, *style, node.tag()) {
            Resolved::Null => serde_json::Value::Null,
            Resolved::Bool(b) => serde_json::Value::Bool(b),
            Resolved::Int(i) => serde_json::Value::from(i),
            Resolved::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Resolved::Str(s) => serde_json::Value::String(s.to_string()),
        },
        Some(NodeData::Sequence(_)) => serde_json::Value::Array(
            node.children()
                .into_iter()
                .map(|item| json_value(item, nesting))
                .collect(),
        ),
        Some(NodeData::Mapping(_)) => {
            let map: serde_json::Map<String, serde_json::Value> = node
                .pairs()
                .into_iter()
                .map(|(k, v)| {
                    let key = match k.text() {
                        Some(text) => text.to_string(),
                        None => json_value(k, nesting).to_string(),
                    };
                    (key, json_value(v, nesting))
                })
                .collect();
            serde_json::Value::Object(map)
        }
        Some(NodeData::Alias(name)) => match expand_alias(doc, name, nesting) {
            Some(target) => json_value(target, nesting + 1),
            None => serde_json::Value::String(format!("*{}", name)),
        },
        None => serde_json::Value::Null,
    }
}

fn expand_alias<'d>(doc: &'d Document, name: &str, nesting: usize) -> Option<NodeRef<'d>> {
    if nesting >= MAX_ALIAS_NESTING {
        log::warn!("alias *{} nested too deeply, not expanded", name);
        return None;
    }
    doc.lookup_anchor(name).map(|id| doc.node(id))
}

/// Returns a path expression that selects `node` from the document root.
///
/// Mapping values are addressed by key, sequence items by index. Keys that
/// are not simple names are double-quoted; complex keys are written as flow
/// literals in braces. The root itself is `/`.
///
/// # Example
///
/// ```
/// use ypath::document::emit::path_of;
/// use ypath::document::tree::Document;
///
/// let doc = Document::parse_str("servers:\n  - host: a\n").unwrap();
/// let host = doc.root().unwrap().get("servers").unwrap().item(0).unwrap().get("host").unwrap();
/// assert_eq!(path_of(host), "/servers/0/host");
/// ```
pub fn path_of(node: NodeRef<'_>) -> String {
    let mut segments = Vec::new();
    let mut current = node;

    while let Some(parent) = current.parent() {
        let segment = match parent.kind() {
            NodeKind::Sequence => parent
                .children()
                .iter()
                .position(|item| *item == current)
                .map(|i| i.to_string()),
            NodeKind::Mapping => parent
                .pairs()
                .into_iter()
                .find(|(k, v)| *v == current || *k == current)
                .map(|(k, _)| key_segment(k)),
            _ => None,
        };
        segments.push(segment.unwrap_or_else(|| "?".to_string()));
        current = parent;
    }

    segments.reverse();
    format!("/{}", segments.join("/"))
}

fn key_segment(key: NodeRef<'_>) -> String {
    match key.text() {
        Some(text) if key.tag().is_none() && is_simple_key(text) => text.to_string(),
        Some(text) if key.tag().is_none() => {
            let escaped: String = text
                .chars()
                .map(|c| format_escaped(c, EscapePolicy::DoubleQuoted))
                .collect();
            format!("\"{}\"", escaped)
        }
        _ => {
            let flow = serde_json::to_string(&to_json_value(key)).unwrap_or_default();
            format!("{{{}}}", flow)
        }
    }
}

fn is_simple_key(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_scalars_are_type_resolved() {
        let doc = Document::parse_str("a: 42\nb: true\nc: ~\nd: 1.5\ne: '42'\nf: text\n").unwrap();
        let value = to_yaml_value(doc.root().unwrap());
        let expected: serde_yaml::Value =
            serde_yaml::from_str("a: 42\nb: true\nc: null\nd: 1.5\ne: '42'\nf: text\n").unwrap();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_json_output_expands_aliases() {
        let doc = Document::parse_str("base: &b {port: 80}\nprod: *b\n").unwrap();
        let prod = doc.root().unwrap().get("prod").unwrap();
        assert_eq!(to_json_value(prod), serde_json::json!({"port": 80}));
    }

    #[test]
    fn test_self_referencing_alias_terminates() {
        let mut doc = Document::new();
        let key = doc.add_scalar("me");
        let alias = doc.add_alias("loop");
        let root = doc.add_mapping(vec![(key, alias)]);
        doc.set_anchor(root, "loop");
        doc.set_root(root);

        // expansion stops at the nesting limit instead of recursing forever
        let value = to_json_value(doc.root().unwrap());
        assert!(value.is_object());
    }

    #[test]
    fn test_path_of_quotes_unusual_keys() {
        let doc = Document::parse_str("\"a b\": [x, {c: 1}]\n").unwrap();
        let c = doc.root().unwrap().get("a b").unwrap().item(1).unwrap().get("c").unwrap();
        assert_eq!(path_of(c), "/\"a b\"/1/c");
        assert_eq!(path_of(doc.root().unwrap()), "/");
    }
}
