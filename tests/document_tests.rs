//! Integration tests for the YAML document tree, loader and output helpers.

use ypath::document::emit::{path_of, to_json_value, to_yaml_value};
use ypath::document::node::{NodeKind, ScalarStyle};
use ypath::document::parser::DocumentError;
use ypath::document::tree::Document;

const SAMPLE: &str = "\
# deployment
name: web
replicas: 3
ports:
  - 80
  - 443
labels: &labels
  tier: frontend
  'team name': core
copy: *labels
note: |
  multi
  line
";

#[test]
fn test_structure_and_order() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let root = doc.root().unwrap();
    assert!(root.is_mapping());

    let keys: Vec<_> = root.pairs().iter().map(|(k, _)| k.text().unwrap()).collect();
    assert_eq!(keys, vec!["name", "replicas", "ports", "labels", "copy", "note"]);

    let ports = root.get("ports").unwrap();
    assert_eq!(ports.kind(), NodeKind::Sequence);
    assert_eq!(ports.item(1).unwrap().text(), Some("443"));
    assert!(ports.item(2).is_none());
}

#[test]
fn test_parent_links() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let root = doc.root().unwrap();
    let port = root.get("ports").unwrap().item(0).unwrap();
    assert_eq!(port.parent(), root.get("ports"));
    assert_eq!(port.parent().unwrap().parent(), Some(root));
    assert!(root.parent().is_none());
}

#[test]
fn test_anchors_and_aliases() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let root = doc.root().unwrap();
    let labels = root.get("labels").unwrap();
    assert_eq!(labels.anchor(), Some("labels"));
    assert_eq!(doc.lookup_anchor("labels"), Some(labels.id()));

    let copy = root.get("copy").unwrap();
    assert!(copy.is_alias());
    assert_eq!(copy.alias_target(), Some("labels"));
    assert!(copy.children().is_empty());
}

#[test]
fn test_scalar_styles_and_tags() {
    let doc = Document::parse_str("a: plain\nb: 'single'\nc: \"double\"\nd: !!str 12\n").unwrap();
    let root = doc.root().unwrap();
    assert_eq!(root.get("a").unwrap().style(), Some(ScalarStyle::Plain));
    assert_eq!(root.get("b").unwrap().style(), Some(ScalarStyle::SingleQuoted));
    assert_eq!(root.get("c").unwrap().style(), Some(ScalarStyle::DoubleQuoted));
    assert!(root.get("d").unwrap().tag().unwrap().ends_with("str"));
}

#[test]
fn test_syntax_error_reports_position() {
    let err = Document::parse_str("a: [1, 2\nb: 3\n").unwrap_err();
    let DocumentError::Syntax { line, .. } = err;
    assert!(line >= 1);
}

#[test]
fn test_yaml_output_of_subtree() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let root = doc.root().unwrap();
    let text = serde_yaml::to_string(&to_yaml_value(root.get("ports").unwrap())).unwrap();
    assert_eq!(text, "- 80\n- 443\n");

    let note = to_yaml_value(root.get("note").unwrap());
    assert_eq!(note, serde_yaml::Value::String("multi\nline\n".to_string()));
}

#[test]
fn test_json_output_resolves_aliases() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let copy = doc.root().unwrap().get("copy").unwrap();
    assert_eq!(
        to_json_value(copy),
        serde_json::json!({"tier": "frontend", "team name": "core"})
    );
}

#[test]
fn test_paths_of_query_matches() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    let found = ypath::ypath::query(&doc, "/ports/-1, /labels/*").unwrap();
    let paths: Vec<_> = found.iter().map(|n| path_of(*n)).collect();
    assert_eq!(
        paths,
        vec!["/ports/1", "/labels/tier", "/labels/\"team name\""]
    );
}

#[test]
fn test_path_of_result_can_be_queried_again() {
    let doc = Document::parse_str(SAMPLE).unwrap();
    for node in ypath::ypath::query(&doc, "/**/$").unwrap() {
        let path = path_of(node);
        let again = ypath::ypath::query(&doc, &path).unwrap();
        assert_eq!(again, vec![node], "{}", path);
    }
}
