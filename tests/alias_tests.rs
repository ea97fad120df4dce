//! Tests for anchors and aliases seen through path queries.

use ypath::document::tree::Document;
use ypath::ypath::{execute, parse, ExecConfig, ExecError};

const SHARED: &str = "\
defaults: &base
  timeout: 30
  retries: 3
service:
  settings: *base
  name: api
";

fn no_follow() -> ExecConfig {
    ExecConfig {
        follow_aliases: false,
        ..ExecConfig::default()
    }
}

#[test]
fn test_key_step_follows_alias_by_default() {
    let doc = Document::parse_str(SHARED).unwrap();
    let tree = parse("/service/settings/timeout").unwrap();
    let found = execute(&tree, doc.root().unwrap(), &ExecConfig::default()).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].text(), Some("30"));

    // the match is the anchored node itself
    let defaults = doc.root().unwrap().get("defaults").unwrap();
    assert_eq!(found[0].parent(), Some(defaults));
}

#[test]
fn test_without_following_alias_is_returned() {
    let doc = Document::parse_str(SHARED).unwrap();
    let tree = parse("/service/settings").unwrap();
    let found = execute(&tree, doc.root().unwrap(), &no_follow()).unwrap();
    assert_eq!(found.len(), 1);
    assert!(found[0].is_alias());
    assert_eq!(found[0].alias_target(), Some("base"));

    // aliases are not descended into
    let tree = parse("/service/settings/timeout").unwrap();
    assert!(execute(&tree, doc.root().unwrap(), &no_follow()).unwrap().is_empty());

    // but they count as scalars
    let tree = parse("/service/*/$").unwrap();
    assert_eq!(execute(&tree, doc.root().unwrap(), &no_follow()).unwrap().len(), 2);
}

#[test]
fn test_descendants_walk_through_aliases() {
    let doc = Document::parse_str(SHARED).unwrap();
    let tree = parse("/service/**/$").unwrap();
    let texts: Vec<_> = execute(&tree, doc.root().unwrap(), &ExecConfig::default())
        .unwrap()
        .iter()
        .map(|n| n.text().unwrap())
        .collect();
    assert_eq!(texts, vec!["30", "3", "api"]);
}

#[test]
fn test_alias_step_selects_anchor() {
    let doc = Document::parse_str(SHARED).unwrap();
    for path in ["*base/retries", "&base/retries", "/&base/retries"] {
        let tree = parse(path).unwrap();
        let found = execute(&tree, doc.root().unwrap(), &ExecConfig::default()).unwrap();
        assert_eq!(found.len(), 1, "{}", path);
        assert_eq!(found[0].text(), Some("3"));
    }
}

#[test]
fn test_alias_step_without_anchor_is_error() {
    let doc = Document::parse_str(SHARED).unwrap();
    let tree = parse("*nothing").unwrap();
    assert_eq!(
        execute(&tree, doc.root().unwrap(), &ExecConfig::default()),
        Err(ExecError::UnresolvedAlias {
            name: "nothing".to_string()
        })
    );
}

#[test]
fn test_dangling_alias_in_document_is_error_when_followed() {
    let mut doc = Document::new();
    let key = doc.add_scalar("a");
    let alias = doc.add_alias("gone");
    let root = doc.add_mapping(vec![(key, alias)]);
    doc.set_root(root);

    let tree = parse("/a").unwrap();
    assert_eq!(
        execute(&tree, doc.root().unwrap(), &ExecConfig::default()),
        Err(ExecError::UnresolvedAlias {
            name: "gone".to_string()
        })
    );
    // no match is still an empty result, not an error
    let tree = parse("/b").unwrap();
    assert!(execute(&tree, doc.root().unwrap(), &ExecConfig::default())
        .unwrap()
        .is_empty());
    // and the alias itself is reachable when not following
    let tree = parse("/a").unwrap();
    assert_eq!(execute(&tree, doc.root().unwrap(), &no_follow()).unwrap().len(), 1);
}

#[test]
fn test_self_referencing_alias_hits_depth_limit() {
    let mut doc = Document::new();
    let key = doc.add_scalar("again");
    let alias = doc.add_alias("top");
    let root = doc.add_mapping(vec![(key, alias)]);
    doc.set_anchor(root, "top");
    doc.set_root(root);

    let config = ExecConfig {
        max_recursion_depth: 32,
        ..ExecConfig::default()
    };
    let tree = parse("/**").unwrap();
    assert_eq!(
        execute(&tree, doc.root().unwrap(), &config),
        Err(ExecError::DepthExceeded { limit: 32 })
    );

    // a single hop is fine
    let tree = parse("/again/again").unwrap();
    let found = execute(&tree, doc.root().unwrap(), &config).unwrap();
    assert_eq!(found, vec![doc.root().unwrap()]);

    // without following, the walk stops at the alias
    let tree = parse("/**").unwrap();
    let found = execute(&tree, doc.root().unwrap(), &no_follow()).unwrap();
    assert_eq!(found.len(), 2);
    assert!(found[1].is_alias());
}
