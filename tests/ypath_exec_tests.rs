//! Integration tests for evaluating path expressions against YAML documents.

use ypath::document::tree::Document;
use ypath::ypath::{execute, parse, ExecConfig, ParseError};

/// Runs `path` from the root and renders each match (collections as
/// `<seq>` / `<map>`).
fn run(yaml: &str, path: &str) -> Vec<String> {
    let doc = Document::parse_str(yaml).unwrap();
    let tree = parse(path).unwrap();
    execute(&tree, doc.root().unwrap(), &ExecConfig::default())
        .unwrap()
        .iter()
        .map(|node| match node.text() {
            Some(text) => text.to_string(),
            None if node.is_sequence() => "<seq>".to_string(),
            None => "<map>".to_string(),
        })
        .collect()
}

#[test]
fn test_index_into_nested_sequence() {
    assert_eq!(run("{a: {b: [1, 2, 3]}}", "/a/b/[1]"), vec!["2"]);
}

#[test]
fn test_slice_with_explicit_stride() {
    assert_eq!(run("{a: [1, 2, 3, 4, 5]}", "/a/[1:4:1]"), vec!["2", "3", "4"]);
}

#[test]
fn test_every_child_keeps_declared_key_order() {
    assert_eq!(run("{x: 1, y: 2}", "/*"), vec!["1", "2"]);
    assert_eq!(run("{y: 2, x: 1}", "/*"), vec!["2", "1"]);
}

#[test]
fn test_multi_of_two_paths() {
    assert_eq!(run("{a: 1, b: 2, c: 3}", "/a,/b"), vec!["1", "2"]);
}

#[test]
fn test_unterminated_bracket_is_positioned_at_open() {
    let err = parse("/[1:0").unwrap_err();
    assert!(matches!(err, ParseError::UnmatchedBracket { .. }));
    let mark = err.mark();
    assert_eq!(mark.pos, 1);
    assert_eq!(mark.line, 0);
    assert_eq!(mark.column, 1);
}

#[test]
fn test_evaluation_is_deterministic() {
    let doc = Document::parse_str("a: [1, {b: 2}, [3, 4]]\nc: {d: 5}\n").unwrap();
    let tree = parse("/**/$ , /a/*").unwrap();
    let config = ExecConfig::default();
    let first = execute(&tree, doc.root().unwrap(), &config).unwrap();
    let second = execute(&tree, doc.root().unwrap(), &config).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 8);
}

#[test]
fn test_chain_propagates_empty_results() {
    let yaml = "a: 1\nb: [x, y]\n";
    assert!(run(yaml, "/missing").is_empty());
    assert!(run(yaml, "/missing/*").is_empty());
    assert!(run(yaml, "/missing/..").is_empty());
    assert!(run(yaml, "/missing/.").is_empty());
    assert!(run(yaml, "/missing/^").is_empty());
    assert!(run(yaml, "/a/[0]/..").is_empty());
}

#[test]
fn test_multi_is_concatenation_with_duplicates() {
    let yaml = "a: [1, 2]\nb: 3\n";
    let mut expected = run(yaml, "/a/*");
    expected.extend(run(yaml, "/b"));
    assert_eq!(run(yaml, "/a/*,/b"), expected);
    assert_eq!(run(yaml, "/b,/b"), vec!["3", "3"]);
}

#[test]
fn test_logical_or_takes_first_non_empty() {
    let yaml = "a: 1\nb: 2\n";
    assert_eq!(run(yaml, "/a | /b"), vec!["1"]);
    assert_eq!(run(yaml, "/missing | /b"), vec!["2"]);
    assert_eq!(run(yaml, "/missing || /b"), vec!["2"]);
    assert!(run(yaml, "/x | /y").is_empty());
}

#[test]
fn test_logical_or_does_not_evaluate_later_branches() {
    // the second branch would fail if evaluated
    let doc = Document::parse_str("a: 1").unwrap();
    let tree = parse("/a | *nowhere").unwrap();
    let found = execute(&tree, doc.root().unwrap(), &ExecConfig::default()).unwrap();
    assert_eq!(found.len(), 1);
}

#[test]
fn test_logical_and_is_all_or_nothing() {
    let yaml = "a: 1\nb: 2\n";
    assert_eq!(run(yaml, "/a & /b"), vec!["2"]);
    assert_eq!(run(yaml, "/a && /b"), vec!["2"]);
    assert!(run(yaml, "/a & /missing").is_empty());
    assert!(run(yaml, "/missing & /b").is_empty());
}

#[test]
fn test_precedence_of_combinators() {
    let yaml = "a: 1\nb: 2\nc: 3\n";
    // (/a,/b) & /c
    assert_eq!(run(yaml, "/a,/b & /c"), vec!["3"]);
    // /missing | (/a,/b)
    assert_eq!(run(yaml, "/missing | /a,/b"), vec!["1", "2"]);
    assert_eq!(run(yaml, "(/missing | /a),/c"), vec!["1", "3"]);
}

#[test]
fn test_slice_round_trip_and_reverse() {
    let yaml = "[a, b, c, d]";
    assert_eq!(run(yaml, "[0:4:1]"), vec!["a", "b", "c", "d"]);
    assert_eq!(run(yaml, "[::-1]"), vec!["d", "c", "b", "a"]);
    assert_eq!(run(yaml, "[-2:]"), vec!["c", "d"]);
    assert_eq!(run(yaml, "[::2]"), vec!["a", "c"]);
    assert_eq!(run(yaml, "1:3"), vec!["b", "c"]);
    assert!(run(yaml, "[3:1]").is_empty());
}

#[test]
fn test_extreme_slice_strides_do_not_overflow() {
    let yaml = "[a, b, c]";
    assert_eq!(run(yaml, "[1::9223372036854775807]"), vec!["b"]);
    assert_eq!(run(yaml, "[::-9223372036854775808]"), vec!["c"]);
    assert_eq!(run(yaml, "[-9223372036854775808:9223372036854775807]"), vec!["a", "b", "c"]);
}

#[test]
fn test_negative_index_counts_from_end() {
    let yaml = "[a, b, c]";
    assert_eq!(run(yaml, "[-1]"), run(yaml, "[2]"));
    assert_eq!(run(yaml, "-1"), vec!["c"]);
    assert_eq!(run(yaml, "[0, -1]"), vec!["a", "c"]);
}

#[test]
fn test_filters_keep_matching_kinds() {
    let yaml = "s: text\nq: [1]\nm: {k: v}\n";
    assert_eq!(run(yaml, "/*/$"), vec!["text"]);
    assert_eq!(run(yaml, "/*/%"), vec!["<seq>", "<map>"]);
    assert_eq!(run(yaml, "/*/[]"), vec!["<seq>"]);
    assert_eq!(run(yaml, "/*/{}"), vec!["<map>"]);
    // trailing slash keeps collections
    assert_eq!(run(yaml, "/q/"), vec!["<seq>"]);
    assert!(run(yaml, "/s/").is_empty());
}

#[test]
fn test_parent_sibling_and_this() {
    let yaml = "server: {host: h, port: 80}\n";
    assert_eq!(run(yaml, "/server/host/.."), vec!["<map>"]);
    assert_eq!(run(yaml, "/server/host/:port"), vec!["80"]);
    assert_eq!(run(yaml, "/server/./port"), vec!["80"]);
    assert_eq!(run(yaml, "/server/port/^/server/host"), vec!["h"]);
}

#[test]
fn test_descendants_start_with_input_in_pre_order() {
    let yaml = "a: {b: 1, c: [2, 3]}\nd: 4\n";
    assert_eq!(run(yaml, "/**/$"), vec!["1", "2", "3", "4"]);
    assert_eq!(run(yaml, "/a/**"), vec!["<map>", "1", "<seq>", "2", "3"]);
    assert_eq!(run(yaml, "/**")[0], "<map>");
    assert_eq!(run(yaml, "/d/**"), vec!["4"]);
}

#[test]
fn test_quoted_and_complex_keys() {
    let yaml = "\"with space\": 1\n'a/b': 2\n\"0\": zero\n? [1, 2]\n: pair\n? {k: v}\n: map\n";
    assert_eq!(run(yaml, "/\"with space\""), vec!["1"]);
    assert_eq!(run(yaml, "/'a/b'"), vec!["2"]);
    assert_eq!(run(yaml, "/\"0\""), vec!["zero"]);
    assert_eq!(run(yaml, "/{ [1, 2] }"), vec!["pair"]);
    assert_eq!(run(yaml, "/{ {k: v} }"), vec!["map"]);
}

#[test]
fn test_group_after_step_chains() {
    let yaml = "a: {x: 1, y: 2, z: 3}\n";
    assert_eq!(run(yaml, "/a(x,z)"), vec!["1", "3"]);
    assert_eq!(run(yaml, "/a/(missing | y)"), vec!["2"]);
}

#[test]
fn test_start_node_need_not_be_root() {
    let doc = Document::parse_str("a: {b: [1, 2]}").unwrap();
    let start = doc.root().unwrap().get("a").unwrap();
    let tree = parse("b/[1]").unwrap();
    let found = execute(&tree, start, &ExecConfig::default()).unwrap();
    assert_eq!(found[0].text(), Some("2"));

    let tree = parse("/a/b/[0]").unwrap();
    let found = execute(&tree, start, &ExecConfig::default()).unwrap();
    assert_eq!(found[0].text(), Some("1"));
}

#[test]
fn test_query_on_empty_document() {
    let doc = Document::parse_str("").unwrap();
    assert!(ypath::ypath::query(&doc, "/**").unwrap().is_empty());
}

#[test]
fn test_query_reports_parse_errors() {
    let doc = Document::parse_str("a: 1").unwrap();
    let err = ypath::ypath::query(&doc, "/a,").unwrap_err();
    assert!(err.to_string().starts_with("parse error"));
}
