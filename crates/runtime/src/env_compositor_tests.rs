// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use winss_platform::FakeFsHost;

fn base(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn directory_entry_overrides_base_env() {
    let env = compose(
        base(&[("FOO", "1")]),
        vec![("FOO".to_string(), "2".to_string())],
    );
    assert_eq!(env.get("FOO"), Some(&"2".to_string()));
}

#[test]
fn empty_file_removes_variable() {
    let env = compose(
        base(&[("FOO", "1")]),
        vec![("FOO".to_string(), String::new())],
    );
    assert!(!env.contains_key("FOO"));
}

#[test]
fn dotted_or_equals_named_entries_are_skipped_at_directory_read_time() {
    // compose() itself does not filter (that's compose_from_dir's job); this
    // documents that a caller who already filtered sees no surprises.
    let env = compose(BTreeMap::new(), vec![("PLAIN".to_string(), "x".to_string())]);
    assert_eq!(env.get("PLAIN"), Some(&"x".to_string()));
}

#[test]
fn expand_substitutes_known_reference() {
    let env = base(&[("HOST", "localhost")]);
    assert_eq!(expand("http://${HOST}:8080", &env), "http://localhost:8080");
}

#[test]
fn expand_unknown_reference_becomes_empty() {
    let env = base(&[]);
    assert_eq!(expand("${MISSING}x", &env), "x");
}

#[test]
fn expand_is_one_pass_not_recursive() {
    // A value that names itself must not recurse.
    let mut env = BTreeMap::new();
    env.insert("A".to_string(), "${A}".to_string());
    assert_eq!(expand("${A}", &env), "${A}");
}

#[test]
fn composition_expands_against_entries_seen_so_far() {
    let env = compose(
        BTreeMap::new(),
        vec![
            ("HOST".to_string(), "localhost".to_string()),
            ("URL".to_string(), "http://${HOST}".to_string()),
        ],
    );
    assert_eq!(env.get("URL"), Some(&"http://localhost".to_string()));
}

#[test]
fn serialize_block_produces_null_terminated_pairs() {
    let env = base(&[("A", "1"), ("B", "2")]);
    let block = serialize_block(&env);
    assert_eq!(block, b"A=1\0B=2\0\0");
}

#[test]
fn serialize_empty_block_is_single_null() {
    let block = serialize_block(&BTreeMap::new());
    assert_eq!(block, vec![0]);
}

#[tokio::test]
async fn compose_from_dir_returns_base_unchanged_when_dir_absent() {
    let fs = FakeFsHost::default();
    let process_env = base(&[("X", "1")]);
    let result = compose_from_dir(&fs, process_env.clone(), std::path::Path::new("/svc/env")).await;
    assert_eq!(result, process_env);
}

#[tokio::test]
async fn compose_from_dir_skips_dotfiles_and_equals_names() {
    let fs = FakeFsHost::default();
    fs.seed("/svc/env/GOOD", b"1");
    fs.seed("/svc/env/.hidden", b"2");
    fs.seed("/svc/env/BAD=NAME", b"3");

    let result = compose_from_dir(&fs, BTreeMap::new(), std::path::Path::new("/svc/env")).await;
    assert_eq!(result.get("GOOD"), Some(&"1".to_string()));
    assert!(!result.contains_key(".hidden"));
    assert!(!result.keys().any(|k| k.contains('=')));
}
