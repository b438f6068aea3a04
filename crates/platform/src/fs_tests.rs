// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn real_write_atomic_then_read_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("state");
    let host = TokioFsHost;

    host.write_atomic(&path, b"hello").await.expect("write");
    let contents = host.read_to_string(&path).await.expect("read");
    assert_eq!(contents.as_deref(), Some("hello"));
}

#[tokio::test]
async fn real_read_missing_file_is_none_not_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let host = TokioFsHost;
    let contents = host
        .read_to_string(&dir.path().join("nope"))
        .await
        .expect("read");
    assert_eq!(contents, None);
}

#[tokio::test]
async fn real_write_atomic_leaves_no_tmp_file_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("state");
    let host = TokioFsHost;
    host.write_atomic(&path, b"v1").await.expect("write");
    host.write_atomic(&path, b"v2").await.expect("write");

    assert!(!dir.path().join("state.tmp").exists());
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "v2");
}

#[tokio::test]
async fn fake_seed_and_read() {
    let host = FakeFsHost::new();
    host.seed("/svc/web/down", b"".to_vec());
    assert!(host.exists(Path::new("/svc/web/down")).await);
    assert_eq!(
        host.read_to_string(Path::new("/svc/web/down")).await.expect("read"),
        Some(String::new())
    );
}

#[tokio::test]
async fn fake_read_dir_names_lists_immediate_children_once() {
    let host = FakeFsHost::new();
    host.seed("/scan/a/run", b"sleep 1".to_vec());
    host.seed("/scan/b/log/run", b"sleep 1".to_vec());

    let mut names = host.read_dir_names(Path::new("/scan")).await.expect("read_dir");
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[tokio::test]
async fn fake_write_atomic_is_visible_to_subsequent_reads() {
    let host = FakeFsHost::new();
    let path = PathBuf::from("/svc/web/supervise/state");
    host.write_atomic(&path, b"{}").await.expect("write");
    assert_eq!(host.written(&path), Some(b"{}".to_vec()));
}
