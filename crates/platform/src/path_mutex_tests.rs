// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn name() -> MutexName {
    MutexName::new(r"C:\svc\web", "")
}

#[tokio::test]
async fn lock_then_lock_yields_has_lock() {
    let host = Fs2PathMutexHost::new(tempfile::tempdir().expect("tempdir").keep());
    let n = name();
    assert!(host.lock(&n).await.expect("lock"));
    assert!(host.lock(&n).await.expect("lock again"));
    assert!(host.has_lock(&n).await);
}

#[tokio::test]
async fn second_host_sees_can_lock_false_while_first_holds() {
    let dir = tempfile::tempdir().expect("tempdir").keep();
    let first = Fs2PathMutexHost::new(dir.clone());
    let second = Fs2PathMutexHost::new(dir);
    let n = name();

    assert!(first.lock(&n).await.expect("lock"));
    assert!(!second.lock(&n).await.expect("lock"));
    assert!(!second.can_lock(&n).await.expect("can_lock"));
    assert!(!second.has_lock(&n).await);
}

#[tokio::test]
async fn fake_contender_mirrors_cross_process_contention() {
    let host = FakePathMutexHost::new();
    let other = host.contender();
    let n = name();

    assert!(host.lock(&n).await.expect("lock"));
    assert!(!other.lock(&n).await.expect("lock"));
    assert!(!other.can_lock(&n).await.expect("can_lock"));
    assert!(host.has_lock(&n).await);
    assert!(!other.has_lock(&n).await);
}
