// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::HashMap;

fn params(cmd: &str) -> ProcessParams {
    ProcessParams {
        cmd: cmd.to_string(),
        create_group: false,
        dir: std::env::temp_dir(),
        env: HashMap::new(),
        stdio: Stdio::default(),
    }
}

#[tokio::test]
async fn create_assigns_a_distinct_handle_per_spawn() {
    let host = FakeProcessHost::new();
    let a = host.create(params("run")).await.expect("spawn a");
    let b = host.create(params("run")).await.expect("spawn b");
    assert_ne!(a, b);
}

#[tokio::test]
async fn exit_code_is_none_until_set() {
    let host = FakeProcessHost::new();
    let handle = host.create(params("run")).await.expect("spawn");
    assert_eq!(host.exit_code(handle).await.expect("exit_code"), None);

    host.set_exit_code(handle, 7);
    assert_eq!(host.exit_code(handle).await.expect("exit_code"), Some(7));
}

#[tokio::test]
async fn terminate_records_signaled_exit_code_if_unset() {
    let host = FakeProcessHost::new();
    let handle = host.create(params("run")).await.expect("spawn");
    host.terminate(handle).await.expect("terminate");

    let spawned = host.inspect(handle).expect("spawned");
    assert!(spawned.terminated);
    assert_eq!(spawned.exit_code, Some(winss_core::SIGNALED_EXIT_CODE));
}

#[tokio::test]
async fn send_break_is_recorded() {
    let host = FakeProcessHost::new();
    let handle = host.create(params("run")).await.expect("spawn");
    host.send_break(handle).await.expect("send_break");
    assert!(host.inspect(handle).expect("spawned").broke);
}

#[tokio::test]
async fn unknown_handle_errors() {
    let host = FakeProcessHost::new();
    let bogus = ProcessHandle(404);
    assert!(matches!(
        host.exit_code(bogus).await,
        Err(ProcessError::NotFound(_))
    ));
}
