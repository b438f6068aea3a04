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
        stdio: crate::process::Stdio::default(),
    }
}

#[tokio::test]
async fn spawns_and_reports_exit_code() {
    let host = UnixProcessHost::new();
    let handle = host.create(params("exit 3")).await.expect("spawn");

    for _ in 0..200 {
        if let Some(code) = host.exit_code(handle).await.expect("exit_code") {
            assert_eq!(code, 3);
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("process never reported exit");
}

#[tokio::test]
async fn exit_code_is_none_while_running() {
    let host = UnixProcessHost::new();
    let handle = host.create(params("sleep 5")).await.expect("spawn");
    assert_eq!(host.exit_code(handle).await.expect("exit_code"), None);
    host.terminate(handle).await.expect("terminate");
}

#[tokio::test]
async fn unknown_handle_is_not_found() {
    let host = UnixProcessHost::new();
    let bogus = ProcessHandle(9999);
    assert!(matches!(
        host.process_id(bogus).await,
        Err(ProcessError::NotFound(_))
    ));
}
