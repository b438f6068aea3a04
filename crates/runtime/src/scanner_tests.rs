// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;
use tokio::task::LocalSet;
use winss_platform::{FakeFsHost, FakePathMutexHost, FakeProcessHost, ProcessHandle};

type TestScanner = Scanner<FakeProcessHost, FakeFsHost, FakePathMutexHost>;

fn harness(dir: &str) -> (TestScanner, FakeFsHost, FakeProcessHost, FakePathMutexHost) {
    let fs = FakeFsHost::default();
    let ph = FakeProcessHost::new();
    let pm = FakePathMutexHost::new();
    let mux = Multiplexer::new();
    let scanner = Scanner::new(mux, ph.clone(), fs.clone(), pm.clone(), PathBuf::from(dir), None);
    (scanner, fs, ph, pm)
}

#[tokio::test(flavor = "current_thread")]
async fn missing_scan_dir_is_rejected() {
    LocalSet::new()
        .run_until(async {
            let (scanner, _fs, _ph, _pm) = harness("/scan/ghost");
            assert_eq!(scanner.init().await, Err(ScanError::MissingDir));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn second_scanner_on_same_dir_conflicts() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, pm) = harness("/scan");
            fs.seed("/scan/.keep", Vec::new());
            scanner.init().await.expect("first init");

            let contender_mux = Multiplexer::new();
            let contender = Scanner::new(
                contender_mux,
                ph,
                fs,
                pm.contender(),
                PathBuf::from("/scan"),
                None,
            );
            assert_eq!(contender.init().await, Err(ScanError::LockConflict));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn init_is_idempotent() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, _ph, _pm) = harness("/scan");
            fs.seed("/scan/.keep", Vec::new());
            scanner.init().await.expect("first init");
            scanner.init().await.expect("second init is a no-op");
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn new_service_without_log_dir_spawns_once_with_no_redirection() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/api/run", b"exec api".to_vec());

            scanner.init().await.expect("init");

            let spawned = ph.inspect(ProcessHandle(0)).expect("api supervise spawned");
            assert_eq!(spawned.cmd, "supervise \"/scan/api\"");
            assert!(!spawned.had_stdin);
            assert!(!spawned.had_stdout);
            assert!(!spawned.had_stderr);
            assert!(ph.inspect(ProcessHandle(1)).is_none());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn new_service_with_log_dir_wires_a_pipe_between_them() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/web/run", b"exec web".to_vec());
            fs.seed("/scan/web/log/run", b"exec log".to_vec());

            scanner.init().await.expect("init");

            let log_spawn = ph.inspect(ProcessHandle(0)).expect("log supervise spawned first");
            assert_eq!(log_spawn.cmd, "supervise \"/scan/web/log\"");
            assert!(log_spawn.had_stdin);
            assert!(!log_spawn.had_stdout);

            let main_spawn = ph.inspect(ProcessHandle(1)).expect("main supervise spawned second");
            assert_eq!(main_spawn.cmd, "supervise \"/scan/web\"");
            assert!(!main_spawn.had_stdin);
            assert!(main_spawn.had_stdout);
            assert!(main_spawn.had_stderr);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn rescanning_an_already_running_service_does_not_respawn() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/api/run", b"exec api".to_vec());

            scanner.init().await.expect("init");
            scanner.scan(false).await;
            scanner.scan(false).await;

            assert!(ph.inspect(ProcessHandle(0)).is_some());
            assert!(ph.inspect(ProcessHandle(1)).is_none());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn close_all_services_ignoring_flagged_closes_everything() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/api/run", b"exec api".to_vec());
            scanner.init().await.expect("init");

            scanner.close_all_services(true).await;

            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert!(spawned.broke);
            assert!(spawned.closed);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn close_all_services_respects_still_flagged_entries() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/api/run", b"exec api".to_vec());
            scanner.init().await.expect("init");

            scanner.close_all_services(false).await;

            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert!(!spawned.broke);
            assert!(!spawned.closed);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn exit_runs_the_finish_file_contents_as_a_trimmed_command() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/.keep", Vec::new());
            scanner.init().await.expect("init");
            fs.seed("/scan/.winss-svscan/finish", b"  exec cleanup  \n".to_vec());

            scanner.exit(false);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;

            let spawned = ph.inspect(ProcessHandle(0)).expect("finish process spawned");
            assert_eq!(spawned.cmd, "exec cleanup");
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn exit_with_close_services_closes_every_running_service_first() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, ph, _pm) = harness("/scan");
            fs.seed("/scan/api/run", b"exec api".to_vec());
            scanner.init().await.expect("init");

            scanner.exit(true);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;

            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert!(spawned.broke);
            assert!(spawned.closed);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn stop_is_idempotent() {
    LocalSet::new()
        .run_until(async {
            let (scanner, fs, _ph, _pm) = harness("/scan");
            fs.seed("/scan/.keep", Vec::new());
            scanner.init().await.expect("init");

            scanner.exit(false);
            scanner.exit(false);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        })
        .await;
}
