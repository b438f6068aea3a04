// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::PathBuf;
use tokio::task::LocalSet;
use winss_core::FakeClock;
use winss_platform::{FakeFsHost, FakePathMutexHost, FakeProcessHost};

type TestSupervisor = Supervisor<FakeProcessHost, FakeFsHost, FakePathMutexHost, FakeClock>;

fn harness(dir: &str) -> (TestSupervisor, FakeFsHost, FakeProcessHost, FakePathMutexHost, FakeClock) {
    let fs = FakeFsHost::default();
    let ph = FakeProcessHost::new();
    let pm = FakePathMutexHost::new();
    let clock = FakeClock::new();
    let mux = Multiplexer::new();
    let sup = Supervisor::new(mux, ph.clone(), fs.clone(), pm.clone(), clock.clone(), PathBuf::from(dir));
    (sup, fs, ph, pm, clock)
}

#[tokio::test(flavor = "current_thread")]
async fn missing_service_dir_is_rejected() {
    LocalSet::new()
        .run_until(async {
            let (sup, _fs, _ph, _pm, _clock) = harness("/svc/ghost");
            assert_eq!(sup.init().await, Err(InitError::MissingDir));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn second_init_on_same_dir_conflicts() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, pm, clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            sup.init().await.expect("first init");

            let contender_mux = Multiplexer::new();
            let contender = Supervisor::new(
                contender_mux,
                ph,
                fs,
                pm.contender(),
                clock,
                PathBuf::from("/svc/web"),
            );
            assert_eq!(contender.init().await, Err(InitError::LockConflict));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn init_without_down_marker_starts_run() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());

            sup.init().await.expect("init");

            let state = sup.snapshot();
            assert!(state.is_up);
            assert!(state.is_run_process);
            assert!(state.initially_up);
            assert_eq!(state.up_count, 1);
            assert_ne!(state.pid, 0);

            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert_eq!(spawned.cmd, "exec web");
            assert!(spawned.create_group);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn init_with_down_marker_stays_down() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, _ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            fs.seed("/svc/web/down", Vec::new());

            sup.init().await.expect("init");

            let state = sup.snapshot();
            assert!(!state.is_up);
            assert!(!state.initially_up);
            assert_eq!(state.remaining_count, 0);
            assert_eq!(state.up_count, 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn run_exit_with_finish_script_spawns_finish_with_exit_code_env() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            fs.seed("/svc/web/finish", b"exec cleanup".to_vec());

            sup.init().await.expect("init");
            ph.set_exit_code(ProcessHandle(0), 7);
            sup.step(false).await;

            let state = sup.snapshot();
            assert!(state.is_up);
            assert!(!state.is_run_process);

            let finish = ph.inspect(ProcessHandle(1)).expect("finish spawned");
            assert_eq!(finish.cmd, "exec cleanup");
            assert_eq!(finish.env.get("SUPERVISE_RUN_EXIT_CODE"), Some(&"7".to_string()));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn run_exit_without_finish_script_goes_straight_to_finished() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());

            sup.init().await.expect("init");
            ph.set_exit_code(ProcessHandle(0), 0);
            sup.step(false).await;

            let state = sup.snapshot();
            assert!(!state.is_up);
            assert!(!state.is_run_process);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn down_command_terminates_run_child_and_clears_budget() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            sup.init().await.expect("init");

            sup.command(SupervisorCommand::Down).await;

            assert_eq!(sup.snapshot().remaining_count, 0);
            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert!(spawned.broke);
            assert!(!spawned.terminated);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn kill_command_terminates_run_child() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            sup.init().await.expect("init");

            sup.command(SupervisorCommand::Kill).await;

            let spawned = ph.inspect(ProcessHandle(0)).expect("spawned");
            assert!(spawned.terminated);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn once_restarts_the_budget_when_already_down() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, _ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            fs.seed("/svc/web/down", Vec::new());
            sup.init().await.expect("init");
            assert!(!sup.snapshot().is_up);

            sup.command(SupervisorCommand::Once).await;

            let state = sup.snapshot();
            assert!(state.is_up);
            assert_eq!(state.up_count, 1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn once_exhausts_budget_without_disturbing_a_running_child() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, _ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            sup.init().await.expect("init");
            assert!(sup.snapshot().is_up);

            sup.command(SupervisorCommand::Once).await;

            let state = sup.snapshot();
            assert!(state.is_up);
            assert_eq!(state.remaining_count, 0);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn exit_command_emits_exit_and_stops_multiplexer_when_already_down() {
    LocalSet::new()
        .run_until(async {
            let fs = FakeFsHost::default();
            let ph = FakeProcessHost::new();
            let pm = FakePathMutexHost::new();
            let clock = FakeClock::new();
            let mux = Multiplexer::new();
            fs.seed("/svc/web/run", b"exec web".to_vec());
            fs.seed("/svc/web/down", Vec::new());
            let sup = Supervisor::new(mux.clone(), ph, fs, pm, clock, PathBuf::from("/svc/web"));
            sup.init().await.expect("init");
            assert!(!sup.snapshot().is_up);

            sup.command(SupervisorCommand::Exit).await;

            assert!(mux.is_stopping());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn commands_are_ignored_without_the_path_mutex() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, _ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            // Note: command() is called before init(), so no mutex name is
            // cached yet and the command must be a no-op rather than panic.
            sup.command(SupervisorCommand::Down).await;
            assert_eq!(sup.snapshot().remaining_count, -1);
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn state_file_is_written_on_init() {
    LocalSet::new()
        .run_until(async {
            let (sup, fs, _ph, _pm, _clock) = harness("/svc/web");
            fs.seed("/svc/web/run", b"exec web".to_vec());
            sup.init().await.expect("init");
            assert!(fs.written(&state_file::path_for(&PathBuf::from("/svc/web"))).is_some());
        })
        .await;
}
