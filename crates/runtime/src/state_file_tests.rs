// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::path::Path;
use winss_platform::FakeFsHost;

fn sample() -> ServiceState {
    ServiceState {
        time: 1_700_000_000_000,
        last: 1_700_000_000_500,
        is_run_process: true,
        is_up: true,
        initially_up: true,
        up_count: 3,
        remaining_count: -1,
        exit_code: 0,
        pid: 4321,
    }
}

#[tokio::test]
async fn write_then_read_round_trips_every_field() {
    let fs = FakeFsHost::default();
    let dir = Path::new("/svc/web");
    write(&fs, dir, &sample()).await.expect("write");

    let read_back = read(&fs, dir).await.expect("state present");
    assert_eq!(read_back, sample());
}

#[tokio::test]
async fn write_goes_to_supervise_state_path() {
    let fs = FakeFsHost::default();
    let dir = Path::new("/svc/web");
    write(&fs, dir, &sample()).await.expect("write");
    assert!(fs.written(&path_for(dir)).is_some());
}

#[tokio::test]
async fn read_missing_file_returns_none() {
    let fs = FakeFsHost::default();
    assert!(read(&fs, Path::new("/svc/nowhere")).await.is_none());
}

#[tokio::test]
async fn read_unparseable_file_returns_none_rather_than_erroring() {
    let fs = FakeFsHost::default();
    let dir = Path::new("/svc/web");
    fs.seed(path_for(dir), b"not json".to_vec());
    assert!(read(&fs, dir).await.is_none());
}

#[test]
fn document_renders_down_and_finish_strings() {
    let mut state = sample();
    state.is_up = false;
    state.is_run_process = false;
    state.initially_up = false;
    let doc = StateFileDocument::from(&state);
    assert_eq!(doc.state, "down");
    assert_eq!(doc.proc, "finish");
    assert_eq!(doc.initial, "down");
}
