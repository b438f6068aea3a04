// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fresh_state_is_down_and_unbounded() {
    let state = ServiceState::new(1_000);
    assert!(!state.is_up);
    assert_eq!(state.pid, 0);
    assert_eq!(state.remaining_count, -1);
    assert_eq!(state.up_count, 0);
    assert!(state.initially_up);
}

#[test]
fn is_finish_process_requires_up_and_not_run() {
    let mut state = ServiceState::new(0);
    assert!(!state.is_finish_process());

    state.is_up = true;
    state.is_run_process = true;
    assert!(!state.is_finish_process());

    state.is_run_process = false;
    assert!(state.is_finish_process());
}

#[test]
fn format_running_run_shows_pid_and_elapsed() {
    let mut state = ServiceState::new(0);
    state.is_up = true;
    state.is_run_process = true;
    state.pid = 4321;
    state.last = 0;

    let line = state.format(true, 5_000);
    assert_eq!(line, "up (pid 4321) 5 seconds");
}

#[test]
fn format_down_shows_exit_code_when_nonzero() {
    let mut state = ServiceState::new(0);
    state.exit_code = 1;
    state.last = 0;

    let line = state.format(true, 3_000);
    assert_eq!(line, "down (exit code 1) 3 seconds, want up");
}

#[test]
fn format_down_omits_exit_code_clause_when_zero() {
    let state = ServiceState::new(0);
    let line = state.format(true, 0);
    assert_eq!(line, "down 0 seconds, want up");
}

#[test]
fn format_started_multiple_times_adds_clause() {
    let mut state = ServiceState::new(0);
    state.is_up = true;
    state.is_run_process = true;
    state.pid = 1;
    state.up_count = 3;

    let line = state.format(true, 0);
    assert_eq!(line, "up (pid 1) 0 seconds, started 3 times");
}

#[test]
fn format_run_not_initially_up_adds_normally_down() {
    let mut state = ServiceState::new(0);
    state.is_up = true;
    state.is_run_process = true;
    state.pid = 1;
    state.initially_up = false;

    let line = state.format(true, 0);
    assert_eq!(line, "up (pid 1) 0 seconds, normally down");
}

#[test]
fn format_run_zero_remaining_adds_want_down() {
    let mut state = ServiceState::new(0);
    state.is_up = true;
    state.is_run_process = true;
    state.pid = 1;
    state.remaining_count = 0;

    let line = state.format(true, 0);
    assert_eq!(line, "up (pid 1) 0 seconds, want down");
}

#[test]
fn format_down_initially_up_adds_normally_up() {
    let state = ServiceState::new(0);
    let line = state.format(true, 0);
    assert_eq!(line, "down 0 seconds, normally up, want up");
}

#[test]
fn format_down_zero_remaining_nonzero_up_count_is_paused() {
    let mut state = ServiceState::new(0);
    state.initially_up = false;
    state.remaining_count = 0;
    state.up_count = 1;

    let line = state.format(true, 0);
    assert_eq!(line, "down 0 seconds, paused");
}

#[test]
fn format_without_wants_up_omits_trailing_clauses() {
    let mut state = ServiceState::new(0);
    state.up_count = 5;

    let line = state.format(false, 0);
    assert_eq!(line, "down 0 seconds");
}

#[test]
fn format_omits_elapsed_clause_when_last_is_in_the_future() {
    let mut state = ServiceState::new(0);
    state.last = 10_000;

    let line = state.format(false, 0);
    assert_eq!(line, "down");
}

#[test]
fn state_round_trips_through_json() {
    let mut state = ServiceState::new(1_700_000_000_000);
    state.is_up = true;
    state.pid = 42;
    state.up_count = 7;
    state.exit_code = SIGNALED_EXIT_CODE;

    let json = serde_json::to_string(&state).expect("serialize");
    let decoded: ServiceState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(state, decoded);
}
