// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor state (spec.md §3 ServiceState, §4.8 State File).
//!
//! `ServiceState` is the in-memory twin of the JSON state file. It is
//! created once at supervisor construction, mutated only by the supervisor
//! state machine, and serialized atomically on every notification — see
//! `winss-runtime`'s state file writer for the persistence side; this type
//! only carries the data and the human-readable rendering.

use crate::time_fmt::elapsed_seconds;
use serde::{Deserialize, Serialize};

/// Sentinel `exit_code` meaning the supervisor forced the child down rather
/// than letting it exit on its own (e.g. finish timeout).
pub const DOWN_EXIT_CODE: i32 = 125;

/// Sentinel `exit_code` meaning the child was terminated by a signal or
/// console-break rather than exiting normally.
pub const SIGNALED_EXIT_CODE: i32 = 256;

/// Per-supervisor state, in memory and persisted (spec.md §3).
///
/// Invariants: `is_up` implies `pid != 0`; `remaining_count >= -1`;
/// `up_count >= 0`. When `is_run_process` is false and `is_up` is true, the
/// running child is the finish script rather than run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceState {
    /// Epoch milliseconds of the last state transition.
    pub time: u64,
    /// Epoch milliseconds of the last run/end event.
    pub last: u64,
    /// Whether the current (or last) child is the `run` script, vs finish.
    pub is_run_process: bool,
    /// Whether a child is currently executing.
    pub is_up: bool,
    /// Whether absence of a `down` marker made the service start at boot.
    pub initially_up: bool,
    /// Count of run-invocations since supervisor startup.
    pub up_count: u32,
    /// -1 unbounded, 0 "do not start again", positive a start budget.
    pub remaining_count: i64,
    /// Last child exit code, or one of [`DOWN_EXIT_CODE`]/[`SIGNALED_EXIT_CODE`].
    pub exit_code: i32,
    /// OS identifier of the currently running child, 0 when down.
    pub pid: u32,
}

impl ServiceState {
    /// The state a freshly constructed supervisor starts from, before its
    /// init callback runs.
    pub fn new(now_ms: u64) -> Self {
        Self {
            time: now_ms,
            last: now_ms,
            is_run_process: true,
            is_up: false,
            initially_up: true,
            up_count: 0,
            remaining_count: -1,
            exit_code: 0,
            pid: 0,
        }
    }

    /// True when `is_up` and the running child is the finish script rather
    /// than run.
    pub fn is_finish_process(&self) -> bool {
        self.is_up && !self.is_run_process
    }

    /// Render a single human-readable status line, matching the shape the
    /// status utility prints:
    ///
    /// `(up (pid N)|down [(exit code N)]) S seconds[, started K times][, normally (up|down)][, want (up|down)|paused]`
    ///
    /// `wants_up` hints whether the supervisor's current policy is to keep
    /// the service up (distinct from `initially_up`, which reflects the
    /// `down` marker seen at startup); `now_ms` is the caller's clock
    /// reading, used to compute elapsed seconds since `last`.
    pub fn format(&self, wants_up: bool, now_ms: u64) -> String {
        let mut out = String::new();
        let running_run = self.is_up && self.is_run_process;

        if running_run {
            out.push_str(&format!("up (pid {})", self.pid));
        } else {
            out.push_str("down");
            if self.exit_code != 0 {
                out.push_str(&format!(" (exit code {})", self.exit_code));
            }
        }

        if let Some(seconds) = elapsed_seconds(self.last, now_ms) {
            out.push_str(&format!(" {seconds} seconds"));
        }

        if wants_up {
            if self.up_count > 1 {
                out.push_str(&format!(", started {} times", self.up_count));
            }

            if running_run {
                if !self.initially_up {
                    out.push_str(", normally down");
                }
                if self.remaining_count == 0 {
                    out.push_str(", want down");
                }
            } else {
                if self.initially_up {
                    out.push_str(", normally up");
                }
                if self.remaining_count != 0 {
                    out.push_str(", want up");
                } else if self.up_count > 0 {
                    out.push_str(", paused");
                }
            }
        }

        out
    }
}

#[cfg(test)]
#[path = "service_state_tests.rs"]
mod tests;
