// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake `ProcessHost` for runtime/daemon tests: records every
//! spawn and signal instead of touching the OS.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProcessError, ProcessHandle, ProcessHost, ProcessParams};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The fake's view of a spawned process: a test controls its lifecycle by
/// setting `exit_code` and observes whether `send_break`/`terminate` were
/// called on it.
#[derive(Debug, Clone, Default)]
pub struct SpawnedProcess {
    pub cmd: String,
    pub create_group: bool,
    pub env: std::collections::HashMap<String, String>,
    pub pid: u32,
    pub exit_code: Option<i32>,
    pub broke: bool,
    pub terminated: bool,
    pub closed: bool,
    pub had_stdin: bool,
    pub had_stdout: bool,
    pub had_stderr: bool,
}

struct State {
    processes: std::collections::HashMap<u64, SpawnedProcess>,
    next_id: u64,
    next_pid: u32,
}

/// Fake process host. Tests spawn processes through the trait as usual, then
/// reach into `.inspect(handle)`/`.set_exit_code(handle, code)` to drive the
/// fake's view of the world without a real child process.
#[derive(Clone)]
pub struct FakeProcessHost {
    state: Arc<Mutex<State>>,
}

impl Default for FakeProcessHost {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                processes: std::collections::HashMap::new(),
                next_id: 0,
                next_pid: 1000,
            })),
        }
    }
}

impl FakeProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inspect(&self, handle: ProcessHandle) -> Option<SpawnedProcess> {
        self.state.lock().processes.get(&handle.0).cloned()
    }

    /// Simulate the child exiting with `code`.
    pub fn set_exit_code(&self, handle: ProcessHandle, code: i32) {
        if let Some(entry) = self.state.lock().processes.get_mut(&handle.0) {
            entry.exit_code = Some(code);
        }
    }
}

#[async_trait]
impl ProcessHost for FakeProcessHost {
    async fn create(&self, params: ProcessParams) -> Result<ProcessHandle, ProcessError> {
        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        let pid = state.next_pid;
        state.next_pid += 1;

        state.processes.insert(
            id,
            SpawnedProcess {
                cmd: params.cmd,
                create_group: params.create_group,
                env: params.env,
                pid,
                exit_code: None,
                broke: false,
                terminated: false,
                closed: false,
                had_stdin: params.stdio.stdin.is_some(),
                had_stdout: params.stdio.stdout.is_some(),
                had_stderr: params.stdio.stderr.is_some(),
            },
        );
        Ok(ProcessHandle(id))
    }

    async fn process_id(&self, handle: ProcessHandle) -> Result<u32, ProcessError> {
        self.state
            .lock()
            .processes
            .get(&handle.0)
            .map(|p| p.pid)
            .ok_or(ProcessError::NotFound(handle))
    }

    async fn exit_code(&self, handle: ProcessHandle) -> Result<Option<i32>, ProcessError> {
        self.state
            .lock()
            .processes
            .get(&handle.0)
            .map(|p| p.exit_code)
            .ok_or(ProcessError::NotFound(handle))
    }

    async fn send_break(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        let entry = state.processes.get_mut(&handle.0).ok_or(ProcessError::NotFound(handle))?;
        entry.broke = true;
        Ok(())
    }

    async fn terminate(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        let entry = state.processes.get_mut(&handle.0).ok_or(ProcessError::NotFound(handle))?;
        entry.terminated = true;
        entry.exit_code.get_or_insert(winss_core::SIGNALED_EXIT_CODE);
        Ok(())
    }

    async fn close(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let mut state = self.state.lock();
        let entry = state.processes.get_mut(&handle.0).ok_or(ProcessError::NotFound(handle))?;
        entry.closed = true;
        Ok(())
    }

    async fn create_pipe(&self) -> Result<(std::fs::File, std::fs::File), ProcessError> {
        super::anonymous_pipe()
    }
}
