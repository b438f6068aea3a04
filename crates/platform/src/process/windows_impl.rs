// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Win32 `ProcessHost`, grounded on
//! `examples/original_source/lib/winss/process.cpp`'s `Process` for the
//! create/break/terminate/exit-code shape and on `tumf-agent-exec`'s
//! `assign_to_job_object` for the Job Object pattern that lets
//! [`ProcessHost::terminate`] kill a whole process tree instead of just the
//! immediate child.

use super::{ProcessError, ProcessHandle, ProcessHost, ProcessParams};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::windows::process::CommandExt;
use std::process::Stdio as StdStdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::process::{Child, Command};
use windows::Win32::Foundation::{CloseHandle, HANDLE};
use windows::Win32::System::JobObjects::{AssignProcessToJobObject, CreateJobObjectW};
use windows::Win32::System::Console::{GenerateConsoleCtrlEvent, CTRL_BREAK_EVENT};
use windows::Win32::System::Threading::{OpenProcess, PROCESS_SET_QUOTA, PROCESS_TERMINATE};

const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;

struct Entry {
    child: Child,
    pid: u32,
    job: Option<HANDLE>,
}

// SAFETY: job handles are only ever touched while `children`'s mutex is
// held, and never read by the OS concurrently with our use of them.
unsafe impl Send for Entry {}

#[derive(Clone, Default)]
pub struct WindowsProcessHost {
    children: Arc<Mutex<HashMap<u64, Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl WindowsProcessHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_job_object(pid: u32) -> Result<HANDLE, ProcessError> {
        unsafe {
            let proc_handle = OpenProcess(PROCESS_TERMINATE | PROCESS_SET_QUOTA, false, pid)
                .map_err(|e| ProcessError::Other(format!("OpenProcess({pid}) failed: {e}")))?;

            let job = match CreateJobObjectW(None, None) {
                Ok(h) => h,
                Err(e) => {
                    let _ = CloseHandle(proc_handle);
                    return Err(ProcessError::Other(format!("CreateJobObjectW failed: {e}")));
                }
            };

            if let Err(e) = AssignProcessToJobObject(job, proc_handle) {
                let _ = CloseHandle(job);
                let _ = CloseHandle(proc_handle);
                return Err(ProcessError::Other(format!(
                    "AssignProcessToJobObject({pid}) failed: {e}"
                )));
            }

            let _ = CloseHandle(proc_handle);
            Ok(job)
        }
    }
}

#[async_trait]
impl ProcessHost for WindowsProcessHost {
    async fn create(&self, params: ProcessParams) -> Result<ProcessHandle, ProcessError> {
        let mut command = Command::new("cmd");
        command.arg("/C").arg(&params.cmd);
        command.current_dir(&params.dir);
        command.env_clear();
        command.envs(params.env.iter());

        command.stdout(params.stdio.stdout.map_or(StdStdio::inherit(), StdStdio::from));
        command.stderr(params.stdio.stderr.map_or(StdStdio::inherit(), StdStdio::from));
        command.stdin(params.stdio.stdin.map_or(StdStdio::inherit(), StdStdio::from));

        if params.create_group {
            command.creation_flags(CREATE_NEW_PROCESS_GROUP);
        }

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            cmd: params.cmd.clone(),
            dir: params.dir.clone(),
            source,
        })?;
        let pid = child
            .id()
            .ok_or_else(|| ProcessError::Other("spawned child has no pid".to_string()))?;

        let job = if params.create_group {
            Self::assign_job_object(pid).ok()
        } else {
            None
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.children.lock().insert(id, Entry { child, pid, job });
        Ok(ProcessHandle(id))
    }

    async fn process_id(&self, handle: ProcessHandle) -> Result<u32, ProcessError> {
        self.children
            .lock()
            .get(&handle.0)
            .map(|e| e.pid)
            .ok_or(ProcessError::NotFound(handle))
    }

    async fn exit_code(&self, handle: ProcessHandle) -> Result<Option<i32>, ProcessError> {
        let mut children = self.children.lock();
        let entry = children.get_mut(&handle.0).ok_or(ProcessError::NotFound(handle))?;
        match entry.child.try_wait() {
            Ok(Some(status)) => Ok(Some(status.code().unwrap_or(winss_core::SIGNALED_EXIT_CODE))),
            Ok(None) => Ok(None),
            Err(source) => Err(ProcessError::Wait { handle, source }),
        }
    }

    async fn send_break(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let pid = self.process_id(handle).await?;
        unsafe {
            GenerateConsoleCtrlEvent(CTRL_BREAK_EVENT, pid)
                .map_err(|e| ProcessError::Other(format!("GenerateConsoleCtrlEvent failed: {e}")))
        }
    }

    async fn terminate(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let mut children = self.children.lock();
        let entry = children.get_mut(&handle.0).ok_or(ProcessError::NotFound(handle))?;
        entry
            .child
            .start_kill()
            .map_err(|e| ProcessError::Other(e.to_string()))
    }

    async fn close(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        if let Some(entry) = self.children.lock().remove(&handle.0) {
            if let Some(job) = entry.job {
                unsafe {
                    let _ = CloseHandle(job);
                }
            }
        }
        Ok(())
    }

    async fn create_pipe(&self) -> Result<(std::fs::File, std::fs::File), ProcessError> {
        super::anonymous_pipe()
    }
}
