// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! POSIX stand-in for the Win32 `Process` capability, used when this
//! workspace is built on a non-Windows host (development and test
//! environments). Process groups substitute for Win32 process groups;
//! `SIGTERM` substitutes for `CTRL_BREAK_EVENT` and `SIGKILL` for
//! `TerminateProcess`.

use super::{ProcessError, ProcessHandle, ProcessHost, ProcessParams};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::os::unix::process::CommandExt;
use std::process::Stdio as StdStdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::process::{Child, Command};

struct Entry {
    child: Child,
    pid: u32,
}

#[derive(Clone, Default)]
pub struct UnixProcessHost {
    children: Arc<Mutex<HashMap<u64, Entry>>>,
    next_id: Arc<AtomicU64>,
}

impl UnixProcessHost {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProcessHost for UnixProcessHost {
    async fn create(&self, params: ProcessParams) -> Result<ProcessHandle, ProcessError> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(&params.cmd);
        command.current_dir(&params.dir);
        command.env_clear();
        command.envs(params.env.iter());

        command.stdout(params.stdio.stdout.map_or(StdStdio::inherit(), StdStdio::from));
        command.stderr(params.stdio.stderr.map_or(StdStdio::inherit(), StdStdio::from));
        command.stdin(params.stdio.stdin.map_or(StdStdio::inherit(), StdStdio::from));

        if params.create_group {
            unsafe {
                command.pre_exec(|| {
                    if unsafe { libc::setpgid(0, 0) } != 0 {
                        return Err(std::io::Error::last_os_error());
                    }
                    Ok(())
                });
            }
        }

        let child = command.spawn().map_err(|source| ProcessError::Spawn {
            cmd: params.cmd.clone(),
            dir: params.dir.clone(),
            source,
        })?;
        let pid = child.id().ok_or_else(|| {
            ProcessError::Other("spawned child has no pid".to_string())
        })?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.children.lock().insert(id, Entry { child, pid });
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
            Ok(Some(status)) => Ok(Some(exit_status_to_code(status))),
            Ok(None) => Ok(None),
            Err(source) => Err(ProcessError::Wait { handle, source }),
        }
    }

    async fn send_break(&self, handle: ProcessHandle) -> Result<(), ProcessError> {
        let pid = self.process_id(handle).await?;
        unsafe {
            libc::kill(-(pid as i32), libc::SIGTERM);
        }
        Ok(())
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
        self.children.lock().remove(&handle.0);
        Ok(())
    }

    async fn create_pipe(&self) -> Result<(std::fs::File, std::fs::File), ProcessError> {
        super::anonymous_pipe()
    }
}

fn exit_status_to_code(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => code,
        None => match status.signal() {
            Some(_) => winss_core::SIGNALED_EXIT_CODE,
            None => -1,
        },
    }
}

#[cfg(test)]
#[path = "unix_impl_tests.rs"]
mod tests;
