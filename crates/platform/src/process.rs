// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Managed child process capability (spec.md §4.5), grounded on
//! `examples/original_source/lib/winss/process.hpp`'s `Process` type.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;

#[cfg(windows)]
mod windows_impl;
#[cfg(unix)]
mod unix_impl;

#[cfg(windows)]
pub use windows_impl::WindowsProcessHost;
#[cfg(unix)]
pub use unix_impl::UnixProcessHost;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {cmd:?} in {dir:?}: {source}")]
    Spawn {
        cmd: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("process handle {0} not found")]
    NotFound(ProcessHandle),
    #[error("waiting on process handle {handle} failed: {source}")]
    Wait {
        handle: ProcessHandle,
        #[source]
        source: std::io::Error,
    },
    #[error("operation failed: {0}")]
    Other(String),
}

/// Opaque handle to a spawned child, stable for the lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessHandle(pub u64);

impl std::fmt::Display for ProcessHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standard I/O wiring for a spawned child, expressed as already-opened pipe
/// ends (`winss-platform`'s pipe transport owns creating them so a service's
/// stdout can be handed directly to its log-service's stdin without an
/// intermediate buffer in the supervisor — spec.md §1).
#[derive(Debug, Default)]
pub struct Stdio {
    pub stdout: Option<std::fs::File>,
    pub stderr: Option<std::fs::File>,
    pub stdin: Option<std::fs::File>,
}

/// Parameters to start a managed child (spec.md §4.5, mirrors the original's
/// `ProcessParams`).
#[derive(Debug)]
pub struct ProcessParams {
    /// Full command line, parsed and executed by the platform shell.
    pub cmd: String,
    /// Start the child in a new process group so [`ProcessHost::send_break`]
    /// can target it without affecting the supervisor itself.
    pub create_group: bool,
    /// Working directory for the child.
    pub dir: PathBuf,
    /// Composed process environment (winss-runtime's Environment Compositor
    /// output).
    pub env: HashMap<String, String>,
    pub stdio: Stdio,
}

/// Capability trait over child process lifecycle: create, break, terminate,
/// exit-code, close (spec.md §4.5). One production implementation per
/// platform family, one deterministic fake for tests.
#[async_trait]
pub trait ProcessHost: Clone + Send + Sync + 'static {
    /// Spawn a child, returning a handle used for the rest of its lifecycle.
    async fn create(&self, params: ProcessParams) -> Result<ProcessHandle, ProcessError>;

    /// OS process id of a still-active handle.
    async fn process_id(&self, handle: ProcessHandle) -> Result<u32, ProcessError>;

    /// `None` while still running; `Some(exit_code)` once it has exited.
    /// `256` is the signaled-exit-code sentinel (spec.md §3, §9).
    async fn exit_code(&self, handle: ProcessHandle) -> Result<Option<i32>, ProcessError>;

    /// Send a console-break equivalent. Only effective if the process was
    /// created with `create_group: true`.
    async fn send_break(&self, handle: ProcessHandle) -> Result<(), ProcessError>;

    /// Forcibly terminate; no graceful handling on the target's side.
    async fn terminate(&self, handle: ProcessHandle) -> Result<(), ProcessError>;

    /// Release resources associated with a handle without affecting the
    /// child if it is still running.
    async fn close(&self, handle: ProcessHandle) -> Result<(), ProcessError>;

    /// Creates a connected anonymous pipe (read end, write end), used by the
    /// Scanner to wire one service's stdout/stderr into its paired
    /// log-service's stdin (spec.md §4.11, grounded on
    /// `examples/original_source/lib/winss/svscan/service.hpp`'s
    /// `ServiceTmpl::CreatePipes`).
    async fn create_pipe(&self) -> Result<(std::fs::File, std::fs::File), ProcessError>;
}

#[cfg(unix)]
pub(crate) fn anonymous_pipe() -> Result<(std::fs::File, std::fs::File), ProcessError> {
    use std::os::fd::FromRawFd;
    let mut fds = [0; 2];
    // SAFETY: `fds` is a valid 2-element array for `pipe(2)` to write into.
    let rc = unsafe { libc::pipe(fds.as_mut_ptr()) };
    if rc != 0 {
        return Err(ProcessError::Other(format!(
            "pipe(2) failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    // SAFETY: `pipe(2)` succeeded, so both fds are open and owned by us.
    let read_end = unsafe { std::fs::File::from_raw_fd(fds[0]) };
    // SAFETY: see above.
    let write_end = unsafe { std::fs::File::from_raw_fd(fds[1]) };
    Ok((read_end, write_end))
}

#[cfg(windows)]
pub(crate) fn anonymous_pipe() -> Result<(std::fs::File, std::fs::File), ProcessError> {
    use std::os::windows::io::FromRawHandle;
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::System::Pipes::CreatePipe;

    let mut read_handle = HANDLE::default();
    let mut write_handle = HANDLE::default();
    // SAFETY: both output pointers are valid `HANDLE` locals; `CreatePipe`
    // fills them in or returns an error without touching them.
    unsafe {
        CreatePipe(&mut read_handle, &mut write_handle, None, 0)
            .map_err(|e| ProcessError::Other(format!("CreatePipe failed: {e}")))?;
    }
    // SAFETY: `CreatePipe` succeeded, so both handles are open and owned by us.
    let read_end = unsafe { std::fs::File::from_raw_handle(read_handle.0 as *mut _) };
    // SAFETY: see above.
    let write_end = unsafe { std::fs::File::from_raw_handle(write_handle.0 as *mut _) };
    Ok((read_end, write_end))
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeProcessHost, SpawnedProcess};

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
