// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime-level errors, each carrying the exit code spec.md §7 assigns to
//! its error kind.

use thiserror::Error;
use winss_core::ServiceId;

/// Fatal-boot: the scan/service directory is missing or unreadable.
pub const FATAL_BOOT: i32 = 111;
/// Lock-conflict: the path mutex is already held by a peer process.
pub const LOCK_CONFLICT: i32 = 100;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("service directory {path:?} does not exist")]
    MissingServiceDir { path: std::path::PathBuf },

    #[error("scan directory {path:?} does not exist")]
    MissingScanDir { path: std::path::PathBuf },

    #[error("path mutex for {path:?} is already held")]
    LockConflict { path: std::path::PathBuf },

    #[error("unable to spawn {script} for service {service}: {source}")]
    Spawn {
        service: ServiceId,
        script: &'static str,
        #[source]
        source: winss_platform::ProcessError,
    },

    #[error("platform error: {0}")]
    Platform(#[from] winss_platform::ProcessError),

    #[error("pipe error: {0}")]
    Pipe(#[from] winss_platform::PipeError),

    #[error("filesystem error: {0}")]
    Fs(#[from] winss_platform::FsError),

    #[error("multiplexer error: {0}")]
    Multiplexer(#[from] crate::multiplexer::MultiplexerError),
}

impl RuntimeError {
    /// Exit code this error implies at a binary's `main`, per spec.md §7.
    pub fn exit_code(&self) -> i32 {
        match self {
            RuntimeError::MissingServiceDir { .. } | RuntimeError::MissingScanDir { .. } => {
                FATAL_BOOT
            }
            RuntimeError::LockConflict { .. } => LOCK_CONFLICT,
            _ => FATAL_BOOT,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
