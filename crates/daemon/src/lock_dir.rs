// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the directory [`winss_platform::Fs2PathMutexHost`] keeps its
//! lock files in, grounded on the teacher daemon's `env::state_dir`
//! fallback chain (`OJ_STATE_DIR` > `XDG_STATE_HOME` > `~/.local/state`):
//! `WINSS_LOCK_DIR` > `XDG_STATE_HOME/winss` > `~/.local/state/winss`.
//!
//! Unlike the state directory that teacher function resolves (one daemon's
//! own private data), this directory is shared by every `supervise`/`svscan`
//! process on the host: it only ever holds empty lock files named after a
//! [`winss_core::MutexName`] digest, so collisions across services are the
//! point, not a bug.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("could not determine a lock directory: set WINSS_LOCK_DIR or HOME")]
pub struct NoLockDir;

pub fn resolve() -> Result<PathBuf, NoLockDir> {
    if let Ok(dir) = std::env::var("WINSS_LOCK_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("winss"));
    }
    let home = std::env::var("HOME").map_err(|_| NoLockDir)?;
    Ok(PathBuf::from(home).join(".local/state/winss"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn prefers_winss_lock_dir() {
        std::env::set_var("WINSS_LOCK_DIR", "/tmp/explicit");
        std::env::remove_var("XDG_STATE_HOME");
        assert_eq!(resolve(), Ok(PathBuf::from("/tmp/explicit")));
        std::env::remove_var("WINSS_LOCK_DIR");
    }

    #[test]
    #[serial]
    fn falls_back_to_xdg_state_home() {
        std::env::remove_var("WINSS_LOCK_DIR");
        std::env::set_var("XDG_STATE_HOME", "/tmp/xdg");
        assert_eq!(resolve(), Ok(PathBuf::from("/tmp/xdg/winss")));
        std::env::remove_var("XDG_STATE_HOME");
    }
}
