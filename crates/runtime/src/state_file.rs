// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State file persistence (spec.md §4.8): `<service>/supervise/state`, a
//! JSON document rewritten atomically on every supervisor notification.
//!
//! `ServiceState` (winss-core) is the in-memory representation; this module
//! owns the on-disk JSON schema, which uses ISO-8601 timestamps and string
//! enums rather than `ServiceState`'s epoch-millis/bool fields, and the
//! read/write wiring through [`FsHost`] (EXPANSION 4.8a).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use winss_core::time_fmt::{epoch_ms_to_iso8601, iso8601_to_epoch_ms};
use winss_core::ServiceState;
use winss_platform::{FsError, FsHost};

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error("failed to encode state file: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Serialize, Deserialize)]
struct StateFileDocument {
    time: String,
    last: String,
    proc: String,
    state: String,
    initial: String,
    count: u32,
    remaining: i64,
    pid: u32,
    exit: i32,
}

impl From<&ServiceState> for StateFileDocument {
    fn from(s: &ServiceState) -> Self {
        Self {
            time: epoch_ms_to_iso8601(s.time),
            last: epoch_ms_to_iso8601(s.last),
            proc: if s.is_run_process { "run" } else { "finish" }.to_string(),
            state: if s.is_up { "up" } else { "down" }.to_string(),
            initial: if s.initially_up { "up" } else { "down" }.to_string(),
            count: s.up_count,
            remaining: s.remaining_count,
            pid: s.pid,
            exit: s.exit_code,
        }
    }
}

impl TryFrom<StateFileDocument> for ServiceState {
    type Error = ();

    fn try_from(doc: StateFileDocument) -> Result<Self, ()> {
        let time = iso8601_to_epoch_ms(&doc.time).ok_or(())?;
        let last = iso8601_to_epoch_ms(&doc.last).ok_or(())?;
        let is_run_process = match doc.proc.as_str() {
            "run" => true,
            "finish" => false,
            _ => return Err(()),
        };
        let is_up = match doc.state.as_str() {
            "up" => true,
            "down" => false,
            _ => return Err(()),
        };
        let initially_up = match doc.initial.as_str() {
            "up" => true,
            "down" => false,
            _ => return Err(()),
        };
        Ok(ServiceState {
            time,
            last,
            is_run_process,
            is_up,
            initially_up,
            up_count: doc.count,
            remaining_count: doc.remaining,
            exit_code: doc.exit,
            pid: doc.pid,
        })
    }
}

/// Path to a service's state file, `<service>/supervise/state`.
pub fn path_for(service_dir: &Path) -> PathBuf {
    service_dir.join("supervise").join("state")
}

/// Atomically rewrites the state file from the supervisor's current
/// in-memory state (spec.md §4.8: "every notification rewrites the file
/// atomically").
pub async fn write(
    fs: &impl FsHost,
    service_dir: &Path,
    state: &ServiceState,
) -> Result<(), StateFileError> {
    let doc = StateFileDocument::from(state);
    let json = serde_json::to_vec(&doc)?;
    fs.write_atomic(&path_for(service_dir), &json).await?;
    Ok(())
}

/// Reads and parses the state file, tolerating a missing file or any parse
/// failure by returning `None` rather than an error (spec.md §4.8 `Read`,
/// §7 "Parse errors on the state file: treat as no readable state").
pub async fn read(fs: &impl FsHost, service_dir: &Path) -> Option<ServiceState> {
    let contents = fs.read_to_string(&path_for(service_dir)).await.ok()??;
    let doc: StateFileDocument = serde_json::from_str(&contents).ok()?;
    ServiceState::try_from(doc).ok()
}

/// Synchronous twin of [`read`] for callers outside the supervisor's own
/// `FsHost` abstraction — `svstat`, and the wait-condition snapshot closures
/// `svc`/`svwait` hand to [`crate::control_rendezvous::NotificationWaitItem`],
/// which must be plain synchronous functions (spec.md §4.10).
pub fn read_sync(service_dir: &Path) -> Option<ServiceState> {
    let contents = std::fs::read_to_string(path_for(service_dir)).ok()?;
    let doc: StateFileDocument = serde_json::from_str(&contents).ok()?;
    ServiceState::try_from(doc).ok()
}

#[cfg(test)]
#[path = "state_file_tests.rs"]
mod tests;
