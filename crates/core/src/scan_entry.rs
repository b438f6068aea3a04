// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner bookkeeping types (spec.md §3: ServiceDirectory, ArchiveFile).

use std::path::PathBuf;

/// One entry in the scanner's view of the scan directory.
///
/// The `flagged` bit is cycled by the scanner each reconciliation pass:
/// cleared at scan start, set when the entry is re-checked against the
/// directory listing. Entries still unset at scan end are candidates for
/// removal on a nuke command.
#[derive(Debug, Clone)]
pub struct ServiceDirectory {
    /// The service's directory name (not the full path).
    pub name: String,
    /// Absolute path to the service directory.
    pub path: PathBuf,
    /// Absolute path to the paired `log` directory, if this service has one.
    pub log_path: Option<PathBuf>,
    pub flagged: bool,
}

impl ServiceDirectory {
    pub fn new(name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            name: name.into(),
            path,
            log_path: None,
            flagged: false,
        }
    }

    pub fn with_log_path(mut self, log_path: PathBuf) -> Self {
        self.log_path = Some(log_path);
        self
    }

    pub fn has_log(&self) -> bool {
        self.log_path.is_some()
    }
}

/// A single rotated log file, ordered by `timestamp` ascending.
///
/// Defined to mirror the original log core's data model; the log core
/// itself is out of scope for this crate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArchiveFile {
    pub timestamp: u64,
    pub file: PathBuf,
}

#[cfg(test)]
#[path = "scan_entry_tests.rs"]
mod tests;
