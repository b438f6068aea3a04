// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic pipe and mutex names derived from a canonical filesystem
//! path (spec.md §3: PipeName, MutexName).
//!
//! Both names are built the same way the original implementation built
//! them (`lib/winss/pipe_name.cpp`, `lib/winss/path_mutex.cpp`): take the
//! canonical path, SHA-256-hex it, prefix with a platform namespace, and
//! optionally suffix with `_<suffix>` to disambiguate multiple pipes rooted
//! at the same supervisor (inbound/outbound/control/event).
//!
//! This module only does the pure string construction; canonicalizing the
//! path is the caller's job (it is a filesystem operation, done through
//! `winss-platform`'s `FsHost`).

use crate::digest::sha256_hex;
use std::fmt;

const PIPE_PREFIX: &str = r"\\.\pipe\";
const MUTEX_PREFIX: &str = r"Global\";

/// Which side/role a pipe serves, used only to pick the wire suffix; the
/// name itself is still rooted at the supervisor's path digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeRole {
    /// Supervisor -> client event stream (outbound server).
    Event,
    /// Client -> supervisor command stream (inbound server).
    Control,
}

impl PipeRole {
    fn suffix(self) -> &'static str {
        match self {
            PipeRole::Event => "event",
            PipeRole::Control => "control",
        }
    }
}

/// A deterministic named-pipe name rooted at a canonical filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PipeName(String);

impl PipeName {
    /// Build a pipe name from an already-canonicalized path string, with no
    /// suffix.
    pub fn new(canonical_path: &str) -> Self {
        Self(format!("{PIPE_PREFIX}{}", sha256_hex(canonical_path)))
    }

    /// Build a pipe name from an already-canonicalized path string and a
    /// named role (event/control). An empty role suffix is never produced.
    pub fn for_role(canonical_path: &str, role: PipeRole) -> Self {
        Self::new(canonical_path).append(role.suffix())
    }

    /// Append an additional suffix to an existing pipe name.
    pub fn append(&self, suffix: &str) -> Self {
        if suffix.is_empty() {
            self.clone()
        } else {
            Self(format!("{}_{}", self.0, suffix))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PipeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A deterministic system-wide mutex name rooted at a canonical filesystem
/// path, parallel to [`PipeName`] but with the mutex namespace prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MutexName(String);

impl MutexName {
    pub fn new(canonical_path: &str, suffix: &str) -> Self {
        let digest = sha256_hex(canonical_path);
        if suffix.is_empty() {
            Self(format!("{MUTEX_PREFIX}{digest}"))
        } else {
            Self(format!("{MUTEX_PREFIX}{digest}_{suffix}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MutexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
