// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service identifier: the name of a service directory within a scan set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The name of a service, i.e. the file name of its directory under the
/// scan directory. Two services are the same service iff their names are
/// equal; reconciliation in the scanner is always by name (spec.md §3,
/// ScanSet).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceId(pub String);

impl ServiceId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if this name is excluded from a scan set: empty or dot-prefixed
    /// (spec.md §3, ScanSet; §4.11, Scan()).
    pub fn is_excluded(name: &str) -> bool {
        name.is_empty() || name.starts_with('.')
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ServiceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for ServiceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "service_id_tests.rs"]
mod tests;
