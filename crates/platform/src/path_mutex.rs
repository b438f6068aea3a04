// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! System-wide path exclusion (spec.md §4.3, §3 MutexName), grounded on
//! `examples/original_source/lib/winss/path_mutex.hpp`'s `Lock`/`CanLock`/
//! `HasLock` shape.
//!
//! The original binds this to `CreateMutex`/`OpenMutex`/`WaitForSingleObject`
//! over a `Global\<digest>` name. Those Win32 primitives have no portable
//! equivalent outside Windows and aren't worth hand-binding when `fs2`
//! already gives cooperative exclusive file locking with the same
//! non-blocking-try semantics `Lock`/`CanLock` need — the production
//! implementation locks a file at `<lock-dir>/<digest>[_<suffix>].lock`
//! instead (recorded as an open-question resolution in DESIGN.md).

use async_trait::async_trait;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use thiserror::Error;
use winss_core::MutexName;

#[derive(Debug, Error)]
pub enum PathMutexError {
    #[error("failed to open lock file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Capability trait over system-wide mutual exclusion keyed by a
/// [`MutexName`] (spec.md §4.3).
#[async_trait]
pub trait PathMutexHost: Clone + Send + Sync + 'static {
    /// Attempt to acquire the lock for `name`. Idempotent: calling `lock`
    /// again while already held returns `true` without re-acquiring
    /// (spec.md §8: "Lock then Lock yields HasLock").
    async fn lock(&self, name: &MutexName) -> Result<bool, PathMutexError>;

    /// Non-destructive check of whether `lock` would currently succeed.
    async fn can_lock(&self, name: &MutexName) -> Result<bool, PathMutexError>;

    /// Whether this instance currently holds the lock for `name`.
    async fn has_lock(&self, name: &MutexName) -> bool;
}

/// Production `PathMutexHost`, backed by `fs2::FileExt::try_lock_exclusive`
/// over files under `lock_dir`.
#[derive(Clone)]
pub struct Fs2PathMutexHost {
    lock_dir: PathBuf,
    held: std::sync::Arc<parking_lot::Mutex<std::collections::HashMap<String, File>>>,
}

impl Fs2PathMutexHost {
    pub fn new(lock_dir: impl Into<PathBuf>) -> Self {
        Self {
            lock_dir: lock_dir.into(),
            held: Default::default(),
        }
    }

    fn lock_path(&self, name: &MutexName) -> PathBuf {
        let file_name = name.as_str().replace(['\\', '/'], "_");
        self.lock_dir.join(format!("{file_name}.lock"))
    }

    fn open(path: &Path) -> Result<File, PathMutexError> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .map_err(|source| PathMutexError::Open {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[async_trait]
impl PathMutexHost for Fs2PathMutexHost {
    async fn lock(&self, name: &MutexName) -> Result<bool, PathMutexError> {
        if self.has_lock(name).await {
            return Ok(true);
        }

        let path = self.lock_path(name);
        let file = Self::open(&path)?;
        let acquired = file.try_lock_exclusive().is_ok();
        if acquired {
            self.held.lock().insert(name.as_str().to_string(), file);
        }
        Ok(acquired)
    }

    async fn can_lock(&self, name: &MutexName) -> Result<bool, PathMutexError> {
        if self.has_lock(name).await {
            return Ok(true);
        }

        let path = self.lock_path(name);
        let file = Self::open(&path)?;
        let can = file.try_lock_exclusive().is_ok();
        if can {
            FileExt::unlock(&file).ok();
        }
        Ok(can)
    }

    async fn has_lock(&self, name: &MutexName) -> bool {
        self.held.lock().contains_key(name.as_str())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePathMutexHost;

#[cfg(test)]
#[path = "path_mutex_tests.rs"]
mod tests;
