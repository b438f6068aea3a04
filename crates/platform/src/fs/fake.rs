// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory `FsHost` for runtime/daemon tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{FsError, FsHost};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct FakeFsHost {
    files: Arc<Mutex<BTreeMap<PathBuf, Vec<u8>>>>,
}

impl FakeFsHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file as if it already existed on disk.
    pub fn seed(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.lock().insert(path.into(), contents.into());
    }

    pub fn written(&self, path: &Path) -> Option<Vec<u8>> {
        self.files.lock().get(path).cloned()
    }
}

#[async_trait]
impl FsHost for FakeFsHost {
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        Ok(path.to_path_buf())
    }

    async fn read_to_string(&self, path: &Path) -> Result<Option<String>, FsError> {
        Ok(self
            .files
            .lock()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned()))
    }

    /// True if `path` is a seeded file, or a directory prefix of one (the
    /// fake has no separate notion of directory entries, unlike
    /// `TokioFsHost`'s `metadata` check which is satisfied by either).
    async fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock();
        files.contains_key(path) || files.keys().any(|p| p.starts_with(path))
    }

    /// The fake has no separate notion of a directory entry (only seeded
    /// files); any path that `exists` is treated as a directory, which is
    /// enough for tests that seed a `log` file under a service directory
    /// to signal "this service has a log subdirectory".
    async fn is_dir(&self, path: &Path) -> bool {
        self.exists(path).await
    }

    async fn read_dir_names(&self, dir: &Path) -> Result<Vec<String>, FsError> {
        let files = self.files.lock();
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|p| p.strip_prefix(dir).ok())
            .filter_map(|rel| rel.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    async fn create_dir_all(&self, _dir: &Path) -> Result<(), FsError> {
        Ok(())
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), FsError> {
        self.files.lock().insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}
