// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory/file I/O capability (spec.md §6: "directory and file I/O"),
//! including the atomic write used by the state file and by the scanner's
//! bookkeeping directory (spec.md §4.8, §4.11).
//!
//! The write-tmp-then-rename sequence mirrors the checkpoint-writer split
//! used elsewhere in this stack; `winss-runtime`'s state-file writer
//! composes the two into one call.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FsError {
    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn wrap(path: &Path, source: std::io::Error) -> FsError {
    FsError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Capability trait over filesystem operations the runtime needs: reading a
/// service's control files, listing a scan directory, and atomically
/// rewriting the state file.
#[async_trait]
pub trait FsHost: Clone + Send + Sync + 'static {
    /// Canonical form of `path`, the input to [`winss_core::PipeName`]/
    /// [`winss_core::MutexName`].
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError>;

    /// `Ok(Some(contents))` if `path` exists and is readable; `Ok(None)` if
    /// it does not exist. Any other I/O error is returned.
    async fn read_to_string(&self, path: &Path) -> Result<Option<String>, FsError>;

    async fn exists(&self, path: &Path) -> bool;

    /// Whether `path` exists and is a directory (the original's
    /// `FilesystemInterface::DirectoryExists`), used by the Scanner to
    /// filter `read_dir_names`' entries down to service directories and to
    /// detect a service's `log` subdirectory (spec.md §4.11).
    async fn is_dir(&self, path: &Path) -> bool;

    /// Immediate (non-recursive-into-subdirs) names of `dir`'s entries,
    /// in filesystem enumeration order (spec.md §3 ScanSet: "order is the
    /// filesystem enumeration order and is not otherwise significant").
    async fn read_dir_names(&self, dir: &Path) -> Result<Vec<String>, FsError>;

    async fn create_dir_all(&self, dir: &Path) -> Result<(), FsError>;

    /// Write `contents` to `path` atomically: write to a sibling temp file,
    /// then rename over `path`. A concurrent reader sees either the
    /// complete old file or the complete new one, never a torn write
    /// (spec.md §4.8).
    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), FsError>;
}

/// Production `FsHost`, backed by `tokio::fs`.
#[derive(Clone, Copy, Default)]
pub struct TokioFsHost;

#[async_trait]
impl FsHost for TokioFsHost {
    async fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| wrap(path, e))
    }

    async fn read_to_string(&self, path: &Path) -> Result<Option<String>, FsError> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(wrap(path, e)),
        }
    }

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }

    async fn is_dir(&self, path: &Path) -> bool {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }

    async fn read_dir_names(&self, dir: &Path) -> Result<Vec<String>, FsError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| wrap(dir, e))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| wrap(dir, e))? {
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn create_dir_all(&self, dir: &Path) -> Result<(), FsError> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| wrap(dir, e))
    }

    async fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), FsError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| wrap(parent, e))?;
        }
        let tmp_path = path.with_extension("tmp");
        tokio::fs::write(&tmp_path, contents)
            .await
            .map_err(|e| wrap(&tmp_path, e))?;
        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| wrap(path, e))
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeFsHost;

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
