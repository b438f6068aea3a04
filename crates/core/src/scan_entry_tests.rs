// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn fresh_entry_is_unflagged_and_logless() {
    let entry = ServiceDirectory::new("web", PathBuf::from("/svc/web"));
    assert!(!entry.flagged);
    assert!(!entry.has_log());
}

#[test]
fn with_log_path_sets_has_log() {
    let entry = ServiceDirectory::new("web", PathBuf::from("/svc/web"))
        .with_log_path(PathBuf::from("/svc/web/log"));
    assert!(entry.has_log());
    assert_eq!(entry.log_path.as_deref(), Some(std::path::Path::new("/svc/web/log")));
}

#[test]
fn archive_files_order_by_timestamp() {
    let mut files = vec![
        ArchiveFile { timestamp: 30, file: PathBuf::from("c") },
        ArchiveFile { timestamp: 10, file: PathBuf::from("a") },
        ArchiveFile { timestamp: 20, file: PathBuf::from("b") },
    ];
    files.sort();
    let timestamps: Vec<u64> = files.iter().map(|f| f.timestamp).collect();
    assert_eq!(timestamps, vec![10, 20, 30]);
}
