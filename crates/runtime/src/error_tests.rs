// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn missing_service_dir_is_fatal_boot() {
    let err = RuntimeError::MissingServiceDir {
        path: "/no/such/dir".into(),
    };
    assert_eq!(err.exit_code(), FATAL_BOOT);
}

#[test]
fn lock_conflict_exit_code() {
    let err = RuntimeError::LockConflict {
        path: "/svc".into(),
    };
    assert_eq!(err.exit_code(), LOCK_CONFLICT);
}
