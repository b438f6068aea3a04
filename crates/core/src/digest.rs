// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressed digest used to derive pipe and mutex names from a
//! filesystem path (spec.md §3, PipeName / MutexName).

use sha2::{Digest as _, Sha256};

/// Hex-encoded SHA-256 digest of `input`, lowercase, matching the original
/// implementation's `SHA256::CalculateDigest`.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    format!("{:x}", digest)
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;
