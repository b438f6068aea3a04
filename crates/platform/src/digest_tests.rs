// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn matches_core_digest() {
    let digest = Sha256Digest;
    assert_eq!(digest.hex("C:\\svc\\web"), winss_core::digest::sha256_hex("C:\\svc\\web"));
}

#[test]
fn is_deterministic() {
    let digest = Sha256Digest;
    assert_eq!(digest.hex("a"), digest.hex("a"));
}
