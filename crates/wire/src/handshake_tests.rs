// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn strips_leading_null_and_returns_remainder() {
    let chunk = [0u8, b'u', b'd'];
    assert_eq!(strip_handshake(&chunk), Some(&[b'u', b'd'][..]));
}

#[test]
fn null_at_offset_k_delivers_only_bytes_after_it() {
    let chunk = [b'x', b'y', 0u8, b'u'];
    assert_eq!(strip_handshake(&chunk), Some(&[b'u'][..]));
}

#[test]
fn missing_null_is_treated_as_broken() {
    let chunk = [b'u', b'd', b'x'];
    assert_eq!(strip_handshake(&chunk), None);
}

#[test]
fn null_as_last_byte_yields_empty_remainder() {
    let chunk = [b'u', 0u8];
    assert_eq!(strip_handshake(&chunk), Some(&[][..]));
}

#[test]
fn empty_chunk_is_broken() {
    assert_eq!(strip_handshake(&[]), None);
}
