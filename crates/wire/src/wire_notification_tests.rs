// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const ALL: [Notification; 6] = [
    Notification::Start,
    Notification::Run,
    Notification::End,
    Notification::Broken,
    Notification::Finished,
    Notification::Exit,
];

#[test]
fn every_notification_round_trips() {
    for notification in ALL {
        let byte = encode_notification(notification);
        assert_eq!(decode_notification(byte), Ok(notification));
    }
}

#[test]
fn canonical_bytes_match_spec() {
    assert_eq!(encode_notification(Notification::Start), b's');
    assert_eq!(encode_notification(Notification::Run), b'u');
    assert_eq!(encode_notification(Notification::End), b'd');
    assert_eq!(encode_notification(Notification::Broken), b'O');
    assert_eq!(encode_notification(Notification::Finished), b'D');
    assert_eq!(encode_notification(Notification::Exit), b'x');
}

#[test]
fn broken_is_decodable_though_unreachable_in_practice() {
    assert_eq!(decode_notification(b'O'), Ok(Notification::Broken));
}

#[test]
fn unknown_byte_is_rejected() {
    assert_eq!(decode_notification(b'?'), Err(UnknownByte(b'?')));
}
