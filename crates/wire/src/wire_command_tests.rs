// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const ALL_SUPERVISOR: [SupervisorCommand; 7] = [
    SupervisorCommand::Up,
    SupervisorCommand::Once,
    SupervisorCommand::OnceAtMost,
    SupervisorCommand::Down,
    SupervisorCommand::Kill,
    SupervisorCommand::Term,
    SupervisorCommand::Exit,
];

const ALL_SCAN: [ScanCommand; 4] = [
    ScanCommand::Alarm,
    ScanCommand::Abort,
    ScanCommand::Nuke,
    ScanCommand::Quit,
];

#[test]
fn every_supervisor_command_round_trips() {
    for command in ALL_SUPERVISOR {
        let byte = encode_supervisor_command(command);
        assert_eq!(decode_supervisor_command(byte), Ok(command));
    }
}

#[test]
fn every_scan_command_round_trips() {
    for command in ALL_SCAN {
        let byte = encode_scan_command(command);
        assert_eq!(decode_scan_command(byte), Ok(command));
    }
}

#[test]
fn canonical_supervisor_bytes_match_spec() {
    assert_eq!(encode_supervisor_command(SupervisorCommand::Up), b'u');
    assert_eq!(encode_supervisor_command(SupervisorCommand::Once), b'o');
    assert_eq!(encode_supervisor_command(SupervisorCommand::OnceAtMost), b'O');
    assert_eq!(encode_supervisor_command(SupervisorCommand::Down), b'd');
    assert_eq!(encode_supervisor_command(SupervisorCommand::Kill), b'k');
    assert_eq!(encode_supervisor_command(SupervisorCommand::Term), b't');
    assert_eq!(encode_supervisor_command(SupervisorCommand::Exit), b'x');
}

#[test]
fn canonical_scan_bytes_match_spec() {
    assert_eq!(encode_scan_command(ScanCommand::Alarm), b'a');
    assert_eq!(encode_scan_command(ScanCommand::Abort), b'b');
    assert_eq!(encode_scan_command(ScanCommand::Nuke), b'n');
    assert_eq!(encode_scan_command(ScanCommand::Quit), b'q');
}

#[test]
fn unknown_bytes_are_rejected_on_both_channels() {
    assert_eq!(decode_supervisor_command(b'!'), Err(UnknownByte(b'!')));
    assert_eq!(decode_scan_command(b'!'), Err(UnknownByte(b'!')));
}
