// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client -> supervisor/scanner command byte encoding (spec.md §6.3).

use crate::UnknownByte;
use winss_core::{ScanCommand, SupervisorCommand};

pub fn encode_supervisor_command(command: SupervisorCommand) -> u8 {
    match command {
        SupervisorCommand::Up => b'u',
        SupervisorCommand::Once => b'o',
        SupervisorCommand::OnceAtMost => b'O',
        SupervisorCommand::Down => b'd',
        SupervisorCommand::Kill => b'k',
        SupervisorCommand::Term => b't',
        SupervisorCommand::Exit => b'x',
    }
}

/// Decode a supervisor command byte. Unknown bytes are the caller's job to
/// log and ignore (spec.md §4.7); this just reports which byte failed.
pub fn decode_supervisor_command(byte: u8) -> Result<SupervisorCommand, UnknownByte> {
    match byte {
        b'u' => Ok(SupervisorCommand::Up),
        b'o' => Ok(SupervisorCommand::Once),
        b'O' => Ok(SupervisorCommand::OnceAtMost),
        b'd' => Ok(SupervisorCommand::Down),
        b'k' => Ok(SupervisorCommand::Kill),
        b't' => Ok(SupervisorCommand::Term),
        b'x' => Ok(SupervisorCommand::Exit),
        other => Err(UnknownByte(other)),
    }
}

pub fn encode_scan_command(command: ScanCommand) -> u8 {
    match command {
        ScanCommand::Alarm => b'a',
        ScanCommand::Abort => b'b',
        ScanCommand::Nuke => b'n',
        ScanCommand::Quit => b'q',
    }
}

pub fn decode_scan_command(byte: u8) -> Result<ScanCommand, UnknownByte> {
    match byte {
        b'a' => Ok(ScanCommand::Alarm),
        b'b' => Ok(ScanCommand::Abort),
        b'n' => Ok(ScanCommand::Nuke),
        b'q' => Ok(ScanCommand::Quit),
        other => Err(UnknownByte(other)),
    }
}

#[cfg(test)]
#[path = "wire_command_tests.rs"]
mod tests;
