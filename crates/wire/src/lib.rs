// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! winss-wire: the single-byte wire protocol carried on named-pipe
//! connections (spec.md §6.3), plus the handshake convention every
//! connection starts with.
//!
//! Pipes carry a raw byte stream; this crate only knows how to turn bytes
//! into [`Notification`]/[`SupervisorCommand`]/[`ScanCommand`] values and
//! back. Framing, reconnection, and the handshake byte's placement in the
//! stream are the named-pipe transport's job (`winss-platform`); this crate
//! exposes [`strip_handshake`] as a pure helper for that transport to call.

mod handshake;
mod wire_command;
mod wire_notification;

pub use handshake::{strip_handshake, HANDSHAKE_BYTE};
pub use wire_command::{decode_scan_command, decode_supervisor_command, encode_scan_command, encode_supervisor_command};
pub use wire_notification::{decode_notification, encode_notification};

use thiserror::Error;

/// A byte on the wire that does not correspond to any known vocabulary
/// entry for the channel it arrived on.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
#[error("unrecognized wire byte: {0:#04x}")]
pub struct UnknownByte(pub u8);
