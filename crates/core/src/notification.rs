// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor -> client event notifications (spec.md §3, §6.3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single supervisor event, emitted on the outbound event pipe as one
/// byte (encoding lives in `winss-wire`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Notification {
    /// Supervisor has finished initializing and is about to run its first
    /// step loop.
    Start,
    /// The `run` script was just spawned.
    Run,
    /// The `run` script (or the child standing in for it) just exited.
    End,
    /// Reserved on the wire; no code path in this implementation emits it
    /// (spec.md §9, open question 2). The decoder still accepts it.
    Broken,
    /// The finish cycle (if any) has completed and the supervisor is about
    /// to decide whether to restart.
    Finished,
    /// The supervisor is shutting down for good.
    Exit,
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Notification::Start => "start",
            Notification::Run => "run",
            Notification::End => "end",
            Notification::Broken => "broken",
            Notification::Finished => "finished",
            Notification::Exit => "exit",
        };
        write!(f, "{s}")
    }
}
