// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client -> supervisor/scanner command vocabulary (spec.md §4.6 Commands,
//! §4.12 Scanner Controller, §6.3).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A command sent on a supervisor's inbound control pipe (spec.md §4.6,
/// §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SupervisorCommand {
    /// Run forever: clear the start-budget cap.
    Up,
    /// Run once if not already up; otherwise exhaust the budget.
    Once,
    /// Exhaust the start budget without affecting an in-flight run.
    OnceAtMost,
    /// Stop and stay stopped.
    Down,
    /// Forcibly terminate the run child.
    Kill,
    /// Send a console-break-equivalent to the run child.
    Term,
    /// Stop for good and let the supervisor's event loop exit.
    Exit,
}

impl fmt::Display for SupervisorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SupervisorCommand::Up => "up",
            SupervisorCommand::Once => "once",
            SupervisorCommand::OnceAtMost => "once-at-most",
            SupervisorCommand::Down => "down",
            SupervisorCommand::Kill => "kill",
            SupervisorCommand::Term => "term",
            SupervisorCommand::Exit => "exit",
        };
        write!(f, "{s}")
    }
}

/// A command sent on a scanner's inbound control pipe (spec.md §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanCommand {
    /// Re-run reconciliation immediately.
    Alarm,
    /// Quit without closing services.
    Abort,
    /// Drop services not flagged in the current cycle.
    Nuke,
    /// Quit, closing all services.
    Quit,
}

impl fmt::Display for ScanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScanCommand::Alarm => "alarm",
            ScanCommand::Abort => "abort",
            ScanCommand::Nuke => "nuke",
            ScanCommand::Quit => "quit",
        };
        write!(f, "{s}")
    }
}
