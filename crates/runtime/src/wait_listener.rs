// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! State-aware wait listener (spec.md §4.10), grounded on
//! `examples/original_source/lib/winss/control.hpp`'s
//! `InboundControlItemListener` (`IsEnabled`/`CanStart`/`HandleReceived`).
//!
//! The race this exists to close: a client that wants to wait for, say, "up"
//! must not miss a `Run` notification emitted between checking the state
//! file and subscribing to the event stream. The fix, carried over verbatim
//! from the original, is ordering: connect to the supervisor's event pipe
//! first (so every notification from that point on is queued for us), *then*
//! read a snapshot of current state to decide whether the wait is already
//! satisfied. [`WaitCondition::must_wait`] is that second check;
//! [`WaitCondition::handle_received`] is the per-notification filter applied
//! afterward. Both are pure and synchronous — wiring them to an actual pipe
//! client is `winss-runtime`'s control rendezvous / `winss-cli`'s job.

use std::cell::Cell;

use winss_core::Notification;
use winss_wire::decode_notification;

/// Which condition an `svwait`-style client is waiting for (spec.md §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitAction {
    /// Wait for the service to be up and running.
    WaitUp,
    /// Wait for the service to be down.
    WaitDown,
    /// Wait for the current run/finish cycle to complete.
    WaitFinished,
    /// Wait for a down-then-up cycle (a restart), not just the first up.
    WaitRestart,
    /// Don't wait at all; never subscribes to notifications.
    NoWait,
}

/// The state a wait condition needs in order to decide, without reading any
/// notification, whether it is already satisfied.
#[derive(Debug, Clone, Copy)]
pub struct WaitSnapshot {
    pub is_up: bool,
}

/// One client's wait condition. Created once per `svwait` invocation (or
/// per listener the supervisor controller registers on its behalf).
pub struct WaitCondition {
    action: WaitAction,
    seen_down: Cell<bool>,
}

impl WaitCondition {
    pub fn new(action: WaitAction) -> Self {
        Self {
            action,
            seen_down: Cell::new(false),
        }
    }

    pub fn action(&self) -> WaitAction {
        self.action
    }

    /// spec.md §4.10 `IsEnabled`: whether this condition should ever
    /// register with the control rendezvous at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self.action, WaitAction::NoWait)
    }

    /// Whether, given a snapshot taken right after connecting (before any
    /// notification has been processed), this condition must actually wait
    /// for further notifications — `false` means it is already satisfied
    /// and the caller should finish immediately (spec.md §4.10 `CanStart`,
    /// inverted here for a less surprising name).
    pub fn must_wait(&self, snapshot: WaitSnapshot) -> bool {
        match self.action {
            WaitAction::WaitUp => !snapshot.is_up,
            WaitAction::WaitDown => snapshot.is_up,
            WaitAction::WaitFinished | WaitAction::WaitRestart => true,
            WaitAction::NoWait => false,
        }
    }

    /// spec.md §4.10 `HandleReceived`: processes every notification byte in
    /// `message` in order. Returns `true` if the caller should keep waiting,
    /// `false` once the condition is satisfied. Bytes that don't decode to a
    /// known notification are ignored rather than ending the wait.
    pub fn handle_received(&self, message: &[u8]) -> bool {
        for &byte in message {
            let Ok(notification) = decode_notification(byte) else {
                continue;
            };
            if !self.observe(notification) {
                return false;
            }
        }
        true
    }

    /// Returns `false` once `notification` satisfies the condition.
    fn observe(&self, notification: Notification) -> bool {
        match self.action {
            WaitAction::WaitUp => !matches!(notification, Notification::Run),
            WaitAction::WaitDown => !matches!(notification, Notification::End | Notification::Exit),
            WaitAction::WaitFinished => !matches!(notification, Notification::Finished),
            WaitAction::WaitRestart => {
                if matches!(notification, Notification::End) {
                    self.seen_down.set(true);
                }
                !(matches!(notification, Notification::Run) && self.seen_down.get())
            }
            WaitAction::NoWait => true,
        }
    }
}

#[cfg(test)]
#[path = "wait_listener_tests.rs"]
mod tests;
