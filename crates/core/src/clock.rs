// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling.
//!
//! The supervisor and scanner state machines only ever ask "how long until
//! this timer fires" and "what time is it now" — both go through this trait
//! so cooldowns, finish-timeouts, and rescan intervals can be driven
//! deterministically in tests instead of waiting on a real clock.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of time, abstracted so tests can control it.
pub trait Clock: Clone + Send + Sync {
    /// A monotonic instant, used for cooldown/timeout arithmetic.
    fn now(&self) -> Instant;

    /// Wall-clock milliseconds since the Unix epoch, used for the
    /// `time`/`last` fields persisted in the state file.
    fn epoch_ms(&self) -> u64;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// Fake clock for testing with controllable, explicitly-advanced time.
#[cfg(any(test, feature = "test-support"))]
#[derive(Clone)]
pub struct FakeClock {
    current: std::sync::Arc<std::sync::Mutex<Instant>>,
    epoch_ms: std::sync::Arc<std::sync::atomic::AtomicU64>,
}

#[cfg(any(test, feature = "test-support"))]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            current: std::sync::Arc::new(std::sync::Mutex::new(Instant::now())),
            epoch_ms: std::sync::Arc::new(std::sync::atomic::AtomicU64::new(1_000_000)),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut guard) = self.current.lock() {
            *guard += duration;
        }
        self.epoch_ms
            .fetch_add(duration.as_millis() as u64, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current
            .lock()
            .map(|g| *g)
            .unwrap_or_else(|_| Instant::now())
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_ms.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
