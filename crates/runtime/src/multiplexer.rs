// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-threaded cooperative scheduler over waitable handles and timeouts
//! (spec.md §4.1).
//!
//! Per design notes §9 and [`crate`]'s EXPANSION 4.1a, this keeps the
//! source's explicit-callback model verbatim instead of a task-per-component
//! executor: every component registers a plain closure, and the scheduler
//! alone decides when to run it. The native waitable `HANDLE` becomes a
//! [`WaitHandle`] backed by a `tokio::sync::Notify`; the scheduler drives
//! everything from one `tokio::select!` inside a `LocalSet` so the whole
//! thing runs on a single OS thread, matching §5's "strictly
//! single-threaded" requirement while still letting pipe/process I/O be
//! real `tokio` futures underneath.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::Notify;

/// Identifies a registered triggered callback, the portable stand-in for a
/// native waitable `HANDLE` (spec.md §9 design notes, GLOSSARY "Wait
/// handle").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WaitHandle(u64);

pub type Callback = Box<dyn FnOnce(&Multiplexer)>;
pub type TriggeredCallback = Box<dyn FnOnce(&Multiplexer, WaitHandle)>;
pub type TimeoutCallback = Box<dyn FnOnce(&Multiplexer)>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MultiplexerError {
    #[error("multiplexer already started or stopping")]
    Illegal,
}

struct TriggeredEntry {
    notify: Rc<Notify>,
    callback: TriggeredCallback,
}

struct TimeoutEntry {
    group: &'static str,
    deadline: Instant,
    callback: TimeoutCallback,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
enum Phase {
    NotStarted,
    Running,
    Stopping,
    Stopped,
}

struct Inner {
    init: Vec<Callback>,
    stop: Vec<Callback>,
    triggered: BTreeMap<u64, TriggeredEntry>,
    timeouts: Vec<TimeoutEntry>,
    next_handle: u64,
    phase: Phase,
    stop_code: Option<i32>,
}

/// The wait multiplexer. Cheaply `Clone` (an `Rc` handle) so callbacks can
/// hold their own reference and re-register themselves.
#[derive(Clone)]
pub struct Multiplexer {
    inner: Rc<RefCell<Inner>>,
}

impl Default for Multiplexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Multiplexer {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                init: Vec::new(),
                stop: Vec::new(),
                triggered: BTreeMap::new(),
                timeouts: Vec::new(),
                next_handle: 0,
                phase: Phase::NotStarted,
                stop_code: None,
            })),
        }
    }

    pub fn add_init(&self, f: impl FnOnce(&Multiplexer) + 'static) {
        self.inner.borrow_mut().init.push(Box::new(f));
    }

    pub fn add_stop(&self, f: impl FnOnce(&Multiplexer) + 'static) {
        self.inner.borrow_mut().stop.push(Box::new(f));
    }

    /// Registers `f` to fire once the next time `notify` is notified.
    pub fn add_triggered(
        &self,
        notify: Rc<Notify>,
        f: impl FnOnce(&Multiplexer, WaitHandle) + 'static,
    ) -> WaitHandle {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_handle;
        inner.next_handle += 1;
        inner.triggered.insert(
            id,
            TriggeredEntry {
                notify,
                callback: Box::new(f),
            },
        );
        WaitHandle(id)
    }

    /// Removes a still-pending triggered callback. Returns `true` if it was
    /// present.
    pub fn remove_triggered(&self, handle: WaitHandle) -> bool {
        self.inner.borrow_mut().triggered.remove(&handle.0).is_some()
    }

    /// Arms a one-shot timer tagged `group`, firing `f` after `delay`.
    pub fn add_timeout(
        &self,
        delay: Duration,
        group: &'static str,
        f: impl FnOnce(&Multiplexer) + 'static,
    ) {
        let deadline = Instant::now() + delay;
        let mut inner = self.inner.borrow_mut();
        inner.timeouts.push(TimeoutEntry {
            group,
            deadline,
            callback: Box::new(f),
        });
        inner.timeouts.sort_by_key(|t| t.deadline);
    }

    /// Cancels every pending timeout tagged `group`. Returns `true` if any
    /// were removed.
    pub fn remove_timeout(&self, group: &'static str) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.timeouts.len();
        inner.timeouts.retain(|t| t.group != group);
        inner.timeouts.len() != before
    }

    /// Convenience: stop the multiplexer with `code` the next time `notify`
    /// fires (spec.md §4.1 `add_close_event`).
    pub fn add_close_event(&self, notify: Rc<Notify>, code: i32) -> WaitHandle {
        self.add_triggered(notify, move |mux, _handle| mux.stop(code))
    }

    /// Spawns `fut` on the local task set and registers a triggered entry
    /// that keeps `start()`'s loop from exiting until `fut` completes, even
    /// though `fut` itself never touches the triggered/timeout lists
    /// directly. Needed anywhere work is handed to `tokio::task::spawn_local`
    /// instead of a native waitable handle (a poll loop over a capability
    /// trait, a one-shot pipe client's connect/send) — without this, the
    /// loop can see no triggered entries and no pending timeout and return
    /// before that work ever gets a chance to run.
    pub fn spawn_background(&self, fut: impl std::future::Future<Output = ()> + 'static) {
        let notify = Rc::new(Notify::new());
        self.add_triggered(Rc::clone(&notify), |_mux, _handle| {});
        tokio::task::spawn_local(async move {
            fut.await;
            notify.notify_one();
        });
    }

    /// Idempotent; the first call's code wins. Marks the multiplexer
    /// stopping and runs every registered stop callback in order. Stop
    /// callbacks are responsible for draining the triggered entries they
    /// own (spec.md §4.1 Cancellation).
    pub fn stop(&self, code: i32) {
        let stop_callbacks = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase == Phase::Stopping || inner.phase == Phase::Stopped {
                return;
            }
            inner.phase = Phase::Stopping;
            inner.stop_code.get_or_insert(code);
            std::mem::take(&mut inner.stop)
        };
        for cb in stop_callbacks {
            cb(self);
        }
    }

    pub fn is_stopping(&self) -> bool {
        matches!(
            self.inner.borrow().phase,
            Phase::Stopping | Phase::Stopped
        )
    }

    /// Runs init callbacks, then loops dispatching exactly one fired
    /// triggered callback or the earliest expired timeout per tick until
    /// neither any triggered entry nor any timeout remains, per spec.md
    /// §4.1 `start()`.
    pub async fn start(&self) -> Result<i32, MultiplexerError> {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.phase != Phase::NotStarted {
                return Err(MultiplexerError::Illegal);
            }
            inner.phase = Phase::Running;
        }

        let inits = std::mem::take(&mut self.inner.borrow_mut().init);
        for cb in inits {
            cb(self);
        }

        loop {
            let deadline = self.inner.borrow().timeouts.first().map(|t| t.deadline);
            let entries: Vec<(u64, Rc<Notify>)> = self
                .inner
                .borrow()
                .triggered
                .iter()
                .map(|(id, e)| (*id, e.notify.clone()))
                .collect();

            if entries.is_empty() && deadline.is_none() {
                break;
            }

            let mut waits = FuturesUnordered::new();
            for (id, notify) in entries {
                waits.push(async move {
                    notify.notified().await;
                    id
                });
            }

            let fired = match (waits.is_empty(), deadline) {
                (false, Some(at)) => {
                    tokio::select! {
                        biased;
                        Some(id) = waits.next() => Fired::Triggered(id),
                        _ = tokio::time::sleep_until(at.into()) => Fired::Timeout,
                    }
                }
                (false, None) => match waits.next().await {
                    Some(id) => Fired::Triggered(id),
                    None => break,
                },
                (true, Some(at)) => {
                    tokio::time::sleep_until(at.into()).await;
                    Fired::Timeout
                }
                (true, None) => break,
            };

            match fired {
                Fired::Triggered(id) => {
                    let entry = self.inner.borrow_mut().triggered.remove(&id);
                    if let Some(entry) = entry {
                        (entry.callback)(self, WaitHandle(id));
                    }
                }
                Fired::Timeout => {
                    let due = {
                        let mut inner = self.inner.borrow_mut();
                        if inner.timeouts.is_empty() {
                            None
                        } else {
                            Some(inner.timeouts.remove(0))
                        }
                    };
                    if let Some(entry) = due {
                        (entry.callback)(self);
                    }
                }
            }
        }

        let mut inner = self.inner.borrow_mut();
        inner.phase = Phase::Stopped;
        Ok(inner.stop_code.unwrap_or(0))
    }
}

enum Fired {
    Triggered(u64),
    Timeout,
}

#[cfg(test)]
#[path = "multiplexer_tests.rs"]
mod tests;
