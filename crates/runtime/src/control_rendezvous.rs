// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control Rendezvous (spec.md §4.9), grounded on
//! `examples/original_source/lib/winss/control.hpp`/`control.cpp`'s
//! `Control`/`ControlItem`/`OutboundControlItem`/`InboundControlItem` quartet.
//!
//! `winss-platform`'s pipe traits are named from the supervisor's point of
//! view (an `OutboundPipeClient` reads the supervisor's *outbound* event
//! stream; an `InboundPipeClient` writes to the supervisor's *inbound*
//! command pipe) which is the mirror image of the original's client-centric
//! `OutboundControlItem`/`InboundControlItem` names. To avoid reusing either
//! convention's now-ambiguous "in/out" vocabulary, the two concrete item
//! types here are named for what they do:
//! [`CommandSendItem`] (the original's `OutboundControlItem`) writes a
//! one-shot command sequence over an [`winss_platform::InboundPipeClient`];
//! [`NotificationWaitItem`] (the original's `InboundControlItem`) waits on a
//! [`crate::wait_listener::WaitCondition`] over an
//! [`winss_platform::OutboundPipeClient`]'s event stream.
//!
//! [`ControlRendezvous`] itself is the original's `Control`: items register,
//! signal `ready` once connected, and only once every item is ready does the
//! rendezvous call `start` on all of them together, so no item can race
//! ahead of a peer that hasn't connected yet.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use winss_platform::{InboundPipeClient, OutboundPipeClient, PipeEvent};

use crate::multiplexer::Multiplexer;
use crate::wait_listener::{WaitCondition, WaitSnapshot};

/// spec.md §4.9: exit code used when the rendezvous times out before every
/// item is ready.
pub const DEFAULT_TIMEOUT_EXIT_CODE: i32 = 1;
/// The original's `OutboundControlItem::kNoSendExitCode`: a command item
/// disconnected without ever completing its write.
pub const NO_SEND_EXIT_CODE: i32 = 111;

const TIMEOUT_GROUP: &str = "control";

/// One participant in a control rendezvous. `init`/`start` take `self: Rc<Self>`
/// so an item can hand a clone of itself to a background task (e.g. to pump
/// an event stream) without the rendezvous needing to know about it.
#[async_trait(?Send)]
pub trait ControlItem {
    fn name(&self) -> &str;

    /// Called once, for every registered item, before the rendezvous starts
    /// waiting for readiness. Typically connects the item's pipe client.
    async fn init(self: Rc<Self>);

    /// Called once every registered item has signalled ready.
    async fn start(self: Rc<Self>);

    /// Whether this item has finished its work.
    fn completed(&self) -> bool;

    /// Called for every still-registered item once the rendezvous's
    /// multiplexer starts stopping, so a still-running background task
    /// (e.g. a notification pump) can unblock rather than keep the
    /// multiplexer's loop alive forever (spec.md §4.1 `stop()`: "stop
    /// callbacks are responsible for draining the entries they own").
    /// Default no-op: fits one-shot items whose `init`/`start` are already
    /// bounded and never outlive a single `.await`.
    fn cancel(&self) {}
}

struct Shared {
    mux: Multiplexer,
    items: RefCell<HashMap<String, Rc<dyn ControlItem>>>,
    ready: RefCell<HashSet<String>>,
    started: Cell<bool>,
    finish_all: bool,
}

/// Orchestrates a set of [`ControlItem`]s over a shared [`Multiplexer`]
/// (spec.md §4.9). Cheaply `Clone` (an `Rc` handle).
pub struct ControlRendezvous {
    shared: Rc<Shared>,
}

impl Clone for ControlRendezvous {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl ControlRendezvous {
    pub fn new(mux: Multiplexer, finish_all: bool) -> Self {
        let rendezvous = Self {
            shared: Rc::new(Shared {
                mux: mux.clone(),
                items: RefCell::new(HashMap::new()),
                ready: RefCell::new(HashSet::new()),
                started: Cell::new(false),
                finish_all,
            }),
        };
        let cancel_all = rendezvous.clone();
        mux.add_stop(move |_mux| {
            let items: Vec<Rc<dyn ControlItem>> = cancel_all.shared.items.borrow().values().cloned().collect();
            for item in items {
                item.cancel();
            }
        });
        rendezvous
    }

    /// Like [`Self::new`], but stops the multiplexer with `timeout_exit_code`
    /// if `timeout` elapses before every item is ready, mirroring the
    /// original `Control` constructor's `AddInitCallback`/`AddStopCallback`
    /// pair exactly (arm on init, cancel on stop).
    pub fn with_timeout(mux: Multiplexer, finish_all: bool, timeout: Duration, timeout_exit_code: i32) -> Self {
        let rendezvous = Self::new(mux.clone(), finish_all);
        mux.add_init(move |m| {
            let m = m.clone();
            m.add_timeout(timeout, TIMEOUT_GROUP, move |m| {
                tracing::debug!("control rendezvous timed out");
                m.stop(timeout_exit_code);
            });
        });
        mux.add_stop(move |m| {
            m.remove_timeout(TIMEOUT_GROUP);
        });
        rendezvous
    }

    /// Registers `item` and arranges for its `init` to run when the
    /// multiplexer starts.
    pub fn add(&self, item: Rc<dyn ControlItem>) {
        let name = item.name().to_string();
        self.shared.items.borrow_mut().insert(name, Rc::clone(&item));
        self.shared.mux.add_init(move |mux| {
            mux.spawn_background(async move {
                item.init().await;
            });
        });
    }

    /// Gives an item access to the same background-tracking the rendezvous
    /// uses internally, so its own long-running work (e.g. a notification
    /// pump) also keeps the multiplexer's loop alive.
    pub fn spawn_background(&self, fut: impl std::future::Future<Output = ()> + 'static) {
        self.shared.mux.spawn_background(fut);
    }

    /// Marks `name` ready. Once every registered item is ready, every item's
    /// `start` runs (spec.md §4.9 `Control::Ready`).
    pub fn ready(&self, name: &str) {
        if self.shared.started.get() {
            return;
        }
        if !self.shared.items.borrow().contains_key(name) {
            return;
        }
        self.shared.ready.borrow_mut().insert(name.to_string());

        let all_ready = {
            let items = self.shared.items.borrow();
            let ready = self.shared.ready.borrow();
            items.len() == ready.len()
        };
        if !all_ready {
            return;
        }
        self.shared.started.set(true);
        let items: Vec<Rc<dyn ControlItem>> = self.shared.items.borrow().values().cloned().collect();
        for item in items {
            self.shared.mux.spawn_background(async move {
                item.start().await;
            });
        }
    }

    /// Removes `name`. Stops the multiplexer if that empties the item set,
    /// or if `finish_all` is false (spec.md §4.9 `Control::Remove`).
    pub fn remove(&self, name: &str) {
        let removed = self.shared.items.borrow_mut().remove(name).is_some();
        if !removed {
            return;
        }
        let empty = self.shared.items.borrow().is_empty();
        if empty || !self.shared.finish_all {
            self.shared.mux.stop(0);
        }
    }

    pub fn is_started(&self) -> bool {
        self.shared.started.get()
    }

    /// Runs the multiplexer to completion, returning its exit code. A
    /// rendezvous with no items is a no-op that exits `0` (spec.md §4.9
    /// `Control::Start`).
    pub async fn start(&self) -> i32 {
        if self.shared.items.borrow().is_empty() {
            return 0;
        }
        self.shared.mux.start().await.unwrap_or(0)
    }
}

/// Sends a one-shot command sequence over an inbound (command) pipe client,
/// then signals completion (the original's `OutboundControlItem`).
pub struct CommandSendItem<C: InboundPipeClient> {
    name: String,
    mux: Multiplexer,
    rendezvous: ControlRendezvous,
    client: Rc<C>,
    commands: Vec<u8>,
    written: Cell<bool>,
}

impl<C: InboundPipeClient> CommandSendItem<C> {
    pub fn new(mux: Multiplexer, rendezvous: ControlRendezvous, client: Rc<C>, commands: Vec<u8>, name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: format!("out_{}", name.into()),
            mux,
            rendezvous,
            client,
            commands,
            written: Cell::new(false),
        })
    }
}

#[async_trait(?Send)]
impl<C: InboundPipeClient> ControlItem for CommandSendItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(self: Rc<Self>) {
        match self.client.connect().await {
            Ok(()) => self.rendezvous.ready(&self.name),
            Err(err) => {
                tracing::warn!(name = %self.name, %err, "command item failed to connect");
                self.mux.stop(NO_SEND_EXIT_CODE);
                self.rendezvous.remove(&self.name);
            }
        }
    }

    async fn start(self: Rc<Self>) {
        if self.commands.is_empty() {
            return;
        }
        match self.client.send(&self.commands).await {
            Ok(()) => {
                self.written.set(true);
                self.rendezvous.remove(&self.name);
            }
            Err(err) => {
                tracing::warn!(name = %self.name, %err, "command item failed to send");
                self.mux.stop(NO_SEND_EXIT_CODE);
                self.rendezvous.remove(&self.name);
            }
        }
    }

    fn completed(&self) -> bool {
        self.written.get()
    }
}

/// Waits on a [`WaitCondition`] over an outbound (event) pipe client's
/// stream until satisfied (the original's `InboundControlItem`).
pub struct NotificationWaitItem<C: OutboundPipeClient> {
    name: String,
    rendezvous: ControlRendezvous,
    client: Rc<C>,
    condition: WaitCondition,
    snapshot: Box<dyn Fn() -> WaitSnapshot>,
    complete: Cell<bool>,
    cancel_signal: Rc<Notify>,
}

impl<C: OutboundPipeClient> NotificationWaitItem<C> {
    pub fn new(
        rendezvous: ControlRendezvous,
        client: Rc<C>,
        condition: WaitCondition,
        snapshot: impl Fn() -> WaitSnapshot + 'static,
        name: impl Into<String>,
    ) -> Rc<Self> {
        Rc::new(Self {
            name: format!("in_{}", name.into()),
            rendezvous,
            client,
            condition,
            snapshot: Box::new(snapshot),
            complete: Cell::new(false),
            cancel_signal: Rc::new(Notify::new()),
        })
    }

    /// Runs until the condition is satisfied, the client disconnects, or
    /// `start` decides the wait was already satisfied and cancels it. Must
    /// actually return in every case (not merely flag `complete` and keep
    /// looping) since this future is tracked by
    /// [`Multiplexer::spawn_background`] — an immortal pump would keep the
    /// rendezvous's multiplexer loop alive forever.
    async fn pump(self: Rc<Self>) {
        loop {
            tokio::select! {
                event = self.client.next_event() => {
                    match event {
                        Some(PipeEvent::Received(_, bytes)) => {
                            if !self.condition.handle_received(&bytes) {
                                self.complete.set(true);
                                self.rendezvous.remove(&self.name);
                                return;
                            }
                        }
                        Some(PipeEvent::Disconnected(_)) => {
                            self.rendezvous.remove(&self.name);
                            return;
                        }
                        Some(PipeEvent::Connected(_) | PipeEvent::WriteComplete(_)) => {}
                        None => return,
                    }
                }
                _ = self.cancel_signal.notified() => return,
            }
        }
    }
}

#[async_trait(?Send)]
impl<C: OutboundPipeClient> ControlItem for NotificationWaitItem<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(self: Rc<Self>) {
        if self.client.connect().await.is_ok() {
            self.rendezvous.ready(&self.name);
            let me = Rc::clone(&self);
            self.rendezvous.spawn_background(async move { me.pump().await });
        } else {
            tracing::warn!(name = %self.name, "wait item failed to connect");
            self.rendezvous.remove(&self.name);
        }
    }

    async fn start(self: Rc<Self>) {
        if !self.condition.must_wait((self.snapshot)()) {
            self.complete.set(true);
            self.cancel_signal.notify_one();
            self.rendezvous.remove(&self.name);
        }
    }

    fn completed(&self) -> bool {
        self.complete.get()
    }

    fn cancel(&self) {
        self.cancel_signal.notify_one();
    }
}

#[cfg(test)]
#[path = "control_rendezvous_tests.rs"]
mod tests;
