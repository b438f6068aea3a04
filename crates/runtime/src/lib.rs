// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! winss-runtime: the single-threaded event loop and state machines that
//! drive one supervisor or scanner process (spec.md §4.1, §4.4, §4.6, §4.8,
//! §4.9, §4.10, §4.11).
//!
//! Everything here is built to run inside one `tokio::task::LocalSet` on one
//! OS thread (spec.md §5 "strictly single-threaded"): state is `Rc`/`RefCell`
//! rather than `Arc`/`Mutex`, and the [`multiplexer::Multiplexer`] is the
//! only scheduler. `winss-daemon`'s binaries own constructing the
//! `LocalSet`/`current_thread` runtime and wiring the real
//! `winss-platform` adapters in; this crate only depends on the capability
//! traits, never a concrete adapter, so tests run the same state machines
//! against `winss_platform::Fake*` instead.

pub mod control_rendezvous;
pub mod env_compositor;
pub mod error;
pub mod multiplexer;
pub mod scanner;
pub mod state_file;
pub mod supervisor;
pub mod wait_listener;

pub use error::RuntimeError;
pub use multiplexer::Multiplexer;
pub use supervisor::Supervisor;
