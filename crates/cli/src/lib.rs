// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! winss-cli: the four client binaries (`svc`, `svstat`, `svwait`,
//! `svscanctl`, spec.md §6.1), grounded on
//! `examples/original_source/bin/winss-svc.cpp`'s shape — connect a pair of
//! pipe clients through a [`winss_runtime::control_rendezvous::ControlRendezvous`],
//! run the rendezvous's multiplexer to completion, exit with its code.
//!
//! This crate owns the same thing `winss-daemon` owns for the server side:
//! which concrete pipe-client adapter to construct for the host platform.
//! [`client`] holds that wiring so all four binaries share it.

pub mod client;
