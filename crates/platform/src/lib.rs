// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! winss-platform: narrow capability traits over the OS primitives the
//! original `WindowsInterface`/`FilesystemInterface` abstraction layer
//! wrapped (spec.md §6, design notes §9) — process lifecycle, named-pipe
//! transport, path mutex, filesystem, and digest — each with a production
//! implementation and, behind `test-support`, a deterministic fake.
//!
//! Each capability is one trait, `Clone + Send + Sync + 'static`, paired
//! with a `*Error` enum, and injected into constructors rather than reached
//! through a singleton.

pub mod digest;
pub mod fs;
pub mod path_mutex;
pub mod pipe;
pub mod process;
#[cfg(unix)]
pub mod socket_path;

pub use digest::{Digest, Sha256Digest};
pub use fs::{FsError, FsHost, TokioFsHost};
pub use path_mutex::{Fs2PathMutexHost, PathMutexError, PathMutexHost};
pub use pipe::{
    ClientId, InboundPipeClient, InboundPipeServer, OutboundPipeClient, OutboundPipeServer,
    PipeError, PipeEvent,
};
pub use process::{ProcessError, ProcessHandle, ProcessHost, ProcessParams, Stdio};
#[cfg(unix)]
pub use socket_path::{control_socket_path, event_socket_path, scan_control_socket_path};

pub use winss_core::{Clock, SystemClock};

#[cfg(any(test, feature = "test-support"))]
pub use fs::FakeFsHost;
#[cfg(any(test, feature = "test-support"))]
pub use path_mutex::FakePathMutexHost;
#[cfg(any(test, feature = "test-support"))]
pub use pipe::{FakeInboundPipeClient, FakeInboundPipeServer, FakeOutboundPipeClient, FakeOutboundPipeServer};
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessHost;
