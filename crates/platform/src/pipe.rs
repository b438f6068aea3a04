// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named bidirectional byte pipe transport (spec.md §4.2), in its four
//! roles: a supervisor's outbound server (events out) and inbound server
//! (commands in), and a client's matching outbound client (read events) and
//! inbound client (send commands).
//!
//! The original drives each instance through an explicit
//! `Uncreated -> Listening/Connecting -> Connected -> Closing -> Closed`
//! state machine over Win32 overlapped I/O, reporting `{Continue, Skip,
//! Remove}` per completed operation. This crate's production
//! implementation gets the same externally-visible behavior — handshake
//! byte, per-client send queue, zero-byte reads used only to detect
//! disconnect, Disconnected firing at most once — from `tokio::select!`
//! driving one task per client rather than hand-rolled overlapped result
//! codes; `winss-runtime`'s Wait Multiplexer consumes [`PipeEvent`]s the
//! same way it would consume any other callback trigger. Transport is
//! Windows named pipes under `cfg(windows)`, Unix domain sockets (the
//! nearest portable bidirectional-byte-pipe primitive) under `cfg(unix)`.

use async_trait::async_trait;
use thiserror::Error;

#[cfg(windows)]
mod windows_impl;
#[cfg(unix)]
mod unix_impl;

#[cfg(windows)]
pub use windows_impl::{
    WindowsInboundPipeClient, WindowsInboundPipeServer, WindowsOutboundPipeClient,
    WindowsOutboundPipeServer,
};
#[cfg(unix)]
pub use unix_impl::{
    UnixInboundPipeClient, UnixInboundPipeServer, UnixOutboundPipeClient, UnixOutboundPipeServer,
};

/// Identifies one connected client of a server instance, stable for the
/// life of that connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(pub u64);

#[derive(Debug, Error)]
pub enum PipeError {
    #[error("pipe {0:?} not found or already closed")]
    NotConnected(ClientId),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Events a server-role pipe instance reports. Outbound servers never
/// produce `Received`; inbound servers never produce `WriteComplete` — the
/// shared enum keeps the Wait Multiplexer's dispatch loop uniform across
/// both roles (spec.md §4.2's `ConnectionListener`/`SendListener`/
/// `ReceiveListener` split collapses to one event type with listener-side
/// filtering).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeEvent {
    Connected(ClientId),
    /// Fires at most once per `Connected` (spec.md §8 invariant 5).
    Disconnected(ClientId),
    /// Inbound servers only: bytes received from a client, already past the
    /// handshake (the *inbound server* does not send a handshake; only
    /// outbound servers and inbound clients deal with it).
    Received(ClientId, Vec<u8>),
    /// Outbound servers only: the per-client send queue drained completely.
    WriteComplete(ClientId),
}

/// Supervisor-side: emits notification bytes to every connected client,
/// sending the handshake null byte immediately on connect.
#[async_trait]
pub trait OutboundPipeServer: Send + Sync + 'static {
    /// Append `data` to `client`'s send queue. Fails if the client is not
    /// connected (spec.md §4.2).
    async fn send(&self, client: ClientId, data: &[u8]) -> Result<(), PipeError>;

    /// Broadcast `data` to every currently connected client.
    async fn broadcast(&self, data: &[u8]);

    /// Block until the next connect/disconnect/write-complete event.
    /// Returns `None` once the server has been shut down.
    async fn next_event(&self) -> Option<PipeEvent>;
}

/// Supervisor-side: receives command bytes from every connected client.
#[async_trait]
pub trait InboundPipeServer: Send + Sync + 'static {
    async fn next_event(&self) -> Option<PipeEvent>;
}

/// Client-side reader of a supervisor's outbound (event) pipe. Strips the
/// handshake byte internally; only post-handshake payload bytes are ever
/// surfaced to callers via `next_event`.
#[async_trait]
pub trait OutboundPipeClient: Send + Sync + 'static {
    async fn connect(&self) -> Result<(), PipeError>;
    async fn next_event(&self) -> Option<PipeEvent>;
}

/// Client-side writer to a supervisor's inbound (control) pipe.
#[async_trait]
pub trait InboundPipeClient: Send + Sync + 'static {
    async fn connect(&self) -> Result<(), PipeError>;
    async fn send(&self, data: &[u8]) -> Result<(), PipeError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeInboundPipeClient, FakeInboundPipeServer, FakeOutboundPipeClient, FakeOutboundPipeServer};

#[cfg(test)]
#[path = "pipe_tests.rs"]
mod tests;
