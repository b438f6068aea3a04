// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory pipe fakes for `winss-runtime`/`winss-daemon` tests: two ends
//! of a channel pair wired together in test setup, standing in for an
//! actual named-pipe/socket connection.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ClientId, InboundPipeClient, InboundPipeServer, OutboundPipeClient, OutboundPipeServer, PipeError, PipeEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Fake outbound server: tests call `connect_client`/`disconnect_client` to
/// simulate lifecycle, and inspect `sent(client)` for what the code under
/// test queued.
#[derive(Clone)]
pub struct FakeOutboundPipeServer {
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    events_rx: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
    sent: Arc<Mutex<HashMap<u64, Vec<Vec<u8>>>>>,
    connected: Arc<Mutex<std::collections::HashSet<u64>>>,
    next_id: Arc<AtomicU64>,
}

impl Default for FakeOutboundPipeServer {
    fn default() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            events_tx,
            events_rx: Arc::new(Mutex::new(events_rx)),
            sent: Arc::default(),
            connected: Arc::default(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl FakeOutboundPipeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_client(&self) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.connected.lock().insert(id.0);
        let _ = self.events_tx.send(PipeEvent::Connected(id));
        id
    }

    pub fn disconnect_client(&self, client: ClientId) {
        self.connected.lock().remove(&client.0);
        let _ = self.events_tx.send(PipeEvent::Disconnected(client));
    }

    pub fn sent(&self, client: ClientId) -> Vec<Vec<u8>> {
        self.sent.lock().get(&client.0).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl OutboundPipeServer for FakeOutboundPipeServer {
    async fn send(&self, client: ClientId, data: &[u8]) -> Result<(), PipeError> {
        if !self.connected.lock().contains(&client.0) {
            return Err(PipeError::NotConnected(client));
        }
        self.sent.lock().entry(client.0).or_default().push(data.to_vec());
        let _ = self.events_tx.send(PipeEvent::WriteComplete(client));
        Ok(())
    }

    async fn broadcast(&self, data: &[u8]) {
        let ids: Vec<u64> = self.connected.lock().iter().copied().collect();
        for id in ids {
            let _ = self.send(ClientId(id), data).await;
        }
    }

    async fn next_event(&self) -> Option<PipeEvent> {
        self.events_rx.lock().recv().await
    }
}

/// Fake inbound server: tests call `deliver` to simulate a client sending
/// command bytes.
#[derive(Clone)]
pub struct FakeInboundPipeServer {
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    events_rx: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
}

impl Default for FakeInboundPipeServer {
    fn default() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            events_tx,
            events_rx: Arc::new(Mutex::new(events_rx)),
        }
    }
}

impl FakeInboundPipeServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_client(&self, client: ClientId) {
        let _ = self.events_tx.send(PipeEvent::Connected(client));
    }

    pub fn deliver(&self, client: ClientId, bytes: &[u8]) {
        let _ = self.events_tx.send(PipeEvent::Received(client, bytes.to_vec()));
    }
}

#[async_trait]
impl InboundPipeServer for FakeInboundPipeServer {
    async fn next_event(&self) -> Option<PipeEvent> {
        self.events_rx.lock().recv().await
    }
}

/// Fake outbound client: a test feeds it bytes via `push` to simulate the
/// supervisor emitting notifications.
#[derive(Clone)]
pub struct FakeOutboundPipeClient {
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    events_rx: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
    connected: Arc<std::sync::atomic::AtomicBool>,
}

impl Default for FakeOutboundPipeClient {
    fn default() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            events_tx,
            events_rx: Arc::new(Mutex::new(events_rx)),
            connected: Arc::default(),
        }
    }
}

impl FakeOutboundPipeClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the supervisor sending one notification byte.
    pub fn push(&self, byte: u8) {
        let _ = self.events_tx.send(PipeEvent::Received(ClientId(0), vec![byte]));
    }
}

#[async_trait]
impl OutboundPipeClient for FakeOutboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        self.connected.store(true, Ordering::SeqCst);
        let _ = self.events_tx.send(PipeEvent::Connected(ClientId(0)));
        Ok(())
    }

    async fn next_event(&self) -> Option<PipeEvent> {
        self.events_rx.lock().recv().await
    }
}

/// Fake inbound client: tests inspect `sent()` for command bytes the code
/// under test wrote.
#[derive(Clone, Default)]
pub struct FakeInboundPipeClient {
    sent: Arc<Mutex<Vec<u8>>>,
    connected: Arc<std::sync::atomic::AtomicBool>,
}

impl FakeInboundPipeClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<u8> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl InboundPipeClient for FakeInboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), PipeError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(PipeError::NotConnected(ClientId(0)));
        }
        self.sent.lock().extend_from_slice(data);
        Ok(())
    }
}
