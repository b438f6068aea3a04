// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows named-pipe transport, backed by `tokio::net::windows::named_pipe`.
//! Structurally identical to the Unix domain socket stand-in
//! (`pipe::unix_impl`): one accept loop per server, one read task and one
//! write task per connected client instance, because `NamedPipeServer`
//! requires re-creating a fresh pipe instance per client just as the
//! original's overlapped-I/O server loop does (`CreateNamedPipe` again
//! after each client disconnects).

use super::{ClientId, InboundPipeServer, OutboundPipeServer, PipeError, PipeEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::windows::named_pipe::{ClientOptions, NamedPipeClient, NamedPipeServer, ServerOptions};
use tokio::sync::mpsc;
use winss_wire::HANDSHAKE_BYTE;

type Senders = Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<Vec<u8>>>>>;

async fn serve_one(
    mut pipe: NamedPipeServer,
    id: ClientId,
    senders: Senders,
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    send_handshake: bool,
) {
    if pipe.connect().await.is_err() {
        return;
    }
    if send_handshake && pipe.write_all(&[HANDSHAKE_BYTE]).await.is_err() {
        return;
    }

    let (mut read_half, mut write_half) = tokio::io::split(pipe);
    let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<Vec<u8>>();
    senders.lock().insert(id.0, queue_tx);
    let _ = events_tx.send(PipeEvent::Connected(id));

    let write_events = events_tx.clone();
    tokio::task::spawn_local(async move {
        while let Some(chunk) = queue_rx.recv().await {
            if write_half.write_all(&chunk).await.is_err() {
                break;
            }
            let _ = write_events.send(PipeEvent::WriteComplete(id));
        }
    });

    let mut buf = [0u8; 4096];
    loop {
        match read_half.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let _ = events_tx.send(PipeEvent::Received(id, buf[..n].to_vec()));
            }
        }
    }
    senders.lock().remove(&id.0);
    let _ = events_tx.send(PipeEvent::Disconnected(id));
}

fn spawn_accept_loop(
    pipe_name: String,
    senders: Senders,
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    send_handshake: bool,
) -> std::io::Result<()> {
    let next_id = Arc::new(AtomicU64::new(0));
    let server = ServerOptions::new().first_pipe_instance(true).create(&pipe_name)?;

    tokio::task::spawn_local(async move {
        let mut current = server;
        loop {
            let id = ClientId(next_id.fetch_add(1, Ordering::SeqCst));
            let next = match ServerOptions::new().create(&pipe_name) {
                Ok(next) => next,
                Err(_) => break,
            };
            let senders = Arc::clone(&senders);
            let events_tx = events_tx.clone();
            tokio::task::spawn_local(serve_one(current, id, senders, events_tx, send_handshake));
            current = next;
        }
    });
    Ok(())
}

#[derive(Clone)]
pub struct WindowsOutboundPipeServer {
    senders: Senders,
    events: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
}

impl WindowsOutboundPipeServer {
    pub fn bind(pipe_name: String) -> std::io::Result<Self> {
        let senders: Senders = Arc::default();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        spawn_accept_loop(pipe_name, Arc::clone(&senders), events_tx, true)?;
        Ok(Self {
            senders,
            events: Arc::new(Mutex::new(events_rx)),
        })
    }
}

#[async_trait]
impl OutboundPipeServer for WindowsOutboundPipeServer {
    async fn send(&self, client: ClientId, data: &[u8]) -> Result<(), PipeError> {
        let sender = self
            .senders
            .lock()
            .get(&client.0)
            .cloned()
            .ok_or(PipeError::NotConnected(client))?;
        sender.send(data.to_vec()).map_err(|_| PipeError::NotConnected(client))
    }

    async fn broadcast(&self, data: &[u8]) {
        let senders: Vec<_> = self.senders.lock().values().cloned().collect();
        for sender in senders {
            let _ = sender.send(data.to_vec());
        }
    }

    async fn next_event(&self) -> Option<PipeEvent> {
        self.events.lock().recv().await
    }
}

#[derive(Clone)]
pub struct WindowsInboundPipeServer {
    events: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
}

impl WindowsInboundPipeServer {
    pub fn bind(pipe_name: String) -> std::io::Result<Self> {
        let senders: Senders = Arc::default();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        spawn_accept_loop(pipe_name, senders, events_tx, false)?;
        Ok(Self {
            events: Arc::new(Mutex::new(events_rx)),
        })
    }
}

#[async_trait]
impl InboundPipeServer for WindowsInboundPipeServer {
    async fn next_event(&self) -> Option<PipeEvent> {
        self.events.lock().recv().await
    }
}

/// Client-side reader of a supervisor's outbound (event) pipe.
#[derive(Clone)]
pub struct WindowsOutboundPipeClient {
    pipe_name: String,
    events: Arc<Mutex<Option<mpsc::UnboundedReceiver<PipeEvent>>>>,
}

impl WindowsOutboundPipeClient {
    pub fn new(pipe_name: String) -> Self {
        Self {
            pipe_name,
            events: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl super::OutboundPipeClient for WindowsOutboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        let mut client = ClientOptions::new().open(&self.pipe_name)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        *self.events.lock() = Some(events_rx);

        tokio::task::spawn_local(async move {
            let id = ClientId(0);
            let _ = events_tx.send(PipeEvent::Connected(id));

            let mut buf = [0u8; 4096];
            let mut handshake_seen = false;
            loop {
                match client.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let chunk = &buf[..n];
                        let payload = if handshake_seen {
                            chunk
                        } else if let Some(rest) = winss_wire::strip_handshake(chunk) {
                            handshake_seen = true;
                            rest
                        } else {
                            continue;
                        };
                        if !payload.is_empty() {
                            let _ = events_tx.send(PipeEvent::Received(id, payload.to_vec()));
                        }
                    }
                }
            }
            let _ = events_tx.send(PipeEvent::Disconnected(id));
        });
        Ok(())
    }

    async fn next_event(&self) -> Option<PipeEvent> {
        let mut guard = self.events.lock();
        match guard.as_mut() {
            Some(rx) => rx.recv().await,
            None => None,
        }
    }
}

/// Client-side writer to a supervisor's inbound (control) pipe.
#[derive(Clone)]
pub struct WindowsInboundPipeClient {
    pipe_name: String,
    client: Arc<Mutex<Option<NamedPipeClient>>>,
}

impl WindowsInboundPipeClient {
    pub fn new(pipe_name: String) -> Self {
        Self {
            pipe_name,
            client: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl super::InboundPipeClient for WindowsInboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        let client = ClientOptions::new().open(&self.pipe_name)?;
        *self.client.lock() = Some(client);
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), PipeError> {
        let mut guard = self.client.lock();
        let client = guard.as_mut().ok_or(PipeError::NotConnected(ClientId(0)))?;
        client.try_write(data)?;
        Ok(())
    }
}
