// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Unix domain socket stand-in for Windows named pipes, used on non-Windows
//! build/test hosts. One accept task per server; one read task and one
//! write task per connected client.

use super::{ClientId, InboundPipeServer, OutboundPipeServer, PipeError, PipeEvent};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use winss_wire::HANDSHAKE_BYTE;

type Senders = Arc<Mutex<HashMap<u64, mpsc::UnboundedSender<Vec<u8>>>>>;

async fn accept_loop(
    listener: UnixListener,
    senders: Senders,
    next_id: Arc<AtomicU64>,
    events_tx: mpsc::UnboundedSender<PipeEvent>,
    send_handshake: bool,
) {
    loop {
        let Ok((stream, _)) = listener.accept().await else {
            return;
        };
        let id = ClientId(next_id.fetch_add(1, Ordering::SeqCst));
        let (mut read_half, mut write_half) = stream.into_split();

        if send_handshake {
            if write_half.write_all(&[HANDSHAKE_BYTE]).await.is_err() {
                continue;
            }
        }

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

        let read_events = events_tx.clone();
        let read_senders = Arc::clone(&senders);
        tokio::task::spawn_local(async move {
            let mut buf = [0u8; 4096];
            loop {
                match read_half.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => {
                        let _ = read_events.send(PipeEvent::Received(id, buf[..n].to_vec()));
                    }
                }
            }
            read_senders.lock().remove(&id.0);
            let _ = read_events.send(PipeEvent::Disconnected(id));
        });
    }
}

#[derive(Clone)]
pub struct UnixOutboundPipeServer {
    senders: Senders,
    events: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
}

impl UnixOutboundPipeServer {
    pub fn bind(path: PathBuf) -> std::io::Result<Self> {
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path)?;
        let senders: Senders = Arc::default();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let next_id = Arc::new(AtomicU64::new(0));

        tokio::task::spawn_local(accept_loop(listener, Arc::clone(&senders), next_id, events_tx, true));

        Ok(Self {
            senders,
            events: Arc::new(Mutex::new(events_rx)),
        })
    }
}

#[async_trait]
impl OutboundPipeServer for UnixOutboundPipeServer {
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
pub struct UnixInboundPipeServer {
    events: Arc<Mutex<mpsc::UnboundedReceiver<PipeEvent>>>,
}

impl UnixInboundPipeServer {
    pub fn bind(path: PathBuf) -> std::io::Result<Self> {
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path)?;
        let senders: Senders = Arc::default();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let next_id = Arc::new(AtomicU64::new(0));

        tokio::task::spawn_local(accept_loop(listener, senders, next_id, events_tx, false));

        Ok(Self {
            events: Arc::new(Mutex::new(events_rx)),
        })
    }
}

#[async_trait]
impl InboundPipeServer for UnixInboundPipeServer {
    async fn next_event(&self) -> Option<PipeEvent> {
        self.events.lock().recv().await
    }
}

/// Client-side reader of a supervisor's outbound (event) pipe: connects,
/// strips the handshake byte, and surfaces only payload bytes thereafter.
#[derive(Clone)]
pub struct UnixOutboundPipeClient {
    path: PathBuf,
    events: Arc<Mutex<Option<mpsc::UnboundedReceiver<PipeEvent>>>>,
}

impl UnixOutboundPipeClient {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            events: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl super::OutboundPipeClient for UnixOutboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        let mut stream = UnixStream::connect(&self.path).await?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        *self.events.lock() = Some(events_rx);

        tokio::task::spawn_local(async move {
            let id = ClientId(0);
            let _ = events_tx.send(PipeEvent::Connected(id));

            let mut buf = [0u8; 4096];
            let mut handshake_seen = false;
            loop {
                match stream.read(&mut buf).await {
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
pub struct UnixInboundPipeClient {
    path: PathBuf,
    stream: Arc<Mutex<Option<UnixStream>>>,
}

impl UnixInboundPipeClient {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            stream: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl super::InboundPipeClient for UnixInboundPipeClient {
    async fn connect(&self) -> Result<(), PipeError> {
        let stream = UnixStream::connect(&self.path).await?;
        *self.stream.lock() = Some(stream);
        Ok(())
    }

    async fn send(&self, data: &[u8]) -> Result<(), PipeError> {
        let mut guard = self.stream.lock();
        let stream = guard.as_mut().ok_or(PipeError::NotConnected(ClientId(0)))?;
        stream.try_write(data)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "unix_impl_tests.rs"]
mod tests;
