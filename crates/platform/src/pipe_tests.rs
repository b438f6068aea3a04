// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn outbound_server_send_fails_before_connect() {
    let server = FakeOutboundPipeServer::new();
    let client = ClientId(0);
    assert!(matches!(
        server.send(client, b"s").await,
        Err(PipeError::NotConnected(_))
    ));
}

#[tokio::test]
async fn outbound_server_send_succeeds_after_connect_and_is_recorded() {
    let server = FakeOutboundPipeServer::new();
    let client = server.connect_client();
    server.send(client, b"s").await.expect("send");
    assert_eq!(server.sent(client), vec![b"s".to_vec()]);
}

#[tokio::test]
async fn outbound_server_broadcast_reaches_every_connected_client() {
    let server = FakeOutboundPipeServer::new();
    let a = server.connect_client();
    let b = server.connect_client();
    server.broadcast(b"u").await;
    assert_eq!(server.sent(a), vec![b"u".to_vec()]);
    assert_eq!(server.sent(b), vec![b"u".to_vec()]);
}

#[tokio::test]
async fn inbound_server_delivers_received_bytes() {
    let server = FakeInboundPipeServer::new();
    let client = ClientId(0);
    server.connect_client(client);
    server.deliver(client, b"k");

    assert_eq!(
        server.next_event().await,
        Some(PipeEvent::Connected(client))
    );
    assert_eq!(
        server.next_event().await,
        Some(PipeEvent::Received(client, b"k".to_vec()))
    );
}

#[tokio::test]
async fn inbound_client_send_requires_connect() {
    let client = FakeInboundPipeClient::new();
    assert!(matches!(
        client.send(b"u").await,
        Err(PipeError::NotConnected(_))
    ));
    client.connect().await.expect("connect");
    client.send(b"u").await.expect("send");
    assert_eq!(client.sent(), b"u".to_vec());
}

#[tokio::test]
async fn outbound_client_surfaces_pushed_notification_bytes() {
    let client = FakeOutboundPipeClient::new();
    client.connect().await.expect("connect");
    client.push(b'u');

    assert_eq!(
        client.next_event().await,
        Some(PipeEvent::Connected(ClientId(0)))
    );
    assert_eq!(
        client.next_event().await,
        Some(PipeEvent::Received(ClientId(0), vec![b'u']))
    );
}
