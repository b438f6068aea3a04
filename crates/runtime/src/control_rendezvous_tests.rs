// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::cell::RefCell;
use tokio::task::LocalSet;
use winss_core::Notification;
use winss_platform::{ClientId, FakeInboundPipeClient, FakeOutboundPipeClient, PipeError};
use winss_wire::encode_notification;

use crate::wait_listener::WaitAction;

struct RecordingItem {
    name: String,
    log: Rc<RefCell<Vec<String>>>,
    done: Cell<bool>,
}

#[async_trait(?Send)]
impl ControlItem for RecordingItem {
    fn name(&self) -> &str {
        &self.name
    }

    async fn init(self: Rc<Self>) {
        self.log.borrow_mut().push(format!("init:{}", self.name));
    }

    async fn start(self: Rc<Self>) {
        self.log.borrow_mut().push(format!("start:{}", self.name));
        self.done.set(true);
    }

    fn completed(&self) -> bool {
        self.done.get()
    }
}

struct FailingInboundClient;

#[async_trait::async_trait]
impl InboundPipeClient for FailingInboundClient {
    async fn connect(&self) -> Result<(), PipeError> {
        Err(PipeError::NotConnected(ClientId(0)))
    }

    async fn send(&self, _data: &[u8]) -> Result<(), PipeError> {
        Ok(())
    }
}

#[tokio::test(flavor = "current_thread")]
async fn start_waits_for_every_item_to_be_ready() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), true);
            let log = Rc::new(RefCell::new(Vec::new()));
            let a = Rc::new(RecordingItem {
                name: "a".to_string(),
                log: Rc::clone(&log),
                done: Cell::new(false),
            });
            let b = Rc::new(RecordingItem {
                name: "b".to_string(),
                log: Rc::clone(&log),
                done: Cell::new(false),
            });
            rendezvous.add(a.clone());
            rendezvous.add(b.clone());

            rendezvous.ready("a");
            tokio::task::yield_now().await;
            assert!(!log.borrow().contains(&"start:a".to_string()));
            assert!(!rendezvous.is_started());

            rendezvous.ready("b");
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;

            assert!(rendezvous.is_started());
            assert!(log.borrow().contains(&"start:a".to_string()));
            assert!(log.borrow().contains(&"start:b".to_string()));
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn single_command_item_sends_and_stops() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), true);
            let client = Rc::new(FakeInboundPipeClient::new());
            let item = CommandSendItem::new(mux.clone(), rendezvous.clone(), client.clone(), b"u".to_vec(), "svc");
            rendezvous.add(item.clone());

            let code = rendezvous.start().await;

            assert_eq!(code, 0);
            assert_eq!(client.sent(), b"u".to_vec());
            assert!(item.completed());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn command_item_connect_failure_stops_with_no_send_code() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), true);
            let client = Rc::new(FailingInboundClient);
            let item = CommandSendItem::new(mux.clone(), rendezvous.clone(), client, b"u".to_vec(), "svc");
            rendezvous.add(item.clone());

            let code = rendezvous.start().await;

            assert_eq!(code, NO_SEND_EXIT_CODE);
            assert!(!item.completed());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn wait_item_already_satisfied_completes_without_a_notification() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), true);
            let client = Rc::new(FakeOutboundPipeClient::new());
            let condition = WaitCondition::new(WaitAction::WaitUp);
            let item = NotificationWaitItem::new(rendezvous.clone(), client, condition, || WaitSnapshot { is_up: true }, "web");
            rendezvous.add(item.clone());

            let code = rendezvous.start().await;

            assert_eq!(code, 0);
            assert!(item.completed());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn wait_item_completes_once_the_notification_arrives() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), true);
            let client = Rc::new(FakeOutboundPipeClient::new());
            let condition = WaitCondition::new(WaitAction::WaitUp);
            let item = NotificationWaitItem::new(
                rendezvous.clone(),
                client.clone(),
                condition,
                || WaitSnapshot { is_up: false },
                "web",
            );
            rendezvous.add(item.clone());

            let pushed = client;
            tokio::task::spawn_local(async move {
                tokio::task::yield_now().await;
                pushed.push(encode_notification(Notification::Run));
            });

            let code = rendezvous.start().await;

            assert_eq!(code, 0);
            assert!(item.completed());
        })
        .await;
}

#[tokio::test(flavor = "current_thread")]
async fn finish_all_false_stops_as_soon_as_one_item_completes() {
    LocalSet::new()
        .run_until(async {
            let mux = Multiplexer::new();
            let rendezvous = ControlRendezvous::new(mux.clone(), false);

            let fast_client = Rc::new(FakeInboundPipeClient::new());
            let fast_item = CommandSendItem::new(mux.clone(), rendezvous.clone(), fast_client, b"u".to_vec(), "fast");

            let slow_client = Rc::new(FakeOutboundPipeClient::new());
            let slow_condition = WaitCondition::new(WaitAction::WaitUp);
            let slow_item = NotificationWaitItem::new(
                rendezvous.clone(),
                slow_client,
                slow_condition,
                || WaitSnapshot { is_up: false },
                "slow",
            );

            rendezvous.add(fast_item.clone());
            rendezvous.add(slow_item.clone());

            let code = rendezvous.start().await;

            assert_eq!(code, 0);
            assert!(fast_item.completed());
            assert!(!slow_item.completed());
        })
        .await;
}
