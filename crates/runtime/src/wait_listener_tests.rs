// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use winss_wire::encode_notification;

#[test]
fn no_wait_is_disabled_and_never_waits() {
    let cond = WaitCondition::new(WaitAction::NoWait);
    assert!(!cond.is_enabled());
    assert!(!cond.must_wait(WaitSnapshot { is_up: false }));
}

#[test]
fn wait_up_is_already_satisfied_when_already_up() {
    let cond = WaitCondition::new(WaitAction::WaitUp);
    assert!(cond.is_enabled());
    assert!(!cond.must_wait(WaitSnapshot { is_up: true }));
    assert!(cond.must_wait(WaitSnapshot { is_up: false }));
}

#[test]
fn wait_up_is_satisfied_by_run_notification() {
    let cond = WaitCondition::new(WaitAction::WaitUp);
    let run = [encode_notification(Notification::Run)];
    assert!(!cond.handle_received(&run));
}

#[test]
fn wait_up_keeps_waiting_on_unrelated_notifications() {
    let cond = WaitCondition::new(WaitAction::WaitUp);
    let start = [encode_notification(Notification::Start)];
    assert!(cond.handle_received(&start));
}

#[test]
fn wait_down_is_already_satisfied_when_already_down() {
    let cond = WaitCondition::new(WaitAction::WaitDown);
    assert!(!cond.must_wait(WaitSnapshot { is_up: false }));
    assert!(cond.must_wait(WaitSnapshot { is_up: true }));
}

#[test]
fn wait_down_is_satisfied_by_end_or_exit() {
    let cond = WaitCondition::new(WaitAction::WaitDown);
    assert!(!cond.handle_received(&[encode_notification(Notification::End)]));

    let cond2 = WaitCondition::new(WaitAction::WaitDown);
    assert!(!cond2.handle_received(&[encode_notification(Notification::Exit)]));
}

#[test]
fn wait_finished_always_waits_and_is_satisfied_only_by_finished() {
    let cond = WaitCondition::new(WaitAction::WaitFinished);
    assert!(cond.must_wait(WaitSnapshot { is_up: false }));
    assert!(cond.must_wait(WaitSnapshot { is_up: true }));

    assert!(cond.handle_received(&[encode_notification(Notification::Run)]));
    assert!(!cond.handle_received(&[encode_notification(Notification::Finished)]));
}

#[test]
fn wait_restart_requires_a_down_before_the_next_up() {
    let cond = WaitCondition::new(WaitAction::WaitRestart);
    assert!(cond.must_wait(WaitSnapshot { is_up: true }));

    // A Run with no preceding End observed this session doesn't count.
    assert!(cond.handle_received(&[encode_notification(Notification::Run)]));
    // End then Run completes the restart.
    assert!(cond.handle_received(&[encode_notification(Notification::End)]));
    assert!(!cond.handle_received(&[encode_notification(Notification::Run)]));
}

#[test]
fn unknown_byte_does_not_end_the_wait() {
    let cond = WaitCondition::new(WaitAction::WaitUp);
    assert!(cond.handle_received(&[0xff]));
}

#[test]
fn multiple_notifications_in_one_message_are_each_processed_in_order() {
    let cond = WaitCondition::new(WaitAction::WaitDown);
    let chunk = [
        encode_notification(Notification::Start),
        encode_notification(Notification::Run),
        encode_notification(Notification::End),
    ];
    assert!(!cond.handle_received(&chunk));
}
