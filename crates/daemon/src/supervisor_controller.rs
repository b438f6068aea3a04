// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor Controller (spec.md §4.7), grounded on
//! `examples/original_source/lib/winss/control.hpp`'s `Control`-facing glue
//! a real `supervise` process wires around one `Supervisor`: every
//! notification goes out on the outbound (event) pipe server as one byte
//! (spec.md §6.3), and every byte received on the inbound (command) pipe
//! server dispatches to [`winss_runtime::Supervisor::command`]. Unknown
//! command bytes are logged and otherwise ignored (spec.md §7
//! Protocol-mismatch).

use std::rc::Rc;

use winss_core::Clock;
use winss_platform::{FsHost, InboundPipeServer, OutboundPipeServer, PathMutexHost, PipeEvent, ProcessHost};
use winss_runtime::{multiplexer::Multiplexer, Supervisor};
use winss_wire::{decode_supervisor_command, encode_notification};

/// Registers a listener that broadcasts every notification to `outbound` as
/// its wire byte. Must be called before `supervisor.init()` so the `Start`
/// notification `init` emits is not missed.
pub fn wire_notifications<PH, FH, PM, C, OS>(mux: &Multiplexer, supervisor: &Supervisor<PH, FH, PM, C>, outbound: Rc<OS>)
where
    PH: ProcessHost,
    FH: FsHost,
    PM: PathMutexHost,
    C: Clock + 'static,
    OS: OutboundPipeServer + 'static,
{
    let mux = mux.clone();
    supervisor.on_notification(move |notification| {
        let outbound = Rc::clone(&outbound);
        let byte = encode_notification(notification);
        mux.spawn_background(async move {
            outbound.broadcast(&[byte]).await;
        });
        true
    });
}

/// Pumps `inbound`'s events for the life of the pipe, dispatching every
/// received byte as a command. Intended to be driven through
/// [`Multiplexer::spawn_background`] so the event loop stays alive while
/// waiting on the next command.
pub async fn pump_commands<PH, FH, PM, C, IS>(supervisor: Supervisor<PH, FH, PM, C>, inbound: Rc<IS>)
where
    PH: ProcessHost,
    FH: FsHost,
    PM: PathMutexHost,
    C: Clock + 'static,
    IS: InboundPipeServer,
{
    loop {
        match inbound.next_event().await {
            Some(PipeEvent::Received(_, bytes)) => {
                for byte in bytes {
                    match decode_supervisor_command(byte) {
                        Ok(cmd) => supervisor.command(cmd).await,
                        Err(err) => tracing::debug!(byte = %err, "unrecognized supervisor command byte"),
                    }
                }
            }
            Some(_) => {}
            None => return,
        }
    }
}
