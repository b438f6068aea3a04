// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner Controller (spec.md §4.12): dispatches bytes received on a
//! scanner's inbound (control) pipe server to the matching
//! [`winss_runtime::scanner::Scanner`] operation. Unknown bytes are logged
//! and ignored (spec.md §7 Protocol-mismatch), same as the Supervisor
//! Controller.

use std::rc::Rc;

use winss_core::ScanCommand;
use winss_platform::{FsHost, InboundPipeServer, PathMutexHost, PipeEvent, ProcessHost};
use winss_runtime::scanner::Scanner;
use winss_wire::decode_scan_command;

/// Pumps `inbound`'s events for the life of the pipe, dispatching every
/// received byte to the scanner (spec.md §4.12 command vocabulary: `a`
/// rescans, `b` aborts without closing services, `n` drops unflagged
/// services, `q` quits closing every service).
pub async fn pump_commands<PH, FH, PM, IS>(scanner: Scanner<PH, FH, PM>, inbound: Rc<IS>)
where
    PH: ProcessHost,
    FH: FsHost,
    PM: PathMutexHost,
    IS: InboundPipeServer,
{
    loop {
        match inbound.next_event().await {
            Some(PipeEvent::Received(_, bytes)) => {
                for byte in bytes {
                    match decode_scan_command(byte) {
                        Ok(ScanCommand::Alarm) => scanner.scan(false).await,
                        Ok(ScanCommand::Abort) => scanner.exit(false),
                        Ok(ScanCommand::Nuke) => scanner.close_all_services(false).await,
                        Ok(ScanCommand::Quit) => scanner.exit(true),
                        Err(err) => tracing::debug!(byte = %err, "unrecognized scan command byte"),
                    }
                }
            }
            Some(_) => {}
            None => return,
        }
    }
}
