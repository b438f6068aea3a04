// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup for the `supervise`/`svscan` binaries (EXPANSION 4.0),
//! grounded on the teacher daemon's `setup_logging`: an `EnvFilter`-backed
//! `tracing_subscriber` registry over a non-blocking writer.
//!
//! Unlike the teacher, which appends to a rotated log file because it is a
//! single long-lived session daemon, `supervise`/`svscan` are per-service
//! foreground processes normally run under a process supervisor of their
//! own (each other, transitively, under `svscan`) — so this writes to
//! stderr, the original's own destination for its `-v` logging.
//!
//! `-v[<n>]`'s count maps to a level the same way the original's `-v<n>`
//! flag maps to an `easylogging` verbosity: 0 warn, 1 info, 2 debug, 3+
//! trace. An explicit `RUST_LOG` always wins over the count, for a human
//! debugging one module without cranking the whole process to trace.
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. The returned guard must be held for the
/// life of the process; dropping it early truncates buffered log lines.
pub fn init(verbosity: u8) -> tracing_appender::non_blocking::WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());

    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking).with_target(false))
        .init();

    guard
}
