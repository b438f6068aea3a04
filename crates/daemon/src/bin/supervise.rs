// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `supervise <servicedir>` (spec.md §6.1): runs one supervisor and its
//! pair of pipe servers until told to exit.

use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use winss_core::SystemClock;
use winss_daemon::{lock_dir, logging, supervisor_controller};
use winss_platform::{Fs2PathMutexHost, FsHost, TokioFsHost};
use winss_runtime::multiplexer::Multiplexer;
use winss_runtime::Supervisor;

#[cfg(unix)]
use winss_platform::process::UnixProcessHost as PlatformProcessHost;
#[cfg(windows)]
use winss_platform::process::WindowsProcessHost as PlatformProcessHost;

#[cfg(unix)]
use winss_platform::pipe::{UnixInboundPipeServer, UnixOutboundPipeServer};
#[cfg(windows)]
use winss_platform::pipe::{WindowsInboundPipeServer, WindowsOutboundPipeServer};

/// Fatal-boot exit code (spec.md §7): the service directory is missing, or
/// the event/control pipe could not be bound.
const FATAL_EXIT_CODE: i32 = 111;

#[derive(Parser, Debug)]
#[command(name = "supervise", version, about = "Supervise a single service directory")]
struct Args {
    /// Directory containing run/finish/down/timeout-finish/env.
    servicedir: PathBuf,

    /// Increase log verbosity (repeatable): warn, info, debug, trace.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Binds the supervisor's outbound (event) and inbound (control) pipe
/// servers. On Unix these are domain sockets rooted at the service
/// directory's own `supervise/` bookkeeping subdirectory (EXPANSION, see
/// `winss_platform::socket_path`); on Windows they are named pipes rooted
/// at a digest of the service directory's canonical path
/// (`winss_core::PipeName`), matching the original's flat pipe namespace.
#[cfg(unix)]
async fn bind_pipes(
    service_dir: &std::path::Path,
) -> std::io::Result<(UnixOutboundPipeServer, UnixInboundPipeServer)> {
    let event_path = winss_platform::event_socket_path(service_dir);
    let control_path = winss_platform::control_socket_path(service_dir);
    if let Some(parent) = event_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let outbound = UnixOutboundPipeServer::bind(event_path)?;
    let inbound = UnixInboundPipeServer::bind(control_path)?;
    Ok((outbound, inbound))
}

#[cfg(windows)]
async fn bind_pipes(
    service_dir: &std::path::Path,
) -> std::io::Result<(WindowsOutboundPipeServer, WindowsInboundPipeServer)> {
    let canonical = tokio::fs::canonicalize(service_dir).await?;
    let canonical = canonical.to_string_lossy().into_owned();
    let event_name = winss_core::PipeName::for_role(&canonical, winss_core::PipeRole::Event).to_string();
    let control_name = winss_core::PipeName::for_role(&canonical, winss_core::PipeRole::Control).to_string();
    let outbound = WindowsOutboundPipeServer::bind(event_name)?;
    let inbound = WindowsInboundPipeServer::bind(control_name)?;
    Ok((outbound, inbound))
}

fn main() {
    let args = Args::parse();
    let _guard = logging::init(args.verbose);

    let exit_code = match run(args.servicedir) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "supervise failed to start");
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(exit_code);
}

fn run(service_dir: PathBuf) -> Result<i32, Box<dyn std::error::Error>> {
    let lock_dir = lock_dir::resolve()?;
    let local = tokio::task::LocalSet::new();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(local.run_until(async move {
        let mux = Multiplexer::new();
        let process_host = PlatformProcessHost::new();
        let fs = TokioFsHost;
        if !fs.exists(&service_dir).await {
            return Ok::<i32, Box<dyn std::error::Error>>(winss_runtime::error::FATAL_BOOT);
        }

        let (outbound, inbound) = bind_pipes(&service_dir).await?;
        let outbound = Rc::new(outbound);
        let inbound = Rc::new(inbound);

        let mutex_host = Fs2PathMutexHost::new(lock_dir);
        let clock = SystemClock;
        let supervisor = Supervisor::new(mux.clone(), process_host, fs, mutex_host, clock, service_dir.clone());

        supervisor_controller::wire_notifications(&mux, &supervisor, Rc::clone(&outbound));
        mux.spawn_background({
            let supervisor = supervisor.clone();
            async move { supervisor_controller::pump_commands(supervisor, inbound).await }
        });

        if let Err(err) = supervisor.init().await {
            tracing::error!(%err, "supervisor init failed");
            return Ok(err.into_runtime_error(service_dir).exit_code());
        }

        let code = mux.start().await.unwrap_or(0);
        Ok(code)
    }))
}
