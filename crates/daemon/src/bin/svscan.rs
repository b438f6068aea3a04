// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `svscan [-t <ms>] [-s] [<scandir>]` (spec.md §6.1): runs one scanner and
//! its inbound control pipe server until told to exit.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use winss_daemon::{lock_dir, logging, scanner_controller};
use winss_platform::{Fs2PathMutexHost, FsHost, TokioFsHost};
use winss_runtime::multiplexer::Multiplexer;
use winss_runtime::scanner::Scanner;

#[cfg(unix)]
use winss_platform::process::UnixProcessHost as PlatformProcessHost;
#[cfg(windows)]
use winss_platform::process::WindowsProcessHost as PlatformProcessHost;

#[cfg(unix)]
use winss_platform::pipe::UnixInboundPipeServer;
#[cfg(windows)]
use winss_platform::pipe::WindowsInboundPipeServer;

const FATAL_EXIT_CODE: i32 = 111;

#[derive(Parser, Debug)]
#[command(name = "svscan", version, about = "Scan a directory of service directories")]
struct Args {
    /// Directory to scan; defaults to the current directory.
    scandir: Option<PathBuf>,

    /// Rescan period in milliseconds. Omitted or 0 disables periodic rescan.
    #[arg(short = 't', long = "timeout")]
    rescan_ms: Option<u64>,

    /// Divert console signals away from this process (let child supervisors
    /// handle their own).
    #[arg(short = 's')]
    divert_signals: bool,

    /// Increase log verbosity (repeatable): warn, info, debug, trace.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

#[cfg(unix)]
async fn bind_inbound(scan_dir: &std::path::Path) -> std::io::Result<UnixInboundPipeServer> {
    let control_path = winss_platform::scan_control_socket_path(scan_dir);
    if let Some(parent) = control_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    UnixInboundPipeServer::bind(control_path)
}

#[cfg(windows)]
async fn bind_inbound(scan_dir: &std::path::Path) -> std::io::Result<WindowsInboundPipeServer> {
    let canonical = tokio::fs::canonicalize(scan_dir).await?;
    let canonical = canonical.to_string_lossy().into_owned();
    let name = winss_core::PipeName::for_role(&canonical, winss_core::PipeRole::Control).to_string();
    WindowsInboundPipeServer::bind(name)
}

fn main() {
    let args = Args::parse();
    let _guard = logging::init(args.verbose);

    let scan_dir = args.scandir.unwrap_or_else(|| PathBuf::from("."));
    let rescan = args.rescan_ms.filter(|&ms| ms > 0).map(Duration::from_millis);

    let exit_code = match run(scan_dir, rescan, args.divert_signals) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(%err, "svscan failed to start");
            FATAL_EXIT_CODE
        }
    };
    std::process::exit(exit_code);
}

/// Spawns a task that consumes `SIGINT`/`SIGTERM` without acting on them,
/// so this process survives a console break that its child supervisors
/// (each in their own process group) handle on their own.
#[cfg(unix)]
fn divert_console_signals() {
    use tokio::signal::unix::{signal, SignalKind};
    for kind in [SignalKind::interrupt(), SignalKind::terminate()] {
        if let Ok(mut stream) = signal(kind) {
            tokio::task::spawn_local(async move {
                loop {
                    if stream.recv().await.is_none() {
                        return;
                    }
                    tracing::debug!("diverted console signal");
                }
            });
        }
    }
}

fn run(scan_dir: PathBuf, rescan: Option<Duration>, divert_signals: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let lock_dir = lock_dir::resolve()?;
    let local = tokio::task::LocalSet::new();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    runtime.block_on(local.run_until(async move {
        let mux = Multiplexer::new();
        let process_host = PlatformProcessHost::new();
        let fs = TokioFsHost;
        if !fs.exists(&scan_dir).await {
            return Ok::<i32, Box<dyn std::error::Error>>(winss_runtime::error::FATAL_BOOT);
        }

        #[cfg(unix)]
        if divert_signals {
            divert_console_signals();
        }
        #[cfg(not(unix))]
        let _ = divert_signals;

        let inbound = Rc::new(bind_inbound(&scan_dir).await?);

        let mutex_host = Fs2PathMutexHost::new(lock_dir);
        let scanner: Scanner<_, _, _> = Scanner::new(mux.clone(), process_host, fs, mutex_host, scan_dir.clone(), rescan);

        mux.spawn_background({
            let scanner = scanner.clone();
            async move { scanner_controller::pump_commands(scanner, inbound).await }
        });

        if let Err(err) = scanner.init().await {
            tracing::error!(%err, "scanner init failed");
            return Ok(err.into_runtime_error(scan_dir).exit_code());
        }

        let code = mux.start().await.unwrap_or(0);
        Ok(code)
    }))
}
