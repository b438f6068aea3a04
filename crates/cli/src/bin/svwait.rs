// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `svwait [-u|-d|-D] [-o|-a] [-T <ms>] <servicedirs>...` (spec.md §6.1):
//! composes one [`NotificationWaitItem`] per service directory currently
//! held by a running supervisor, over a single [`ControlRendezvous`]; `-o`
//! changes completion from AND (every directory must satisfy its condition)
//! to OR (the first one to satisfy it wins, and its path is printed).
//!
//! Grounded on `examples/original_source/bin/winss-svwait.cpp`'s `main()`:
//! a directory is skipped entirely (not waited on at all) when its
//! supervisor lock is free, i.e. no supervisor is running there; if that
//! leaves no directories to wait on, `svwait` exits 0 immediately. With none
//! of `-u`/`-d`/`-D` given, the original's default is "don't wait" (its
//! `Settings::wait` defaults to `NO_WAIT`), not "wait up".

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::Parser;
use winss_cli::client::{self, SupervisorOutbound};
use winss_platform::{Fs2PathMutexHost, PathMutexHost};
use winss_runtime::control_rendezvous::{self, ControlItem, ControlRendezvous, NotificationWaitItem};
use winss_runtime::multiplexer::Multiplexer;
use winss_runtime::wait_listener::{WaitAction, WaitCondition, WaitSnapshot};

#[derive(Parser, Debug)]
#[command(name = "svwait", version, about = "Wait for one or more supervised services")]
struct Args {
    /// Wait for up, down, or down-with-finish; with none given, don't wait.
    #[arg(short = 'u', action = clap::ArgAction::SetTrue)]
    up: bool,
    #[arg(short = 'd', action = clap::ArgAction::SetTrue)]
    down: bool,
    #[arg(short = 'D', action = clap::ArgAction::SetTrue)]
    finished: bool,

    /// Complete on the first satisfied directory instead of requiring all.
    #[arg(short = 'o', action = clap::ArgAction::SetTrue)]
    any: bool,
    #[arg(short = 'a', action = clap::ArgAction::SetTrue)]
    all: bool,

    #[arg(short = 'T')]
    timeout_ms: Option<u64>,

    servicedirs: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).init();

    let args = Args::parse();
    if args.servicedirs.is_empty() {
        anyhow::bail!("at least one servicedir is required");
    }
    let action = if args.up {
        WaitAction::WaitUp
    } else if args.down {
        WaitAction::WaitDown
    } else if args.finished {
        WaitAction::WaitFinished
    } else {
        WaitAction::NoWait
    };
    let any = args.any && !args.all;
    let timeout = args.timeout_ms.filter(|&ms| ms > 0).map(Duration::from_millis);

    let local = tokio::task::LocalSet::new();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let code = runtime.block_on(local.run_until(run(args.servicedirs, action, any, timeout)))?;
    std::process::exit(code);
}

async fn run(service_dirs: Vec<PathBuf>, action: WaitAction, any: bool, timeout: Option<Duration>) -> anyhow::Result<i32> {
    let lock_dir = winss_daemon::lock_dir::resolve()?;
    let mutex_host = Fs2PathMutexHost::new(lock_dir);

    // Directories with no supervisor currently holding the lock are skipped
    // outright, not waited on.
    let mut running_dirs = Vec::with_capacity(service_dirs.len());
    for service_dir in service_dirs {
        let mutex_name = client::supervisor_mutex_name(&service_dir).await?;
        if !mutex_host.can_lock(&mutex_name).await? {
            running_dirs.push(service_dir);
        }
    }
    if running_dirs.is_empty() {
        tracing::info!("no running service directories specified");
        return Ok(0);
    }

    let mux = Multiplexer::new();
    let close_notify = Rc::new(tokio::sync::Notify::new());
    mux.add_close_event(Rc::clone(&close_notify), 130);
    mux.spawn_background({
        let close_notify = Rc::clone(&close_notify);
        async move {
            let _ = tokio::signal::ctrl_c().await;
            close_notify.notify_one();
        }
    });

    // finish_all=false means the first removed item stops the rendezvous
    // (OR completion); finish_all=true waits for every item (AND).
    let rendezvous = match timeout {
        Some(duration) => ControlRendezvous::with_timeout(mux.clone(), !any, duration, control_rendezvous::DEFAULT_TIMEOUT_EXIT_CODE),
        None => ControlRendezvous::new(mux.clone(), !any),
    };

    let mut items: Vec<(PathBuf, Rc<NotificationWaitItem<SupervisorOutbound>>)> = Vec::new();

    for service_dir in running_dirs {
        let outbound = Rc::new(client::supervisor_outbound(&service_dir).await?);
        let condition = WaitCondition::new(action);
        let snapshot_dir = service_dir.clone();
        let name = service_dir.to_string_lossy().into_owned();
        let item = NotificationWaitItem::new(rendezvous.clone(), outbound, condition, move || WaitSnapshot {
            is_up: winss_runtime::state_file::read_sync(&snapshot_dir).map(|s| s.is_up).unwrap_or(false),
        }, name);
        rendezvous.add(Rc::clone(&item));
        items.push((service_dir, item));
    }

    let code = rendezvous.start().await;
    if any && code == 0 {
        if let Some((path, _)) = items.iter().find(|(_, item)| item.completed()) {
            println!("{}", path.display());
        }
    }
    Ok(code)
}
