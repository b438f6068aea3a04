// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `svscanctl {-a|-b|-n|-q}... <scandir>` (spec.md §6.1), grounded on
//! `examples/original_source/bin/winss-svscanctl.cpp`: sends one or more
//! scan commands, in command-line order, to a running scanner's control
//! pipe. No commands given is a silent no-op (exit 0); a scanner not
//! currently running is [`LOCK_CONFLICT`].

use std::path::PathBuf;
use std::rc::Rc;

use clap::{Arg, ArgAction, Command};
use winss_cli::client;
use winss_core::ScanCommand;
use winss_platform::{Fs2PathMutexHost, PathMutexHost};
use winss_runtime::control_rendezvous::{CommandSendItem, ControlRendezvous};
use winss_runtime::error::LOCK_CONFLICT;
use winss_runtime::multiplexer::Multiplexer;
use winss_wire::encode_scan_command;

fn cli() -> Command {
    Command::new("svscanctl")
        .about("Send commands to a running scanner")
        .arg(Arg::new("alarm").short('a').action(ArgAction::SetTrue))
        .arg(Arg::new("abort").short('b').action(ArgAction::SetTrue))
        .arg(Arg::new("nuke").short('n').action(ArgAction::SetTrue))
        .arg(Arg::new("quit").short('q').action(ArgAction::SetTrue))
        .arg(Arg::new("scandir").required(true))
}

/// Scan commands in the order their flags appeared on the command line.
fn ordered_commands(matches: &clap::ArgMatches) -> Vec<ScanCommand> {
    let flags: [(&str, ScanCommand); 4] = [
        ("alarm", ScanCommand::Alarm),
        ("abort", ScanCommand::Abort),
        ("nuke", ScanCommand::Nuke),
        ("quit", ScanCommand::Quit),
    ];
    let mut ordered: Vec<(usize, ScanCommand)> = Vec::new();
    for (name, command) in flags {
        if let Some(indices) = matches.indices_of(name) {
            ordered.extend(indices.map(|idx| (idx, command)));
        }
    }
    ordered.sort_by_key(|(idx, _)| *idx);
    ordered.into_iter().map(|(_, c)| c).collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).init();

    let matches = cli().get_matches();
    let scan_dir = match matches.get_one::<String>("scandir") {
        Some(dir) => PathBuf::from(dir),
        None => anyhow::bail!("scandir is required"),
    };
    let commands = ordered_commands(&matches);
    if commands.is_empty() {
        return Ok(());
    }

    let local = tokio::task::LocalSet::new();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let code = runtime.block_on(local.run_until(run(scan_dir, commands)))?;
    std::process::exit(code);
}

async fn run(scan_dir: PathBuf, commands: Vec<ScanCommand>) -> anyhow::Result<i32> {
    let lock_dir = winss_daemon::lock_dir::resolve()?;
    let mutex_host = Fs2PathMutexHost::new(lock_dir);
    let mutex_name = client::scan_mutex_name(&scan_dir).await?;
    if mutex_host.can_lock(&mutex_name).await? {
        tracing::warn!(dir = %scan_dir.display(), "no scanner is holding this directory's lock");
        return Ok(LOCK_CONFLICT);
    }

    let mux = Multiplexer::new();
    let close_notify = Rc::new(tokio::sync::Notify::new());
    mux.add_close_event(Rc::clone(&close_notify), 0);
    mux.spawn_background({
        let close_notify = Rc::clone(&close_notify);
        async move {
            let _ = tokio::signal::ctrl_c().await;
            close_notify.notify_one();
        }
    });

    let rendezvous = ControlRendezvous::new(mux.clone(), true);
    let inbound = Rc::new(client::scan_inbound(&scan_dir).await?);
    let bytes = commands.into_iter().map(encode_scan_command).collect();
    let send_item = CommandSendItem::new(mux.clone(), rendezvous.clone(), inbound, bytes, "svscanctl");
    rendezvous.add(send_item);

    Ok(rendezvous.start().await)
}
