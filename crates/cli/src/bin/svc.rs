// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `svc {-u|-o|-O|-d|-k|-t|-x}... [-w{d|D|u|r}] [-T <ms>] <servicedir>`
//! (spec.md §6.1), grounded on `examples/original_source/bin/winss-svc.cpp`:
//! sends one or more supervisor commands in command-line order, optionally
//! waiting for a condition afterward.

use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use clap::{Arg, ArgAction, Command};
use winss_cli::client;
use winss_core::SupervisorCommand;
use winss_platform::{Fs2PathMutexHost, PathMutexHost};
use winss_runtime::control_rendezvous::{self, CommandSendItem, ControlRendezvous, NotificationWaitItem};
use winss_runtime::error::LOCK_CONFLICT;
use winss_runtime::multiplexer::Multiplexer;
use winss_runtime::wait_listener::{WaitAction, WaitCondition, WaitSnapshot};
use winss_wire::encode_supervisor_command;

fn cli() -> Command {
    Command::new("svc")
        .about("Send commands to a supervised service")
        .arg(Arg::new("up").short('u').action(ArgAction::SetTrue))
        .arg(Arg::new("once").short('o').action(ArgAction::SetTrue))
        .arg(Arg::new("once_at_most").short('O').action(ArgAction::SetTrue))
        .arg(Arg::new("down").short('d').action(ArgAction::SetTrue))
        .arg(Arg::new("kill").short('k').action(ArgAction::SetTrue))
        .arg(Arg::new("term").short('t').action(ArgAction::SetTrue))
        .arg(Arg::new("exit").short('x').action(ArgAction::SetTrue))
        .arg(Arg::new("wait").short('w').value_name("ACTION"))
        .arg(Arg::new("timeout").short('T').value_name("MS"))
        .arg(Arg::new("servicedir").required(true))
}

/// Supervisor commands in the order their flags appeared on the command
/// line (spec.md: a sequence, not an unordered set — `svc -t -k` sends Term
/// then Kill).
fn ordered_commands(matches: &clap::ArgMatches) -> Vec<SupervisorCommand> {
    let flags: [(&str, SupervisorCommand); 7] = [
        ("up", SupervisorCommand::Up),
        ("once", SupervisorCommand::Once),
        ("once_at_most", SupervisorCommand::OnceAtMost),
        ("down", SupervisorCommand::Down),
        ("kill", SupervisorCommand::Kill),
        ("term", SupervisorCommand::Term),
        ("exit", SupervisorCommand::Exit),
    ];
    let mut ordered: Vec<(usize, SupervisorCommand)> = Vec::new();
    for (name, command) in flags {
        if let Some(indices) = matches.indices_of(name) {
            ordered.extend(indices.map(|idx| (idx, command)));
        }
    }
    ordered.sort_by_key(|(idx, _)| *idx);
    ordered.into_iter().map(|(_, c)| c).collect()
}

fn wait_action(letter: &str) -> anyhow::Result<WaitAction> {
    match letter {
        "d" => Ok(WaitAction::WaitDown),
        "D" => Ok(WaitAction::WaitFinished),
        "u" => Ok(WaitAction::WaitUp),
        "r" => Ok(WaitAction::WaitRestart),
        other => anyhow::bail!("-w requires one of d/D/u/r, got {other:?}"),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).with_target(false).init();

    let matches = cli().get_matches();
    let service_dir = match matches.get_one::<String>("servicedir") {
        Some(dir) => PathBuf::from(dir),
        None => anyhow::bail!("servicedir is required"),
    };
    let commands = ordered_commands(&matches);
    if commands.is_empty() {
        anyhow::bail!("at least one of -u/-o/-O/-d/-k/-t/-x is required");
    }
    let action = match matches.get_one::<String>("wait") {
        Some(letter) => wait_action(letter)?,
        None => WaitAction::NoWait,
    };
    let timeout = matches
        .get_one::<String>("timeout")
        .map(|s| s.parse::<u64>())
        .transpose()?
        .filter(|&ms| ms > 0)
        .map(Duration::from_millis);

    let local = tokio::task::LocalSet::new();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let code = runtime.block_on(local.run_until(run(service_dir, commands, action, timeout)))?;
    std::process::exit(code);
}

async fn run(
    service_dir: PathBuf,
    commands: Vec<SupervisorCommand>,
    action: WaitAction,
    timeout: Option<Duration>,
) -> anyhow::Result<i32> {
    let lock_dir = winss_daemon::lock_dir::resolve()?;
    let mutex_host = Fs2PathMutexHost::new(lock_dir);
    let mutex_name = client::supervisor_mutex_name(&service_dir).await?;
    if mutex_host.can_lock(&mutex_name).await? {
        tracing::warn!(dir = %service_dir.display(), "no supervisor is holding this service's lock");
        return Ok(LOCK_CONFLICT);
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

    let rendezvous = match timeout {
        Some(duration) => {
            ControlRendezvous::with_timeout(mux.clone(), true, duration, control_rendezvous::DEFAULT_TIMEOUT_EXIT_CODE)
        }
        None => ControlRendezvous::new(mux.clone(), true),
    };

    let inbound = Rc::new(client::supervisor_inbound(&service_dir).await?);
    let bytes = commands.into_iter().map(encode_supervisor_command).collect();
    let send_item = CommandSendItem::new(mux.clone(), rendezvous.clone(), inbound, bytes, "commands");
    rendezvous.add(send_item);

    if action != WaitAction::NoWait {
        let outbound = Rc::new(client::supervisor_outbound(&service_dir).await?);
        let condition = WaitCondition::new(action);
        let snapshot_dir = service_dir.clone();
        let wait_item = NotificationWaitItem::new(
            rendezvous.clone(),
            outbound,
            condition,
            move || WaitSnapshot {
                is_up: winss_runtime::state_file::read_sync(&snapshot_dir).map(|s| s.is_up).unwrap_or(false),
            },
            "wait",
        );
        rendezvous.add(wait_item);
    }

    Ok(rendezvous.start().await)
}
