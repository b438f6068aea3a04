// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `svstat <servicedir>` (spec.md §6.1, §4.8): prints the formatted state
//! line and exits 0 if a supervisor currently holds the service's lock, 1
//! otherwise (spec.md line 297).

use std::path::PathBuf;

use clap::Parser;
use winss_cli::client;
use winss_core::Clock;
use winss_platform::{Fs2PathMutexHost, PathMutexHost};
use winss_runtime::state_file;

#[derive(Parser, Debug)]
#[command(name = "svstat", version, about = "Print a supervised service's status")]
struct Args {
    servicedir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let running = runtime.block_on(run(&args.servicedir))?;
    std::process::exit(if running { 0 } else { 1 });
}

async fn run(service_dir: &std::path::Path) -> anyhow::Result<bool> {
    let lock_dir = winss_daemon::lock_dir::resolve()?;
    let mutex_host = Fs2PathMutexHost::new(lock_dir);
    let mutex_name = client::supervisor_mutex_name(service_dir).await?;
    let running = !mutex_host.can_lock(&mutex_name).await?;

    match state_file::read_sync(service_dir) {
        Some(state) => {
            let wants_up = state.remaining_count != 0;
            let now_ms = winss_core::SystemClock.epoch_ms();
            println!("{}", state.format(wants_up, now_ms));
        }
        None => println!("unable to read state file"),
    }

    Ok(running)
}
