// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side pipe/mutex addressing, grounded on
//! `examples/original_source/bin/winss-svc.cpp`'s
//! `PipeName(service_dir, kMutexName)` / `PathMutex(service_dir, kMutexName)`
//! construction: every client binary needs the exact same addresses the
//! owning `supervise`/`svscan` process bound (`winss_platform::socket_path`
//! on Unix; a digest of the canonical directory on Windows).

use std::path::Path;

use winss_core::MutexName;
#[cfg(windows)]
use winss_core::PipeRole;

/// Suffix `winss-runtime::supervisor::Supervisor` uses for its path mutex.
pub const SUPERVISE_MUTEX_SUFFIX: &str = "supervise";
/// Suffix `winss-runtime::scanner::Scanner` uses for its path mutex.
pub const SVSCAN_MUTEX_SUFFIX: &str = "svscan";

#[cfg(unix)]
pub type SupervisorOutbound = winss_platform::pipe::UnixOutboundPipeClient;
#[cfg(windows)]
pub type SupervisorOutbound = winss_platform::pipe::WindowsOutboundPipeClient;

#[cfg(unix)]
pub type SupervisorInbound = winss_platform::pipe::UnixInboundPipeClient;
#[cfg(windows)]
pub type SupervisorInbound = winss_platform::pipe::WindowsInboundPipeClient;

#[cfg(unix)]
pub type ScanInbound = winss_platform::pipe::UnixInboundPipeClient;
#[cfg(windows)]
pub type ScanInbound = winss_platform::pipe::WindowsInboundPipeClient;

/// The mutex name a supervisor at `service_dir` locks at startup; used to
/// probe whether one is currently running (`svc`'s upfront `CanLock` check).
pub async fn supervisor_mutex_name(service_dir: &Path) -> std::io::Result<MutexName> {
    mutex_name(service_dir, SUPERVISE_MUTEX_SUFFIX).await
}

/// The mutex name a scanner at `scan_dir` locks at startup.
pub async fn scan_mutex_name(scan_dir: &Path) -> std::io::Result<MutexName> {
    mutex_name(scan_dir, SVSCAN_MUTEX_SUFFIX).await
}

async fn mutex_name(dir: &Path, suffix: &str) -> std::io::Result<MutexName> {
    let canonical = tokio::fs::canonicalize(dir).await?;
    Ok(MutexName::new(&canonical.to_string_lossy(), suffix))
}

/// A client for a supervisor's outbound (event) pipe, the one `svc -w` and
/// `svwait` read notifications from.
#[cfg(unix)]
pub async fn supervisor_outbound(service_dir: &Path) -> std::io::Result<SupervisorOutbound> {
    Ok(SupervisorOutbound::new(winss_platform::event_socket_path(service_dir)))
}
#[cfg(windows)]
pub async fn supervisor_outbound(service_dir: &Path) -> std::io::Result<SupervisorOutbound> {
    Ok(SupervisorOutbound::new(pipe_name(service_dir, PipeRole::Event).await?.to_string()))
}

/// A client for a supervisor's inbound (control) pipe, the one `svc` writes
/// command bytes to.
#[cfg(unix)]
pub async fn supervisor_inbound(service_dir: &Path) -> std::io::Result<SupervisorInbound> {
    Ok(SupervisorInbound::new(winss_platform::control_socket_path(service_dir)))
}
#[cfg(windows)]
pub async fn supervisor_inbound(service_dir: &Path) -> std::io::Result<SupervisorInbound> {
    Ok(SupervisorInbound::new(pipe_name(service_dir, PipeRole::Control).await?.to_string()))
}

/// A client for a scanner's inbound (control) pipe, the one `svscanctl`
/// writes a single command byte to.
#[cfg(unix)]
pub async fn scan_inbound(scan_dir: &Path) -> std::io::Result<ScanInbound> {
    Ok(ScanInbound::new(winss_platform::scan_control_socket_path(scan_dir)))
}
#[cfg(windows)]
pub async fn scan_inbound(scan_dir: &Path) -> std::io::Result<ScanInbound> {
    Ok(ScanInbound::new(pipe_name(scan_dir, PipeRole::Control).await?.to_string()))
}

#[cfg(windows)]
async fn pipe_name(dir: &Path, role: PipeRole) -> std::io::Result<winss_core::PipeName> {
    let canonical = tokio::fs::canonicalize(dir).await?;
    Ok(winss_core::PipeName::for_role(&canonical.to_string_lossy(), role))
}
