// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem addresses for the Unix domain socket substitute transport
//! (spec.md §4.2, §6.2 on-disk layout).
//!
//! The production named-pipe transport addresses a pipe by a digest of the
//! owning service's canonical path (`winss_core::PipeName`) because
//! Windows's `\\.\pipe\` namespace is flat and needs that digest to avoid
//! collisions. Unix domain sockets have no such flat namespace: a socket is
//! just a file, and the service/scan directory the socket belongs to is
//! already a globally unique filesystem path. So rather than mirror the
//! digest scheme, these sockets are rooted directly in the same bookkeeping
//! subdirectory the state file and scanner lockfile already use
//! (`<service>/supervise/`, `<scandir>/.winss-svscan/`) — every process that
//! knows the service/scan directory (the one argument every CLI binary
//! already takes) can compute the matching socket path with no digest and no
//! canonicalization round-trip.

use std::path::{Path, PathBuf};

const SUPERVISE_DIR: &str = "supervise";
const SCAN_BOOKKEEPING_DIR: &str = ".winss-svscan";
const EVENT_SOCKET: &str = "event.sock";
const CONTROL_SOCKET: &str = "control.sock";

/// A supervisor's outbound (event) pipe address, rooted at `service_dir`'s
/// `supervise/` bookkeeping subdirectory alongside the state file.
pub fn event_socket_path(service_dir: &Path) -> PathBuf {
    service_dir.join(SUPERVISE_DIR).join(EVENT_SOCKET)
}

/// A supervisor's inbound (control) pipe address.
pub fn control_socket_path(service_dir: &Path) -> PathBuf {
    service_dir.join(SUPERVISE_DIR).join(CONTROL_SOCKET)
}

/// A scanner's inbound (control) pipe address, rooted at `scan_dir`'s
/// `.winss-svscan/` bookkeeping subdirectory alongside the finish file.
pub fn scan_control_socket_path(scan_dir: &Path) -> PathBuf {
    scan_dir.join(SCAN_BOOKKEEPING_DIR).join(CONTROL_SOCKET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_in_the_existing_bookkeeping_subdirectories() {
        let service = Path::new("/scan/api");
        assert_eq!(event_socket_path(service), Path::new("/scan/api/supervise/event.sock"));
        assert_eq!(control_socket_path(service), Path::new("/scan/api/supervise/control.sock"));

        let scan = Path::new("/scan");
        assert_eq!(
            scan_control_socket_path(scan),
            Path::new("/scan/.winss-svscan/control.sock")
        );
    }
}
