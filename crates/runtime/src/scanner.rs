// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scanner (spec.md §4.11): periodically reconciles a scan directory's
//! subdirectories against a set of spawned `supervise` children, pairing a
//! service with its optional `log` consumer over an anonymous pipe.
//!
//! Grounded on `examples/original_source/lib/winss/svscan/svscan.hpp`'s
//! `SvScanTmpl` and `service.hpp`'s `ServiceTmpl`. Unlike [`crate::supervisor`],
//! which runs the supervised state machine in-process, the Scanner's
//! children are separate `supervise` *processes* (the original's
//! `ServiceProcessTmpl::Start` spawns `winss-supervise.exe <dir>`), so this
//! module is a thin reconciliation loop over [`ProcessHost`] rather than a
//! second state machine.
//!
//! `init` follows [`crate::supervisor::Supervisor`]'s convention: it is a
//! plain `async` method the owning binary calls directly before `mux.start()`,
//! not a callback registered on the multiplexer's own init list (the
//! original's `AddInitCallback` is not reproduced here for that reason).

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use winss_core::MutexName;
use winss_platform::{FsHost, PathMutexHost, ProcessHandle, ProcessHost, ProcessParams, Stdio};

use crate::multiplexer::Multiplexer;

pub const FATAL_EXIT_CODE: i32 = 111;
pub const MUTEX_CONFLICT_EXIT_CODE: i32 = 100;

const TIMEOUT_GROUP: &str = "svscan";
const MUTEX_SUFFIX: &str = "svscan";
const BOOKKEEPING_DIR: &str = ".winss-svscan";
const FINISH_FILE: &str = "finish";
const LOG_DIR: &str = "log";
const SUPERVISE_EXE: &str = "supervise";

struct ServiceEntry {
    name: String,
    dir: PathBuf,
    main: RefCell<Option<ProcessHandle>>,
    log: RefCell<Option<ProcessHandle>>,
    flagged: Cell<bool>,
}

impl ServiceEntry {
    fn new(name: String, dir: PathBuf) -> Rc<Self> {
        Rc::new(Self {
            name,
            dir,
            main: RefCell::new(None),
            log: RefCell::new(None),
            flagged: Cell::new(false),
        })
    }
}

struct Shared<PH, FH, PM> {
    mux: Multiplexer,
    process_host: PH,
    fs: FH,
    mutex_host: PM,
    scan_dir: PathBuf,
    rescan: Option<Duration>,
    services: RefCell<Vec<Rc<ServiceEntry>>>,
    exiting: Cell<bool>,
    close_on_exit: Cell<bool>,
    mutex_name: RefCell<Option<MutexName>>,
}

/// The scanner (spec.md §4.11). Cheaply `Clone` (an `Rc` handle).
pub struct Scanner<PH, FH, PM> {
    shared: Rc<Shared<PH, FH, PM>>,
}

impl<PH, FH, PM> Clone for Scanner<PH, FH, PM> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<PH, FH, PM> Scanner<PH, FH, PM>
where
    PH: ProcessHost,
    FH: FsHost,
    PM: PathMutexHost,
{
    pub fn new(
        mux: Multiplexer,
        process_host: PH,
        fs: FH,
        mutex_host: PM,
        scan_dir: impl Into<PathBuf>,
        rescan: Option<Duration>,
    ) -> Self {
        let scanner = Self {
            shared: Rc::new(Shared {
                mux: mux.clone(),
                process_host,
                fs,
                mutex_host,
                scan_dir: scan_dir.into(),
                rescan,
                services: RefCell::new(Vec::new()),
                exiting: Cell::new(false),
                close_on_exit: Cell::new(true),
                mutex_name: RefCell::new(None),
            }),
        };
        let me = scanner.clone();
        mux.add_stop(move |mux| {
            let me = me.clone();
            mux.spawn_background(async move { me.handle_stop().await });
        });
        scanner
    }

    async fn has_lock(&self) -> bool {
        let name = self.shared.mutex_name.borrow().clone();
        match name {
            Some(name) => self.shared.mutex_host.has_lock(&name).await,
            None => false,
        }
    }

    /// Initialization (spec.md §4.11 "Initialization"): fail fatally if the
    /// scan directory is absent, acquire the scan-level path mutex, create
    /// the bookkeeping subdirectory, then run the first scan.
    pub async fn init(&self) -> Result<(), ScanError> {
        if self.has_lock().await {
            return Ok(());
        }

        if !self.shared.fs.exists(&self.shared.scan_dir).await {
            return Err(ScanError::MissingDir);
        }

        let canonical = self
            .shared
            .fs
            .canonicalize(&self.shared.scan_dir)
            .await
            .map_err(|_| ScanError::MissingDir)?;
        let name = MutexName::new(&canonical.to_string_lossy(), MUTEX_SUFFIX);
        let locked = self
            .shared
            .mutex_host
            .lock(&name)
            .await
            .map_err(|_| ScanError::LockConflict)?;
        if !locked {
            return Err(ScanError::LockConflict);
        }
        *self.shared.mutex_name.borrow_mut() = Some(name);

        let bookkeeping = self.shared.scan_dir.join(BOOKKEEPING_DIR);
        if let Err(err) = self.shared.fs.create_dir_all(&bookkeeping).await {
            tracing::warn!(dir = ?bookkeeping, %err, "failed to create svscan bookkeeping directory");
        }

        self.scan(false).await;
        Ok(())
    }

    /// spec.md §4.11 `Scan(timeout)`.
    pub async fn scan(&self, timeout: bool) {
        if !self.has_lock().await || self.shared.exiting.get() {
            return;
        }
        if !timeout {
            self.shared.mux.remove_timeout(TIMEOUT_GROUP);
        }

        for entry in self.shared.services.borrow().iter() {
            entry.flagged.set(false);
        }

        let names = self
            .shared
            .fs
            .read_dir_names(&self.shared.scan_dir)
            .await
            .unwrap_or_default();

        for name in names {
            if name.is_empty() || name.starts_with('.') {
                continue;
            }
            let dir = self.shared.scan_dir.join(&name);
            if !self.shared.fs.is_dir(&dir).await {
                continue;
            }

            let existing = self
                .shared
                .services
                .borrow()
                .iter()
                .find(|entry| entry.name == name)
                .cloned();

            match existing {
                Some(entry) => self.check(&entry).await,
                None => {
                    let entry = ServiceEntry::new(name, dir);
                    self.check(&entry).await;
                    self.shared.services.borrow_mut().push(entry);
                }
            }
        }

        self.schedule();
    }

    fn schedule(&self) {
        let Some(delay) = self.shared.rescan else {
            return;
        };
        let me = self.clone();
        self.shared.mux.add_timeout(delay, TIMEOUT_GROUP, move |mux| {
            let me = me.clone();
            mux.spawn_background(async move { me.scan(true).await });
        });
    }

    /// spec.md §4.11 service entry `Check()`: re-flag an already-running
    /// entry, or spawn its main (and, if present, paired log) `supervise`
    /// child.
    async fn check(&self, entry: &Rc<ServiceEntry>) {
        entry.flagged.set(true);

        if entry.main.borrow().is_some() {
            return;
        }

        let log_dir = entry.dir.join(LOG_DIR);
        let has_log = self.shared.fs.is_dir(&log_dir).await;

        let (main_stdio, log_stdio) = if has_log {
            match self.shared.process_host.create_pipe().await {
                Ok((read_end, write_end)) => {
                    let mut log_stdio = Stdio::default();
                    log_stdio.stdin = Some(read_end);

                    let mut main_stdio = Stdio::default();
                    match write_end.try_clone() {
                        Ok(stderr_end) => {
                            main_stdio.stdout = Some(write_end);
                            main_stdio.stderr = Some(stderr_end);
                        }
                        Err(err) => {
                            tracing::warn!(service = %entry.name, %err, "failed to duplicate log pipe for stderr");
                            main_stdio.stdout = Some(write_end);
                        }
                    }
                    (main_stdio, Some(log_stdio))
                }
                Err(err) => {
                    tracing::warn!(service = %entry.name, %err, "failed to create log pipe, running without redirection");
                    (Stdio::default(), None)
                }
            }
        } else {
            (Stdio::default(), None)
        };

        if let Some(log_stdio) = log_stdio {
            match self.spawn_supervise(&log_dir, log_stdio).await {
                Ok(handle) => *entry.log.borrow_mut() = Some(handle),
                Err(err) => {
                    tracing::warn!(service = %entry.name, %err, "failed to spawn log supervisor");
                }
            }
        }

        match self.spawn_supervise(&entry.dir, main_stdio).await {
            Ok(handle) => *entry.main.borrow_mut() = Some(handle),
            Err(err) => {
                tracing::warn!(service = %entry.name, %err, "failed to spawn service supervisor");
            }
        }
    }

    async fn spawn_supervise(
        &self,
        dir: &Path,
        stdio: Stdio,
    ) -> Result<ProcessHandle, winss_platform::ProcessError> {
        let cmd = format!("{SUPERVISE_EXE} \"{}\"", dir.display());
        let params = ProcessParams {
            cmd,
            create_group: true,
            dir: self.shared.scan_dir.clone(),
            env: std::env::vars().collect(),
            stdio,
        };
        self.shared.process_host.create(params).await
    }

    /// spec.md §4.11 `CloseAllServices(ignore_flagged)`.
    pub async fn close_all_services(&self, ignore_flagged: bool) {
        if !self.has_lock().await {
            return;
        }

        let entries: Vec<Rc<ServiceEntry>> = self.shared.services.borrow().clone();
        let mut keep = Vec::with_capacity(entries.len());
        for entry in entries {
            if ignore_flagged || !entry.flagged.get() {
                self.close_entry(&entry).await;
            } else {
                keep.push(entry);
            }
        }
        *self.shared.services.borrow_mut() = keep;
    }

    async fn close_entry(&self, entry: &ServiceEntry) {
        if let Some(handle) = entry.main.borrow_mut().take() {
            let _ = self.shared.process_host.send_break(handle).await;
            let _ = self.shared.process_host.close(handle).await;
        }
        if let Some(handle) = entry.log.borrow_mut().take() {
            let _ = self.shared.process_host.send_break(handle).await;
            let _ = self.shared.process_host.close(handle).await;
        }
        entry.flagged.set(false);
    }

    /// spec.md §4.11 `Exit(close_services)`: sets the stop callback's
    /// policy and requests the multiplexer to stop.
    pub fn exit(&self, close_services: bool) {
        self.shared.close_on_exit.set(close_services);
        self.shared.mux.stop(0);
    }

    async fn handle_stop(&self) {
        if self.shared.exiting.get() {
            return;
        }
        self.shared.exiting.set(true);
        self.shared.mux.remove_timeout(TIMEOUT_GROUP);

        if self.shared.close_on_exit.get() {
            self.close_all_services(true).await;
        }

        let bookkeeping = self.shared.scan_dir.join(BOOKKEEPING_DIR);
        let finish_path = bookkeeping.join(FINISH_FILE);
        let cmd = match self.shared.fs.read_to_string(&finish_path).await {
            Ok(Some(contents)) => contents.trim().to_string(),
            _ => return,
        };
        if cmd.is_empty() {
            return;
        }

        tracing::debug!(dir = ?bookkeeping, "starting svscan finish process");
        let params = ProcessParams {
            cmd,
            create_group: false,
            dir: bookkeeping,
            env: std::env::vars().collect(),
            stdio: Stdio::default(),
        };
        if let Err(err) = self.shared.process_host.create(params).await {
            tracing::warn!(%err, "failed to spawn svscan finish process");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ScanError {
    #[error("scan directory does not exist")]
    MissingDir,
    #[error("scan-level path mutex already held by another process")]
    LockConflict,
}

impl ScanError {
    /// Attaches the scan directory path, producing the crate-wide
    /// [`crate::error::RuntimeError`] a binary's `main` maps to an exit code.
    pub fn into_runtime_error(self, scan_dir: PathBuf) -> crate::error::RuntimeError {
        match self {
            ScanError::MissingDir => crate::error::RuntimeError::MissingScanDir { path: scan_dir },
            ScanError::LockConflict => crate::error::RuntimeError::LockConflict { path: scan_dir },
        }
    }
}

#[cfg(test)]
#[path = "scanner_tests.rs"]
mod tests;
