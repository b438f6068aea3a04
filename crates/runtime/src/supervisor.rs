// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Supervisor State Machine (spec.md §4.6) — the heart of the design. One
//! instance manages one service directory's run/finish cycle, restart and
//! teardown policy, event emission, and state persistence.
//!
//! Generic over the four capability traits it depends on so tests can wire
//! deterministic fakes (`winss_platform::Fake*`) while production code wires
//! the real adapters; every method that does I/O is `async` and is driven
//! either directly (`init`, `command`) or via [`Multiplexer::spawn_background`]
//! kicked off from a [`Multiplexer`] callback (`step`, restart cooldowns,
//! finish-deadline timeouts, exit-code polling) — the multiplexer's own
//! callbacks stay synchronous (EXPANSION 4.1a), so anything needing to
//! `.await` spawns onto the same `LocalSet` through a tracked background
//! entry that keeps `start()`'s loop alive until it finishes.

use std::cell::{Cell, RefCell};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use winss_core::{Clock, MutexName, Notification, ServiceState, SupervisorCommand};
use winss_platform::{FsHost, PathMutexHost, ProcessHandle, ProcessHost, ProcessParams, Stdio};

use crate::env_compositor;
use crate::multiplexer::Multiplexer;
use crate::state_file;

const COOLDOWN_GROUP: &str = "supervisor-cooldown";
const RUN_EXIT_CODE_ENV: &str = "SUPERVISE_RUN_EXIT_CODE";
const DEFAULT_FINISH_TIMEOUT_MS: u64 = 5000;
const SPAWN_FAIL_COOLDOWN: Duration = Duration::from_secs(10);
const CLEAN_CYCLE_COOLDOWN: Duration = Duration::from_secs(1);
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// A registered listener: `Notification::emit` calls every one in
/// registration order and drops those that return `false` (spec.md §4.6
/// "Listeners that return false deregister").
pub type Listener = Box<dyn FnMut(Notification) -> bool>;

struct Shared<PH, FH, PM, C> {
    mux: Multiplexer,
    process_host: PH,
    fs: FH,
    mutex_host: PM,
    clock: C,
    service_dir: PathBuf,
    state: RefCell<ServiceState>,
    /// 0 = running normally, 1 = exit requested, 2 = Exit notification sent.
    exiting: Cell<u8>,
    waiting: Cell<bool>,
    current_handle: RefCell<Option<ProcessHandle>>,
    mutex_name: RefCell<Option<MutexName>>,
    listeners: RefCell<Vec<Listener>>,
}

pub struct Supervisor<PH, FH, PM, C> {
    shared: Rc<Shared<PH, FH, PM, C>>,
}

impl<PH, FH, PM, C> Clone for Supervisor<PH, FH, PM, C> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<PH, FH, PM, C> Supervisor<PH, FH, PM, C>
where
    PH: ProcessHost,
    FH: FsHost,
    PM: PathMutexHost,
    C: Clock + 'static,
{
    pub fn new(
        mux: Multiplexer,
        process_host: PH,
        fs: FH,
        mutex_host: PM,
        clock: C,
        service_dir: impl Into<PathBuf>,
    ) -> Self {
        let service_dir = service_dir.into();
        Self {
            shared: Rc::new(Shared {
                mux,
                process_host,
                fs,
                mutex_host,
                clock: clock.clone(),
                service_dir,
                state: RefCell::new(ServiceState::new(clock.epoch_ms())),
                exiting: Cell::new(0),
                waiting: Cell::new(false),
                current_handle: RefCell::new(None),
                mutex_name: RefCell::new(None),
                listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn on_notification(&self, listener: impl FnMut(Notification) -> bool + 'static) {
        self.shared.listeners.borrow_mut().push(Box::new(listener));
    }

    /// A copy of the current in-memory state, e.g. for `svstat` reading a
    /// live in-process supervisor in tests.
    pub fn snapshot(&self) -> ServiceState {
        *self.shared.state.borrow()
    }

    /// Whether the current restart policy wants the service kept up — the
    /// `wants_up` hint [`ServiceState::format`] takes.
    pub fn wants_up(&self) -> bool {
        self.shared.state.borrow().remaining_count != 0
    }

    fn mutex_name(&self) -> Option<MutexName> {
        self.shared.mutex_name.borrow().clone()
    }

    /// Initialization (spec.md §4.6 "Initialization"): change into the
    /// service directory (fatal if missing), acquire the path mutex
    /// (conflict if already held), seed `ServiceState` from the `down`
    /// marker, emit `Start`, then run the first `step`.
    pub async fn init(&self) -> Result<(), InitError> {
        if !self.shared.fs.exists(&self.shared.service_dir).await {
            return Err(InitError::MissingDir);
        }

        let canonical = self
            .shared
            .fs
            .canonicalize(&self.shared.service_dir)
            .await
            .map_err(|_| InitError::MissingDir)?;
        let name = MutexName::new(&canonical.to_string_lossy(), "supervise");
        let locked = self
            .shared
            .mutex_host
            .lock(&name)
            .await
            .map_err(|_| InitError::LockConflict)?;
        if !locked {
            return Err(InitError::LockConflict);
        }
        *self.shared.mutex_name.borrow_mut() = Some(name);

        let now = self.shared.clock.epoch_ms();
        let down_marker = self.shared.fs.exists(&self.shared.service_dir.join("down")).await;
        {
            let mut state = self.shared.state.borrow_mut();
            state.time = now;
            state.last = now;
            if down_marker {
                state.initially_up = false;
                state.remaining_count = 0;
            } else {
                state.initially_up = true;
                state.remaining_count = -1;
            }
        }

        self.emit(Notification::Start).await;
        self.step(false).await;
        Ok(())
    }

    /// Dispatches a client command (spec.md §4.6 "Commands"). A no-op if
    /// the path mutex is not held by this instance.
    pub async fn command(&self, cmd: SupervisorCommand) {
        let Some(name) = self.mutex_name() else {
            return;
        };
        if !self.shared.mutex_host.has_lock(&name).await {
            return;
        }
        let exiting = self.shared.exiting.get() > 0;

        match cmd {
            SupervisorCommand::Up => {
                if exiting {
                    return;
                }
                self.shared.state.borrow_mut().remaining_count = -1;
                if !self.shared.state.borrow().is_up {
                    self.step(false).await;
                }
            }
            SupervisorCommand::Once => {
                if exiting {
                    return;
                }
                if !self.shared.state.borrow().is_up {
                    self.shared.state.borrow_mut().remaining_count = 1;
                    self.step(false).await;
                } else {
                    self.shared.state.borrow_mut().remaining_count = 0;
                }
            }
            SupervisorCommand::OnceAtMost => {
                if exiting {
                    return;
                }
                self.shared.state.borrow_mut().remaining_count = 0;
            }
            SupervisorCommand::Down => {
                self.shared.state.borrow_mut().remaining_count = 0;
                self.term_run_child().await;
            }
            SupervisorCommand::Kill => {
                self.kill_run_child().await;
            }
            SupervisorCommand::Term => {
                self.term_run_child().await;
            }
            SupervisorCommand::Exit => {
                if exiting {
                    return;
                }
                self.shared.state.borrow_mut().remaining_count = 0;
                self.shared.exiting.set(1);
                if !self.shared.state.borrow().is_up {
                    self.step(false).await;
                }
            }
        }
    }

    async fn kill_run_child(&self) {
        let (is_up, is_run) = {
            let s = self.shared.state.borrow();
            (s.is_up, s.is_run_process)
        };
        if is_up && is_run {
            if let Some(handle) = *self.shared.current_handle.borrow() {
                let _ = self.shared.process_host.terminate(handle).await;
            }
        }
    }

    async fn term_run_child(&self) {
        let (is_up, is_run) = {
            let s = self.shared.state.borrow();
            (s.is_up, s.is_run_process)
        };
        if is_up && is_run {
            if let Some(handle) = *self.shared.current_handle.borrow() {
                let _ = self.shared.process_host.send_break(handle).await;
            }
        }
    }

    /// The core transition function (spec.md §4.6 "The step(timeout)
    /// transition"), invoked from `init`, every child-exit callback, and
    /// every expiring cooldown/finish-deadline timer.
    pub async fn step(&self, timeout: bool) {
        self.shared.mux.remove_timeout(COOLDOWN_GROUP);
        self.shared.waiting.set(false);

        let mut restart: u8 = 0;
        let is_up = self.shared.state.borrow().is_up;

        if is_up {
            let is_run_process = self.shared.state.borrow().is_run_process;
            if is_run_process {
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.is_up = false;
                    state.pid = 0;
                }
                self.emit(Notification::End).await;

                if self.shared.exiting.get() > 0 {
                    self.shared.state.borrow_mut().exit_code = winss_core::SIGNALED_EXIT_CODE;
                } else if let Some(handle) = self.shared.current_handle.borrow_mut().take() {
                    if let Ok(Some(code)) = self.shared.process_host.exit_code(handle).await {
                        self.shared.state.borrow_mut().exit_code = code;
                    }
                }

                if !self.start_finish().await {
                    restart = 2;
                }
            } else {
                if timeout {
                    if let Some(handle) = *self.shared.current_handle.borrow() {
                        let _ = self.shared.process_host.terminate(handle).await;
                    }
                    return;
                }

                let handle = self.shared.current_handle.borrow_mut().take();
                let mut exit_code = 0;
                if let Some(handle) = handle {
                    if let Ok(Some(code)) = self.shared.process_host.exit_code(handle).await {
                        exit_code = code;
                    }
                }
                if exit_code == winss_core::DOWN_EXIT_CODE {
                    self.shared.state.borrow_mut().remaining_count = 0;
                }
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.is_up = false;
                    state.pid = 0;
                }
                restart = 2;
            }
        } else if !self.complete().await && !self.start_run().await {
            restart = 1;
        }

        if restart >= 2 {
            self.emit(Notification::Finished).await;
        }

        let remaining = self.shared.state.borrow().remaining_count;
        if restart > 0 && !self.complete().await && remaining != 0 {
            self.shared.waiting.set(true);
            let delay = if restart == 1 {
                SPAWN_FAIL_COOLDOWN
            } else {
                CLEAN_CYCLE_COOLDOWN
            };
            let me = self.clone();
            self.shared.mux.add_timeout(delay, COOLDOWN_GROUP, move |mux| {
                let me = me.clone();
                mux.spawn_background(async move { me.step(true).await });
            });
        }
    }

    /// spec.md §4.6 `Complete()`: returns `false` unless exiting. On the
    /// first call after `exiting := 1`, emits `Exit` and asks the
    /// multiplexer to stop.
    async fn complete(&self) -> bool {
        match self.shared.exiting.get() {
            0 => false,
            1 => {
                self.shared.exiting.set(2);
                if !self.shared.mux.is_stopping() {
                    self.shared.mux.stop(0);
                }
                self.emit(Notification::Exit).await;
                true
            }
            _ => true,
        }
    }

    /// spec.md §4.6 `StartRun()`.
    async fn start_run(&self) -> bool {
        if self.shared.state.borrow().remaining_count == 0 {
            return true;
        }

        let Some(cmd) = self.read_script("run").await else {
            return false;
        };

        {
            let mut state = self.shared.state.borrow_mut();
            state.up_count += 1;
            state.is_run_process = true;
        }

        let mut env = self.compose_env().await;
        env.remove(RUN_EXIT_CODE_ENV);

        let params = ProcessParams {
            cmd,
            create_group: true,
            dir: self.shared.service_dir.clone(),
            env,
            stdio: Stdio::default(),
        };

        match self.shared.process_host.create(params).await {
            Ok(handle) => {
                let pid = self.shared.process_host.process_id(handle).await.unwrap_or(0);
                {
                    let mut state = self.shared.state.borrow_mut();
                    if state.remaining_count > 0 {
                        state.remaining_count -= 1;
                    }
                    state.exit_code = 0;
                    state.is_up = true;
                    state.pid = pid;
                }
                *self.shared.current_handle.borrow_mut() = Some(handle);
                self.schedule_exit_wait(handle);
                self.emit(Notification::Run).await;
                true
            }
            Err(err) => {
                tracing::warn!(service = ?self.shared.service_dir, error = %err, "unable to spawn run");
                false
            }
        }
    }

    /// spec.md §4.6 `StartFinish()`. Returns `false` if there is no
    /// `finish` script (or it could not be spawned) — the caller treats
    /// that as "nothing to run, proceed straight to Finished".
    async fn start_finish(&self) -> bool {
        self.shared.state.borrow_mut().is_run_process = false;

        let finish_path = self.shared.service_dir.join("finish");
        if !self.shared.fs.exists(&finish_path).await {
            return false;
        }
        let cmd = match self.shared.fs.read_to_string(&finish_path).await {
            Ok(Some(contents)) => contents.trim().to_string(),
            _ => return false,
        };
        if cmd.is_empty() {
            return false;
        }

        let prev_exit_code = self.shared.state.borrow().exit_code;
        let mut env = self.compose_env().await;
        env.insert(RUN_EXIT_CODE_ENV.to_string(), prev_exit_code.to_string());

        let params = ProcessParams {
            cmd,
            create_group: true,
            dir: self.shared.service_dir.clone(),
            env,
            stdio: Stdio::default(),
        };

        match self.shared.process_host.create(params).await {
            Ok(handle) => {
                let pid = self.shared.process_host.process_id(handle).await.unwrap_or(0);
                {
                    let mut state = self.shared.state.borrow_mut();
                    state.is_up = true;
                    state.pid = pid;
                }
                *self.shared.current_handle.borrow_mut() = Some(handle);
                self.arm_finish_timeout().await;
                self.schedule_exit_wait(handle);
                true
            }
            Err(err) => {
                tracing::warn!(service = ?self.shared.service_dir, error = %err, "unable to spawn finish");
                false
            }
        }
    }

    async fn arm_finish_timeout(&self) {
        let path = self.shared.service_dir.join("timeout-finish");
        let ms = match self.shared.fs.read_to_string(&path).await {
            Ok(Some(contents)) => contents.trim().parse::<u64>().unwrap_or(DEFAULT_FINISH_TIMEOUT_MS),
            _ => DEFAULT_FINISH_TIMEOUT_MS,
        };
        if ms == 0 {
            return;
        }
        let me = self.clone();
        self.shared
            .mux
            .add_timeout(Duration::from_millis(ms), COOLDOWN_GROUP, move |mux| {
                let me = me.clone();
                mux.spawn_background(async move { me.step(true).await });
            });
        self.shared.waiting.set(true);
    }

    /// Polls [`ProcessHost::exit_code`] until the child has exited, then
    /// drives another `step`. The capability trait is poll-based (it has no
    /// async "wait" primitive of its own, matching `tokio::process::Child`'s
    /// `try_wait`), so this is the multiplexer's "register for exit"
    /// substitute. Run through [`Multiplexer::spawn_background`] so the
    /// event loop stays alive across the poll, including the steady state
    /// where no cooldown or finish-deadline timer is armed.
    fn schedule_exit_wait(&self, handle: ProcessHandle) {
        let me = self.clone();
        self.shared.mux.spawn_background(async move {
            loop {
                match me.shared.process_host.exit_code(handle).await {
                    Ok(Some(_)) => break,
                    Ok(None) => tokio::time::sleep(EXIT_POLL_INTERVAL).await,
                    Err(_) => break,
                }
            }
            me.step(false).await;
        });
    }

    async fn read_script(&self, name: &'static str) -> Option<String> {
        match self.shared.fs.read_to_string(&self.shared.service_dir.join(name)).await {
            Ok(Some(contents)) => {
                let trimmed = contents.trim().to_string();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed)
                }
            }
            _ => None,
        }
    }

    async fn compose_env(&self) -> std::collections::HashMap<String, String> {
        let process_env: std::collections::BTreeMap<String, String> = std::env::vars().collect();
        let composed = env_compositor::compose_from_dir(
            &self.shared.fs,
            process_env,
            &self.shared.service_dir.join("env"),
        )
        .await;
        composed.into_iter().collect()
    }

    /// Every notification updates `time`; `Run`/`End` additionally update
    /// `last` (spec.md §4.6 "Event emission"). Persists the state file
    /// before notifying listeners.
    async fn emit(&self, notification: Notification) {
        {
            let mut state = self.shared.state.borrow_mut();
            let now = self.shared.clock.epoch_ms();
            state.time = now;
            if matches!(notification, Notification::Run | Notification::End) {
                state.last = now;
            }
        }

        let snapshot = *self.shared.state.borrow();
        if let Err(err) = state_file::write(&self.shared.fs, &self.shared.service_dir, &snapshot).await {
            tracing::warn!(service = ?self.shared.service_dir, error = %err, "failed to persist state file");
        }

        self.shared.listeners.borrow_mut().retain_mut(|listener| listener(notification));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InitError {
    #[error("service directory does not exist")]
    MissingDir,
    #[error("path mutex already held by another process")]
    LockConflict,
}

impl InitError {
    /// Attaches the service directory path `init` was called with, producing
    /// the crate-wide [`crate::error::RuntimeError`] a binary's `main` maps
    /// to an exit code.
    pub fn into_runtime_error(self, service_dir: PathBuf) -> crate::error::RuntimeError {
        match self {
            InitError::MissingDir => crate::error::RuntimeError::MissingServiceDir { path: service_dir },
            InitError::LockConflict => crate::error::RuntimeError::LockConflict { path: service_dir },
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
