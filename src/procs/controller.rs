//! # Per-process lifecycle controller.
//!
//! One [`ProcessController`] exists per [`ProcessSpec`] for the lifetime of
//! the supervisor. It owns the process's runtime state exclusively and is
//! only ever driven from the single control thread.
//!
//! ## State machine
//! ```text
//! NotStarted ──start()──► Starting ──poll alive──► Running
//!                             │                       │
//!                             │ poll dead             │ poll dead, no stop requested
//!                             ▼                       ▼
//!                          Crashed ◄──────────────  Crashed
//!                                                     │
//! Running|Starting ──stop()──► Stopping ──exit──► Stopped
//!                                  │ timeout
//!                                  └─► force kill ─► Stopped
//! Stopped|Crashed ──start()──► Starting            (restart)
//! ```
//!
//! ## Rules
//! - `handle` is present iff state ∈ {Starting, Running, Stopping}.
//! - A failed launch leaves the controller `Stopped` with the failure
//!   recorded; the loop retries next tick while the process is desired.
//! - Every crash arms a restart gate from the back-off policy; the loop
//!   checks [`ProcessController::ready_to_restart`] before restarting.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ProcessError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffPolicy;
use crate::procs::handle::{ExitInfo, ProcessHandle};
use crate::procs::launcher::Launch;
use crate::procs::spec::ProcessSpec;
use crate::status::ProcessSnapshot;

/// Lifecycle state of one managed process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcState {
    NotStarted,
    Starting,
    Running,
    Stopping,
    Stopped,
    Crashed,
}

impl ProcState {
    /// Snake_case label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcState::NotStarted => "not_started",
            ProcState::Starting => "starting",
            ProcState::Running => "running",
            ProcState::Stopping => "stopping",
            ProcState::Stopped => "stopped",
            ProcState::Crashed => "crashed",
        }
    }
}

/// Owns start/stop/liveness operations and the runtime state for one spec.
pub struct ProcessController {
    spec: ProcessSpec,
    launcher: Arc<dyn Launch>,
    bus: Bus,
    backoff: BackoffPolicy,

    state: ProcState,
    handle: Option<Box<dyn ProcessHandle>>,
    started_at: Option<Instant>,
    last_exit: Option<ExitInfo>,
    prepared: bool,
    crash_count: u32,
    restart_not_before: Option<Instant>,
}

impl ProcessController {
    /// Creates a controller in `NotStarted`.
    pub fn new(
        spec: ProcessSpec,
        launcher: Arc<dyn Launch>,
        bus: Bus,
        backoff: BackoffPolicy,
    ) -> Self {
        Self {
            spec,
            launcher,
            bus,
            backoff,
            state: ProcState::NotStarted,
            handle: None,
            started_at: None,
            last_exit: None,
            prepared: false,
            crash_count: 0,
            restart_not_before: None,
        }
    }

    /// Process name from the spec.
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// The immutable spec.
    pub fn spec(&self) -> &ProcessSpec {
        &self.spec
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProcState {
        self.state
    }

    /// Exit info recorded on the last transition into `Stopped`/`Crashed`.
    pub fn last_exit(&self) -> Option<&ExitInfo> {
        self.last_exit.as_ref()
    }

    /// Timestamp of the last transition into `Starting`.
    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    /// Idempotent pre-launch step; run once per spec before the loop starts.
    pub async fn prepare(&mut self) -> Result<(), ProcessError> {
        if self.prepared {
            return Ok(());
        }
        self.launcher.prepare(self.spec.launch()).await?;
        self.prepared = true;
        Ok(())
    }

    /// Launches the process and transitions to `Starting`.
    ///
    /// Fails with [`ProcessError::AlreadyRunning`] when `Starting`/`Running`.
    /// A launch failure leaves the controller `Stopped` with the failure
    /// recorded as exit info and is retried on the next tick while desired.
    pub async fn start(&mut self) -> Result<(), ProcessError> {
        match self.state {
            ProcState::Starting | ProcState::Running => {
                return Err(ProcessError::AlreadyRunning {
                    name: self.spec.name().to_string(),
                })
            }
            _ => {}
        }

        match self.launcher.launch(self.spec.name(), self.spec.launch()).await {
            Ok(handle) => {
                let mut ev = Event::now(EventKind::ProcessStarting).with_process(self.spec.name());
                if let Some(pid) = handle.pid() {
                    ev = ev.with_pid(pid);
                }
                self.bus.publish(ev);

                self.handle = Some(handle);
                self.state = ProcState::Starting;
                self.started_at = Some(Instant::now());
                Ok(())
            }
            Err(e) => {
                self.state = ProcState::Stopped;
                self.last_exit = Some(ExitInfo::LaunchFailed(e.to_string()));
                self.bus.publish(
                    Event::now(EventKind::SpawnFailed)
                        .with_process(self.spec.name())
                        .with_reason(e.to_string()),
                );
                Err(e)
            }
        }
    }

    /// Non-blocking liveness check.
    ///
    /// Confirms `Starting → Running` once the handle reports alive; detects
    /// unrequested death (`Starting`/`Running → Crashed`), records the exit
    /// info, and arms the restart back-off gate. Side-effect-free in every
    /// other state.
    pub fn poll_liveness(&mut self) {
        if !matches!(self.state, ProcState::Starting | ProcState::Running) {
            return;
        }
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        match handle.poll_exit() {
            None => {
                if self.state == ProcState::Starting {
                    self.state = ProcState::Running;
                    let mut ev =
                        Event::now(EventKind::ProcessStarted).with_process(self.spec.name());
                    if let Some(pid) = handle.pid() {
                        ev = ev.with_pid(pid);
                    }
                    self.bus.publish(ev);
                }
            }
            Some(info) => {
                self.handle = None;
                self.state = ProcState::Crashed;
                self.crash_count += 1;
                self.last_exit = Some(info.clone());

                let delay = self.backoff.next(self.crash_count - 1);
                self.restart_not_before = Some(Instant::now() + delay);

                warn!(process = %self.spec.name(), exit = %info, "process crashed");
                self.bus.publish(
                    Event::now(EventKind::ProcessCrashed)
                        .with_process(self.spec.name())
                        .with_reason(info.to_string()),
                );
                self.bus.publish(
                    Event::now(EventKind::RestartScheduled)
                        .with_process(self.spec.name())
                        .with_delay(delay),
                );
            }
        }
    }

    /// Whether the crash-restart back-off gate has elapsed.
    pub fn ready_to_restart(&self) -> bool {
        self.restart_not_before
            .is_none_or(|t| Instant::now() >= t)
    }

    /// Signals graceful termination without waiting and moves to `Stopping`.
    ///
    /// Used by teardown to fan the termination requests out before waiting
    /// on each process in turn.
    pub fn begin_stop(&mut self) {
        if !matches!(self.state, ProcState::Starting | ProcState::Running) {
            return;
        }
        if let Some(handle) = self.handle.as_mut() {
            handle.terminate();
        }
        self.state = ProcState::Stopping;
    }

    /// Stops the process, always ending in `Stopped`.
    ///
    /// No-op when `NotStarted`/`Stopped`/`Crashed`. With `graceful`, waits up
    /// to `timeout` for a voluntary exit before escalating to a forced kill;
    /// without, escalates immediately. Never blocks beyond
    /// `timeout + force_grace`.
    pub async fn stop(&mut self, graceful: bool, timeout: Duration, force_grace: Duration) {
        match self.state {
            ProcState::NotStarted | ProcState::Stopped | ProcState::Crashed => return,
            ProcState::Starting | ProcState::Running => {
                if graceful {
                    self.begin_stop();
                } else {
                    self.state = ProcState::Stopping;
                }
            }
            ProcState::Stopping => {}
        }
        self.finish_stop(if graceful { timeout } else { Duration::ZERO }, force_grace)
            .await;
    }

    /// Completes an in-flight stop: waits out the graceful window, escalates
    /// to kill, and finalizes the `Stopped` transition.
    pub async fn finish_stop(&mut self, timeout: Duration, force_grace: Duration) {
        if self.state != ProcState::Stopping {
            return;
        }

        let info = match self.handle.as_mut() {
            Some(handle) => {
                let mut info = if timeout > Duration::ZERO {
                    handle.wait(timeout).await
                } else {
                    handle.poll_exit()
                };
                if info.is_none() {
                    debug!(process = %self.spec.name(), "graceful window elapsed, killing");
                    handle.kill();
                    info = handle.wait(force_grace).await;
                }
                info.unwrap_or(ExitInfo::Unknown)
            }
            None => ExitInfo::Unknown,
        };

        self.handle = None;
        self.state = ProcState::Stopped;
        self.last_exit = Some(info.clone());
        self.crash_count = 0;
        self.restart_not_before = None;

        self.bus.publish(
            Event::now(EventKind::ProcessStopped)
                .with_process(self.spec.name())
                .with_reason(info.to_string()),
        );
    }

    /// Last-resort synchronous kill used when the teardown grace is
    /// exhausted mid-stop. Leaves the controller `Stopped`.
    pub fn force_kill(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            handle.kill();
        }
        if !matches!(self.state, ProcState::NotStarted | ProcState::Crashed) {
            self.state = ProcState::Stopped;
        }
        self.handle = None;
    }

    /// Point-in-time view without mutation.
    pub fn snapshot(&self) -> ProcessSnapshot {
        ProcessSnapshot {
            name: self.spec.name().to_string(),
            state: self.state,
            pid: self.handle.as_ref().and_then(|h| h.pid()),
        }
    }
}
