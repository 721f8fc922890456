//! # Lifecycle events emitted by the manager loop and process controllers.
//!
//! [`EventKind`] classifies event types across three categories:
//! - **Process lifecycle**: starting, started, stopped, crashed, spawn
//!   failure, restart scheduling
//! - **Vehicle-state transitions**: onroad/offroad edges
//! - **Runtime**: shutdown request, teardown completion, grace overrun
//!
//! ## Ordering
//! Every event carries a globally monotonic sequence number (`seq`); use it
//! to restore ordering when events are consumed out of band.

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Process lifecycle ===
    /// A start was issued; the process is now `Starting`.
    ///
    /// Sets: `process`, `pid`, `at`, `seq`.
    ProcessStarting,

    /// A liveness poll confirmed the process alive; it is now `Running`.
    ///
    /// Sets: `process`, `pid`, `at`, `seq`.
    ProcessStarted,

    /// The process reached `Stopped` after a requested stop.
    ///
    /// Sets: `process`, `reason` (exit info), `at`, `seq`.
    ProcessStopped,

    /// A liveness poll found the process dead without a stop request.
    ///
    /// Sets: `process`, `reason` (exit info), `at`, `seq`.
    ProcessCrashed,

    /// The OS launch primitive failed; the controller stays `Stopped`.
    ///
    /// Sets: `process`, `reason`, `at`, `seq`.
    SpawnFailed,

    /// A crash restart was gated behind a back-off delay.
    ///
    /// Sets: `process`, `delay_ms`, `at`, `seq`.
    RestartScheduled,

    // === Vehicle-state transitions ===
    /// Off-road → on-road edge observed; onroad-transition keys cleared.
    ///
    /// Sets: `at`, `seq`.
    OnroadTransition,

    /// On-road → off-road edge observed; offroad-transition keys cleared.
    ///
    /// Sets: `at`, `seq`.
    OffroadTransition,

    // === Runtime ===
    /// A shutdown trigger or OS signal ended the loop.
    ///
    /// Sets: `reason` (trigger name), `at`, `seq`.
    ShutdownRequested,

    /// All processes stopped within the teardown grace window.
    ///
    /// Sets: `at`, `seq`.
    TeardownComplete,

    /// Teardown grace exceeded; some processes remained alive.
    ///
    /// Sets: `reason` (stuck names), `at`, `seq`.
    GraceExceeded,

    /// An unhandled condition inside one tick; an orderly teardown follows.
    ///
    /// Sets: `reason`, `at`, `seq`.
    LoopFailed,
}

/// Supervisor event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the managed process, if applicable.
    pub process: Option<Arc<str>>,
    /// OS pid, if applicable.
    pub pid: Option<u32>,
    /// Human-readable reason (exit info, trigger name, error).
    pub reason: Option<Arc<str>>,
    /// Back-off delay before the next restart attempt, in milliseconds.
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with the current timestamp and
    /// the next global sequence number.
    pub fn now(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            process: None,
            pid: None,
            reason: None,
            delay_ms: None,
        }
    }

    /// Attaches a managed-process name.
    #[inline]
    pub fn with_process(mut self, name: impl Into<Arc<str>>) -> Self {
        self.process = Some(name.into());
        self
    }

    /// Attaches an OS pid.
    #[inline]
    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = Some(pid);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a restart delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seq_is_monotonic() {
        let a = Event::now(EventKind::ProcessStarting);
        let b = Event::now(EventKind::ProcessStarted);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn builders_set_fields() {
        let ev = Event::now(EventKind::ProcessCrashed)
            .with_process("controlsd")
            .with_pid(42)
            .with_reason("exit code 1")
            .with_delay(Duration::from_millis(250));
        assert_eq!(ev.process.as_deref(), Some("controlsd"));
        assert_eq!(ev.pid, Some(42));
        assert_eq!(ev.reason.as_deref(), Some("exit code 1"));
        assert_eq!(ev.delay_ms, Some(250));
    }
}
