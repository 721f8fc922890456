//! Error types used by the supervisor runtime and process controllers.
//!
//! Two enums mirror the two failure layers:
//!
//! - [`ManagerError`] — errors raised by the supervision runtime itself
//!   (registration, store access, teardown overruns, configuration).
//! - [`ProcessError`] — errors raised while operating a single managed
//!   process.
//!
//! Both provide `as_label()` for stable snake_case identifiers in
//! logs/telemetry.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the supervision runtime.
///
/// A `ManagerError` outside of [`ManagerError::TeardownGraceExceeded`] is
/// fatal: the supervisor surfaces it to the operator and exits non-zero.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ManagerError {
    /// No device identity could be obtained at startup.
    #[error("registration failed for device serial {serial:?}")]
    Registration {
        /// Hardware serial read from the store, if any.
        serial: Option<String>,
    },

    /// The lifecycle store could not be read or written during init.
    #[error("param store failure: {reason}")]
    Store { reason: String },

    /// A process spec references a predicate key that is not registered.
    ///
    /// Detected by `validate_specs` before the loop starts; never raised at
    /// resolve time.
    #[error("process {process:?} references unknown predicate {key:?}")]
    UnknownPredicate { process: String, key: &'static str },

    /// A pre-launch prepare step failed during initialization.
    #[error("prepare failed for {process:?}: {reason}")]
    Prepare { process: String, reason: String },

    /// Teardown exceeded its grace window; some processes had to be left to
    /// the OS.
    #[error("teardown grace {grace:?} exceeded; still alive: {stuck:?}")]
    TeardownGraceExceeded { grace: Duration, stuck: Vec<String> },
}

impl ManagerError {
    /// Returns a short stable label (snake_case) for logs/telemetry.
    pub fn as_label(&self) -> &'static str {
        match self {
            ManagerError::Registration { .. } => "manager_registration_failed",
            ManagerError::Store { .. } => "manager_store_failure",
            ManagerError::UnknownPredicate { .. } => "manager_unknown_predicate",
            ManagerError::Prepare { .. } => "manager_prepare_failed",
            ManagerError::TeardownGraceExceeded { .. } => "manager_teardown_grace_exceeded",
        }
    }
}

/// Errors produced while operating one managed process.
///
/// These never propagate past the reconciliation loop: a per-process failure
/// is recorded on that controller and retried per policy.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProcessError {
    /// `start()` was called while the process is already Starting or Running.
    #[error("process {name:?} is already running")]
    AlreadyRunning { name: String },

    /// The OS launch primitive failed; the controller stays `Stopped` and the
    /// start is retried on the next tick while desired.
    #[error("failed to spawn {name:?}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A termination signal could not be delivered.
    #[error("failed to signal {name:?}: {reason}")]
    Signal { name: String, reason: String },
}

impl ProcessError {
    /// Returns a short stable label (snake_case) for logs/telemetry.
    pub fn as_label(&self) -> &'static str {
        match self {
            ProcessError::AlreadyRunning { .. } => "process_already_running",
            ProcessError::Spawn { .. } => "process_spawn_failed",
            ProcessError::Signal { .. } => "process_signal_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        let err = ManagerError::Registration { serial: None };
        assert_eq!(err.as_label(), "manager_registration_failed");

        let err = ProcessError::AlreadyRunning {
            name: "controlsd".into(),
        };
        assert_eq!(err.as_label(), "process_already_running");
    }
}
