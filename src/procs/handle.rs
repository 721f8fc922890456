//! # OS process handle abstraction.
//!
//! [`ProcessHandle`] is the capability the lifecycle controller is
//! polymorphic over: liveness check, graceful termination request, forced
//! kill, and a bounded wait. [`NativeHandle`] implements it over
//! [`tokio::process::Child`]; tests substitute scripted fakes.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Child;
use tracing::{debug, warn};

/// How a process ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExitInfo {
    /// Exited with the given code.
    Code(i32),
    /// Terminated by the given signal number.
    Signal(i32),
    /// The launch itself failed; the reason is the spawn error.
    LaunchFailed(String),
    /// Exit observed but no status could be recovered.
    Unknown,
}

impl ExitInfo {
    pub(crate) fn from_status(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitInfo::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(sig) = status.signal() {
                return ExitInfo::Signal(sig);
            }
        }
        ExitInfo::Unknown
    }

    /// Whether this records a clean zero exit.
    pub fn is_clean(&self) -> bool {
        matches!(self, ExitInfo::Code(0))
    }
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitInfo::Code(code) => write!(f, "exit code {code}"),
            ExitInfo::Signal(sig) => write!(f, "signal {sig}"),
            ExitInfo::LaunchFailed(reason) => write!(f, "launch failed: {reason}"),
            ExitInfo::Unknown => write!(f, "unknown exit"),
        }
    }
}

/// Capability surface of a launched OS process.
///
/// All operations are non-blocking except [`ProcessHandle::wait`], which is
/// bounded by its timeout argument.
#[async_trait]
pub trait ProcessHandle: Send {
    /// OS pid, if one was assigned.
    fn pid(&self) -> Option<u32>;

    /// Non-blocking exit check: `None` while the process is alive, the exit
    /// info once it has ended. Repeated calls after exit return the same
    /// value.
    fn poll_exit(&mut self) -> Option<ExitInfo>;

    /// Requests graceful termination. Delivery failure is reported, not
    /// escalated here; the caller escalates to [`ProcessHandle::kill`].
    fn terminate(&mut self);

    /// Forcibly kills the process.
    fn kill(&mut self);

    /// Waits up to `timeout` for the process to end. Returns `None` if it is
    /// still alive when the timeout elapses.
    async fn wait(&mut self, timeout: Duration) -> Option<ExitInfo>;
}

/// Native child process spawned by
/// [`NativeLauncher`](crate::procs::NativeLauncher).
pub struct NativeHandle {
    child: Child,
    pid: Option<u32>,
    exited: Option<ExitInfo>,
}

impl NativeHandle {
    pub(crate) fn new(child: Child) -> Self {
        let pid = child.id();
        Self {
            child,
            pid,
            exited: None,
        }
    }
}

#[async_trait]
impl ProcessHandle for NativeHandle {
    fn pid(&self) -> Option<u32> {
        self.pid
    }

    fn poll_exit(&mut self) -> Option<ExitInfo> {
        if self.exited.is_some() {
            return self.exited.clone();
        }
        match self.child.try_wait() {
            Ok(Some(status)) => {
                self.exited = Some(ExitInfo::from_status(status));
                self.exited.clone()
            }
            Ok(None) => None,
            Err(e) => {
                warn!(pid = ?self.pid, error = %e, "liveness check failed");
                self.exited = Some(ExitInfo::Unknown);
                self.exited.clone()
            }
        }
    }

    #[cfg(unix)]
    fn terminate(&mut self) {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;

        let Some(pid) = self.pid else { return };
        match kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            Ok(()) => debug!(pid = %pid, "sent SIGTERM"),
            // ESRCH means the process already exited; the next poll picks
            // the status up.
            Err(nix::errno::Errno::ESRCH) => {}
            Err(e) => warn!(pid = %pid, error = %e, "failed to send SIGTERM"),
        }
    }

    #[cfg(not(unix))]
    fn terminate(&mut self) {
        let _ = self.child.start_kill();
    }

    fn kill(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!(pid = ?self.pid, error = %e, "failed to kill process");
        }
    }

    async fn wait(&mut self, timeout: Duration) -> Option<ExitInfo> {
        if self.exited.is_some() {
            return self.exited.clone();
        }
        match tokio::time::timeout(timeout, self.child.wait()).await {
            Ok(Ok(status)) => {
                self.exited = Some(ExitInfo::from_status(status));
                self.exited.clone()
            }
            Ok(Err(e)) => {
                warn!(pid = ?self.pid, error = %e, "wait failed");
                self.exited = Some(ExitInfo::Unknown);
                self.exited.clone()
            }
            Err(_elapsed) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_info_display() {
        assert_eq!(ExitInfo::Code(0).to_string(), "exit code 0");
        assert_eq!(ExitInfo::Signal(9).to_string(), "signal 9");
        assert!(ExitInfo::Code(0).is_clean());
        assert!(!ExitInfo::Code(1).is_clean());
        assert!(!ExitInfo::Unknown.is_clean());
    }
}
