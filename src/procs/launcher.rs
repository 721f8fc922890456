//! # Process launch primitive.
//!
//! [`Launch`] is the seam between the lifecycle controller and the concrete
//! mechanism for bringing a [`LaunchTarget`] to life. [`NativeLauncher`]
//! spawns real OS processes via [`tokio::process::Command`]; tests provide
//! scripted implementations.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::ProcessError;
use crate::procs::handle::{NativeHandle, ProcessHandle};
use crate::procs::spec::LaunchTarget;

/// Launch-primitive boundary.
#[async_trait]
pub trait Launch: Send + Sync {
    /// Idempotent pre-launch step (resource import, compilation). Performed
    /// once per spec before the supervisor enters its loop, regardless of
    /// eligibility, so the first activation is fast. No effect on process
    /// state.
    async fn prepare(&self, _target: &LaunchTarget) -> Result<(), ProcessError> {
        Ok(())
    }

    /// Launches the target and returns its handle. Returns once the launch
    /// is issued; it does not wait for the child to come up.
    async fn launch(
        &self,
        name: &str,
        target: &LaunchTarget,
    ) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

/// Spawns native binaries.
#[derive(Default)]
pub struct NativeLauncher;

impl NativeLauncher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Launch for NativeLauncher {
    async fn launch(
        &self,
        name: &str,
        target: &LaunchTarget,
    ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        debug!(process = %name, command = %target.command, args = ?target.args, "spawning");

        let mut cmd = Command::new(&target.command);
        cmd.args(&target.args);
        if let Some(ref dir) = target.cwd {
            cmd.current_dir(dir);
        }
        for (key, value) in &target.env {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());
        // If the supervisor itself dies with handles still held, the
        // children must not be orphaned.
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            name: name.to_string(),
            source,
        })?;

        let handle = NativeHandle::new(child);
        info!(process = %name, pid = ?handle.pid(), "process spawned");
        Ok(Box::new(handle))
    }
}
