//! # Process specifications.
//!
//! [`ProcessSpec`] bundles everything the supervisor needs to know about one
//! manageable process: what to execute ([`LaunchTarget`]), when it is
//! allowed to run ([`Eligibility`]), and its stop/restart flags.
//!
//! Specs are immutable: the table is built once at startup and shared by
//! reference with the resolver and the loop.

use std::path::PathBuf;

/// When a process is allowed to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Eligibility {
    /// Runs whenever not ignored.
    Always,
    /// Runs only while the vehicle is on-road.
    OnRoadOnly,
    /// Runs only while the vehicle is off-road.
    OffRoadOnly,
    /// Runs iff the named predicate evaluates true against the current
    /// context. The key must exist in [`predicates`](crate::procs::predicates);
    /// this is validated at startup.
    Conditional(&'static str),
}

/// Opaque descriptor of what to execute.
///
/// Only the launch primitive interprets this; the loop and resolver never
/// look inside.
#[derive(Clone, Debug)]
pub struct LaunchTarget {
    /// Executable path or name.
    pub command: String,
    /// Arguments passed verbatim.
    pub args: Vec<String>,
    /// Optional working directory.
    pub cwd: Option<PathBuf>,
    /// Extra environment variables.
    pub env: Vec<(String, String)>,
}

impl LaunchTarget {
    /// Creates a target executing `command` with no arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the working directory.
    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Adds an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Immutable metadata for one manageable process.
#[derive(Clone, Debug)]
pub struct ProcessSpec {
    name: String,
    launch: LaunchTarget,
    eligibility: Eligibility,
    unkillable: bool,
    persistent: bool,
}

impl ProcessSpec {
    /// Creates a spec with default flags: always eligible, killable,
    /// non-persistent.
    pub fn new(name: impl Into<String>, launch: LaunchTarget) -> Self {
        Self {
            name: name.into(),
            launch,
            eligibility: Eligibility::Always,
            unkillable: false,
            persistent: false,
        }
    }

    /// Sets the eligibility rule.
    pub fn with_eligibility(mut self, eligibility: Eligibility) -> Self {
        self.eligibility = eligibility;
        self
    }

    /// Marks the process as never stopped outside final teardown.
    pub fn unkillable(mut self) -> Self {
        self.unkillable = true;
        self
    }

    /// Marks the process for unconditional restart on crash, independent of
    /// desired-set membership.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Unique process name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// What to execute.
    pub fn launch(&self) -> &LaunchTarget {
        &self.launch
    }

    /// When the process may run.
    pub fn eligibility(&self) -> Eligibility {
        self.eligibility
    }

    /// Whether the loop may stop this process outside teardown.
    pub fn is_unkillable(&self) -> bool {
        self.unkillable
    }

    /// Whether a crash restarts regardless of the desired set.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_flags() {
        let spec = ProcessSpec::new("pandad", LaunchTarget::new("./pandad"))
            .unkillable()
            .persistent();
        assert_eq!(spec.name(), "pandad");
        assert!(spec.is_unkillable());
        assert!(spec.is_persistent());
        assert_eq!(spec.eligibility(), Eligibility::Always);
    }

    #[test]
    fn launch_target_builder() {
        let target = LaunchTarget::new("./loggerd")
            .arg("--segment-size")
            .arg("60")
            .env("LOG_ROOT", "/data/media");
        assert_eq!(target.args, vec!["--segment-size", "60"]);
        assert_eq!(target.env.len(), 1);
    }
}
