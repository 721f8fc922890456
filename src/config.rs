//! # Global supervisor configuration.
//!
//! Provides [`ManagerConfig`], the centralized settings for the
//! reconciliation loop, process stops, and teardown.
//!
//! ## Field semantics
//! - `tick_interval`: cadence of the reconciliation loop
//! - `stop_timeout`: graceful-stop window per process (`T_default`)
//! - `force_kill_grace`: extra bounded wait after escalating to kill
//! - `teardown_grace`: overall budget for final teardown of all processes
//! - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
//! - `restart_backoff`: minimum delay policy between crash restarts

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Global configuration for the supervisor runtime.
///
/// All fields are public for flexibility; every wait derived from this
/// config is bounded — there is no sentinel meaning "wait forever".
#[derive(Clone, Debug)]
pub struct ManagerConfig {
    /// Reconciliation loop cadence.
    pub tick_interval: Duration,

    /// Graceful-stop window for one process.
    ///
    /// `stop(graceful=true)` waits up to this long for a voluntary exit
    /// before escalating to a forced kill.
    pub stop_timeout: Duration,

    /// Bounded wait after a forced kill before the controller gives up
    /// reaping the child and records it as stopped anyway.
    pub force_kill_grace: Duration,

    /// Overall budget for stopping every process at final teardown,
    /// unkillable processes included.
    pub teardown_grace: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events
    /// observe `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Minimum-delay policy between consecutive restart attempts of the
    /// same crashed process.
    pub restart_backoff: BackoffPolicy,

    /// Whether this is a release build.
    ///
    /// Development-only store keys are cleared at init only when true.
    pub is_release: bool,

    /// Whether startup may proceed without a registered device identity.
    ///
    /// When true, a missing identity is replaced by
    /// [`UNREGISTERED_DONGLE_ID`](crate::core::registration::UNREGISTERED_DONGLE_ID)
    /// and identity-dependent processes are excluded from the desired set.
    pub allow_unregistered: bool,
}

impl Default for ManagerConfig {
    /// Default configuration:
    ///
    /// - `tick_interval = 500ms` (device-state sample cadence)
    /// - `stop_timeout = 5s` (graceful window per process)
    /// - `force_kill_grace = 2s`
    /// - `teardown_grace = 15s`
    /// - `bus_capacity = 1024`
    /// - `restart_backoff = BackoffPolicy::default()` (100ms doubling to 30s)
    /// - `is_release` derived from the build profile
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
            stop_timeout: Duration::from_secs(5),
            force_kill_grace: Duration::from_secs(2),
            teardown_grace: Duration::from_secs(15),
            bus_capacity: 1024,
            restart_backoff: BackoffPolicy::default(),
            is_release: !cfg!(debug_assertions),
            allow_unregistered: false,
        }
    }
}

impl ManagerConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Upper bound on how long one `stop(graceful=true)` may block the tick.
    #[inline]
    pub fn stop_bound(&self) -> Duration {
        self.stop_timeout + self.force_kill_grace
    }
}
