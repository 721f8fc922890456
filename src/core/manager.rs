//! # Manager: the reconciliation loop.
//!
//! [`Manager`] owns one [`ProcessController`] per spec, the event and status
//! buses, and the device-state feed. It converges actual process state onto
//! the resolver's desired set once per tick and tears everything down in
//! bounded time when a shutdown trigger fires.
//!
//! ## Tick anatomy
//! ```text
//! sample feed (non-blocking, last value retained)
//!   └─► on-road edge?  clear tagged store keys, persist IsOnroad/IsOffroad
//! resolve(specs, ctx)  ──► desired set (registry order)
//! reconcile:
//!   poll_liveness on every active controller
//!   stops first  (leaving desired, killable only, graceful + bounded)
//!   starts second (entering desired, plus crashed persistent, back-off gated)
//! publish ManagerState snapshot
//! poll shutdown flags ──► record exit reason, break, teardown
//! ```
//!
//! ## Rules
//! - One cooperative control thread; every wait is bounded.
//! - A single process failing never takes the loop down: per-process errors
//!   are recorded on that controller and retried per policy.
//! - Stops are issued before starts within a tick, in registry order.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ManagerConfig;
use crate::core::registration;
use crate::error::ManagerError;
use crate::events::{Bus, Event, EventKind};
use crate::procs::{validate_specs, Launch, ProcState, ProcessController, ProcessSpec};
use crate::resolver::{self, ResolveCtx};
use crate::status::{DeviceFeed, ManagerState, StatusBus};
use crate::store::{self, ParamKeyType, ParamStore, SHUTDOWN_FLAGS};

/// Operator action selected by the recorded shutdown trigger.
///
/// Hardware actuation is a collaborator concern; the supervisor only
/// reports which action the trigger asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitAction {
    /// Exit only (signal-driven or configuration reset).
    None,
    Shutdown,
    Reboot,
    Uninstall,
}

/// Result of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Keep ticking.
    Continue,
    /// A shutdown trigger fired; the flag name is recorded as exit reason.
    Shutdown(String),
}

/// Prefix of operator-adjustable keys removed by the ResetConfig trigger.
const USER_CONFIG_PREFIX: &str = "User";

/// Top-level supervisor for the managed-process set.
pub struct Manager {
    cfg: ManagerConfig,
    store: Arc<dyn ParamStore>,
    bus: Bus,
    status: StatusBus,
    feed: DeviceFeed,
    controllers: Vec<ProcessController>,
    ignore: HashSet<String>,
    prev_onroad: bool,
}

impl Manager {
    /// Builds a manager over the given spec table.
    ///
    /// Validates every `Conditional` eligibility against the predicate
    /// registry; an unknown key is a startup configuration error.
    pub fn new(
        cfg: ManagerConfig,
        specs: Vec<ProcessSpec>,
        store: Arc<dyn ParamStore>,
        launcher: Arc<dyn Launch>,
        feed: DeviceFeed,
    ) -> Result<Self, ManagerError> {
        validate_specs(&specs)?;

        let bus = Bus::new(cfg.bus_capacity_clamped());
        let status = StatusBus::new(cfg.bus_capacity_clamped());
        let controllers = specs
            .into_iter()
            .map(|spec| {
                ProcessController::new(spec, launcher.clone(), bus.clone(), cfg.restart_backoff)
            })
            .collect();

        Ok(Self {
            cfg,
            store,
            bus,
            status,
            feed,
            controllers,
            ignore: HashSet::new(),
            prev_onroad: false,
        })
    }

    /// Event bus shared with all controllers.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Outbound status channel.
    pub fn status_bus(&self) -> &StatusBus {
        &self.status
    }

    /// Initializes store state, obtains a device identity, fixes the ignore
    /// set, and runs every spec's prepare step. Must complete before
    /// [`Manager::run`].
    ///
    /// Returns the device identity. A missing identity (without the
    /// unregistered fallback) or a failed prepare is fatal.
    pub async fn init(&mut self, block: &[String], no_board: bool) -> Result<String, ManagerError> {
        self.store.clear_all(ParamKeyType::ClearOnManagerStart);
        self.store.clear_all(ParamKeyType::ClearOnOnroadTransition);
        self.store.clear_all(ParamKeyType::ClearOnOffroadTransition);
        if self.cfg.is_release {
            self.store.clear_all(ParamKeyType::DevelopmentOnly);
        }

        store::write_default_params(self.store.as_ref());
        self.store.put("Version", env!("CARGO_PKG_VERSION"));

        let dongle_id = registration::register(self.store.as_ref(), self.cfg.allow_unregistered)?;
        info!(dongle_id = %dongle_id, "device registered");

        self.ignore = resolver::build_ignore_set(self.store.as_ref(), block, no_board);
        debug!(ignore = ?self.ignore, "ignore set fixed");

        // The device boots off-road.
        store::write_onroad_params(false, self.store.as_ref());
        self.prev_onroad = false;

        // Amortize launch preparation for every spec, eligible or not, so
        // the first activation is fast.
        for controller in &mut self.controllers {
            controller
                .prepare()
                .await
                .map_err(|e| ManagerError::Prepare {
                    process: controller.name().to_string(),
                    reason: e.to_string(),
                })?;
        }

        Ok(dongle_id)
    }

    /// Runs the loop until a shutdown trigger fires, the token is cancelled,
    /// or a tick fails; always follows with an orderly bounded teardown.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<ExitAction, ManagerError> {
        let mut ticker = time::interval(self.cfg.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let action = loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("termination signal, shutting down");
                    self.bus
                        .publish(Event::now(EventKind::ShutdownRequested).with_reason("signal"));
                    break ExitAction::None;
                }
                _ = ticker.tick() => {
                    match self.tick().await {
                        Ok(TickOutcome::Continue) => {}
                        Ok(TickOutcome::Shutdown(flag)) => break exit_action(&flag),
                        Err(e) => {
                            // A loop-level failure must not orphan the
                            // managed set: report, then tear down.
                            error!(label = e.as_label(), error = %e, "tick failed");
                            self.bus.publish(
                                Event::now(EventKind::LoopFailed).with_reason(e.to_string()),
                            );
                            break ExitAction::None;
                        }
                    }
                }
            }
        };

        if let Err(e) = self.teardown().await {
            warn!(label = e.as_label(), error = %e, "teardown incomplete");
        }
        Ok(action)
    }

    /// One reconciliation pass. Public so embedders and tests can drive the
    /// loop deterministically.
    pub async fn tick(&mut self) -> Result<TickOutcome, ManagerError> {
        let device = self.feed.sample();
        self.handle_onroad_edge(device.started);

        let ctx = ResolveCtx {
            onroad: device.started,
            ignore: self.ignore.clone(),
            car_params: device.car_params,
        };
        let desired = resolver::resolve(self.controllers.iter().map(|c| c.spec()), &ctx);
        self.reconcile(&desired).await;

        self.status.publish(self.snapshot());

        if let Some(flag) = self.poll_shutdown_flags() {
            return Ok(TickOutcome::Shutdown(flag));
        }
        Ok(TickOutcome::Continue)
    }

    /// Point-in-time snapshot of all controllers, in registry order.
    pub fn snapshot(&self) -> ManagerState {
        ManagerState {
            processes: self.controllers.iter().map(|c| c.snapshot()).collect(),
        }
    }

    /// Detects the on-road edge, clears the tagged store categories, and
    /// persists the flag pair. Fires exactly once per actual transition.
    fn handle_onroad_edge(&mut self, onroad: bool) {
        if onroad == self.prev_onroad {
            return;
        }
        if onroad {
            info!("onroad transition");
            self.store.clear_all(ParamKeyType::ClearOnOnroadTransition);
            self.bus.publish(Event::now(EventKind::OnroadTransition));
        } else {
            info!("offroad transition");
            self.store.clear_all(ParamKeyType::ClearOnOffroadTransition);
            self.bus.publish(Event::now(EventKind::OffroadTransition));
        }
        store::write_onroad_params(onroad, self.store.as_ref());
        self.prev_onroad = onroad;
    }

    /// Converges controller states onto the desired set.
    ///
    /// Stops are issued before starts so a leaving process releases its
    /// resources before a logically related one takes them; both walk in
    /// registry order.
    async fn reconcile(&mut self, desired: &[String]) {
        let desired: HashSet<&str> = desired.iter().map(String::as_str).collect();

        for controller in &mut self.controllers {
            controller.poll_liveness();
        }

        for controller in &mut self.controllers {
            let wanted = desired.contains(controller.name());
            if wanted
                || controller.spec().is_unkillable()
                || !matches!(
                    controller.state(),
                    ProcState::Starting | ProcState::Running
                )
            {
                continue;
            }
            controller
                .stop(true, self.cfg.stop_timeout, self.cfg.force_kill_grace)
                .await;
        }

        for controller in &mut self.controllers {
            let wanted = desired.contains(controller.name());
            let startable = match controller.state() {
                ProcState::NotStarted | ProcState::Stopped => wanted,
                // A crashed persistent process restarts even when no longer
                // in the desired set.
                ProcState::Crashed => wanted || controller.spec().is_persistent(),
                _ => false,
            };
            if !startable {
                continue;
            }
            if controller.state() == ProcState::Crashed && !controller.ready_to_restart() {
                continue;
            }
            if let Err(e) = controller.start().await {
                warn!(process = %controller.name(), label = e.as_label(), error = %e, "start failed");
            }
        }
    }

    /// Polls the global shutdown triggers; records the exit reason for the
    /// first one found.
    fn poll_shutdown_flags(&self) -> Option<String> {
        for flag in SHUTDOWN_FLAGS {
            if !self.store.get_bool(flag) {
                continue;
            }
            if *flag == "ResetConfig" {
                self.reset_user_config();
            }
            let reason = format!("{flag} {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.6f"));
            self.store.put("LastManagerExitReason", &reason);
            warn!(flag = %flag, "shutting down manager");
            self.bus
                .publish(Event::now(EventKind::ShutdownRequested).with_reason(*flag));
            return Some(flag.to_string());
        }
        None
    }

    /// Removes operator-adjustable keys as part of a configuration reset.
    fn reset_user_config(&self) {
        for key in self.store.keys() {
            if key.starts_with(USER_CONFIG_PREFIX) {
                self.store.remove(&key);
            }
        }
    }

    /// Stops every process, unkillable included, within the teardown grace.
    ///
    /// Termination requests fan out first so graceful windows overlap; the
    /// per-process waits then run under one overall budget. On overrun,
    /// stragglers are force-killed and reported.
    pub async fn teardown(&mut self) -> Result<(), ManagerError> {
        for controller in &mut self.controllers {
            controller.begin_stop();
        }

        let stop_timeout = self.cfg.stop_timeout;
        let force_grace = self.cfg.force_kill_grace;
        let drain = async {
            for controller in &mut self.controllers {
                controller.finish_stop(stop_timeout, force_grace).await;
            }
        };

        let finished = time::timeout(self.cfg.teardown_grace, drain).await.is_ok();
        if finished {
            info!("everything is dead");
            self.bus.publish(Event::now(EventKind::TeardownComplete));
            return Ok(());
        }

        let stuck: Vec<String> = self
            .controllers
            .iter()
            .filter(|c| {
                matches!(
                    c.state(),
                    ProcState::Starting | ProcState::Running | ProcState::Stopping
                )
            })
            .map(|c| c.name().to_string())
            .collect();
        for controller in &mut self.controllers {
            controller.force_kill();
        }
        self.bus.publish(
            Event::now(EventKind::GraceExceeded).with_reason(stuck.join(",")),
        );
        Err(ManagerError::TeardownGraceExceeded {
            grace: self.cfg.teardown_grace,
            stuck,
        })
    }
}

/// Maps a trigger flag to the operator action it requests.
fn exit_action(flag: &str) -> ExitAction {
    match flag {
        "DoShutdown" => ExitAction::Shutdown,
        "DoReboot" => ExitAction::Reboot,
        "DoUninstall" => ExitAction::Uninstall,
        _ => ExitAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procs::{Eligibility, ExitInfo, LaunchTarget, ProcessHandle, ProcessSpec};
    use crate::status::DeviceState;
    use crate::store::MemParams;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    type DeathSwitch = Arc<Mutex<Option<ExitInfo>>>;

    struct FakeHandle {
        pid: u32,
        dead: DeathSwitch,
        honors_terminate: bool,
    }

    #[async_trait]
    impl ProcessHandle for FakeHandle {
        fn pid(&self) -> Option<u32> {
            Some(self.pid)
        }
        fn poll_exit(&mut self) -> Option<ExitInfo> {
            self.dead.lock().unwrap().clone()
        }
        fn terminate(&mut self) {
            if self.honors_terminate {
                *self.dead.lock().unwrap() = Some(ExitInfo::Code(0));
            }
        }
        fn kill(&mut self) {
            *self.dead.lock().unwrap() = Some(ExitInfo::Signal(9));
        }
        async fn wait(&mut self, timeout: Duration) -> Option<ExitInfo> {
            let deadline = Instant::now() + timeout;
            loop {
                if let Some(info) = self.dead.lock().unwrap().clone() {
                    return Some(info);
                }
                if Instant::now() >= deadline {
                    return None;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    }

    /// Tracks launches per process and exposes per-process death switches.
    #[derive(Default)]
    struct FakeLauncher {
        switches: Mutex<HashMap<String, DeathSwitch>>,
        launches: Mutex<HashMap<String, u32>>,
        stubborn: AtomicBool,
    }

    impl FakeLauncher {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn crash(&self, name: &str, info: ExitInfo) {
            if let Some(switch) = self.switches.lock().unwrap().get(name) {
                *switch.lock().unwrap() = Some(info);
            }
        }

        fn launch_count(&self, name: &str) -> u32 {
            self.launches.lock().unwrap().get(name).copied().unwrap_or(0)
        }
    }

    #[async_trait]
    impl Launch for FakeLauncher {
        async fn launch(
            &self,
            name: &str,
            _target: &LaunchTarget,
        ) -> Result<Box<dyn ProcessHandle>, crate::error::ProcessError> {
            *self.launches.lock().unwrap().entry(name.to_string()).or_insert(0) += 1;
            let dead: DeathSwitch = Arc::new(Mutex::new(None));
            self.switches
                .lock()
                .unwrap()
                .insert(name.to_string(), dead.clone());
            Ok(Box::new(FakeHandle {
                pid: 100,
                dead,
                honors_terminate: !self.stubborn.load(Ordering::SeqCst),
            }))
        }
    }

    struct Fixture {
        manager: Manager,
        launcher: Arc<FakeLauncher>,
        store: Arc<MemParams>,
        feed_tx: tokio::sync::watch::Sender<DeviceState>,
    }

    fn fixture(specs: Vec<ProcessSpec>) -> Fixture {
        let store = Arc::new(MemParams::new());
        store.put("DongleId", "1234567890abcdef");
        let launcher = FakeLauncher::new();
        let (feed_tx, feed) = DeviceFeed::channel();
        let mut cfg = ManagerConfig::default();
        cfg.stop_timeout = Duration::from_millis(200);
        cfg.force_kill_grace = Duration::from_millis(100);
        cfg.teardown_grace = Duration::from_secs(2);

        let manager = Manager::new(
            cfg,
            specs,
            store.clone(),
            launcher.clone(),
            feed,
        )
        .unwrap();

        Fixture {
            manager,
            launcher,
            store,
            feed_tx,
        }
    }

    fn ab_specs() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new("a", LaunchTarget::new("./a")),
            ProcessSpec::new("b", LaunchTarget::new("./b"))
                .with_eligibility(Eligibility::OnRoadOnly),
        ]
    }

    fn state_of(manager: &Manager, name: &str) -> ProcState {
        manager
            .snapshot()
            .processes
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.state)
            .unwrap()
    }

    fn set_onroad(fx: &Fixture, onroad: bool) {
        fx.feed_tx.send_replace(DeviceState {
            started: onroad,
            car_params: Default::default(),
        });
    }

    #[tokio::test(start_paused = true)]
    async fn offroad_tick_starts_only_always_processes() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();

        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Starting);
        assert_eq!(state_of(&fx.manager, "b"), ProcState::NotStarted);

        // Second tick confirms liveness, no double start.
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Running);
        assert_eq!(fx.launcher.launch_count("a"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn onroad_transition_starts_b_and_clears_category_once() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        fx.manager.tick().await.unwrap();

        fx.store.put("CurrentRoute", "route-7");
        set_onroad(&fx, true);
        fx.manager.tick().await.unwrap();

        assert_eq!(state_of(&fx.manager, "b"), ProcState::Starting);
        assert!(fx.store.get("CurrentRoute").is_none());
        assert!(fx.store.get_bool("IsOnroad"));

        // Repeated identical sample: no second clear.
        fx.store.put("CurrentRoute", "route-8");
        fx.manager.tick().await.unwrap();
        assert_eq!(fx.store.get("CurrentRoute").as_deref(), Some("route-8"));
    }

    #[tokio::test(start_paused = true)]
    async fn offroad_transition_stops_b_gracefully_and_keeps_it_stopped() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        set_onroad(&fx, true);
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "b"), ProcState::Running);

        fx.store.put("OffroadAlerts", "stale");
        set_onroad(&fx, false);
        fx.manager.tick().await.unwrap();

        assert_eq!(state_of(&fx.manager, "b"), ProcState::Stopped);
        assert!(fx.store.get("OffroadAlerts").is_none());
        assert!(fx.store.get_bool("IsOffroad"));

        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "b"), ProcState::Stopped);
        assert_eq!(fx.launcher.launch_count("b"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn crashed_desired_process_restarts_after_backoff() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Running);

        fx.launcher.crash("a", ExitInfo::Code(1));
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Crashed);

        // Back-off gate holds within the same instant.
        tokio::time::advance(Duration::from_millis(150)).await;
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Starting);
        assert_eq!(fx.launcher.launch_count("a"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn crashed_persistent_process_restarts_outside_desired_set() {
        let specs = vec![ProcessSpec::new("ui", LaunchTarget::new("./ui"))
            .with_eligibility(Eligibility::OnRoadOnly)
            .persistent()];
        let mut fx = fixture(specs);
        fx.manager.init(&[], false).await.unwrap();
        set_onroad(&fx, true);
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();

        // Leaves the desired set and crashes before the stop lands: the
        // crash is observed by the liveness poll of the same tick.
        set_onroad(&fx, false);
        fx.launcher.crash("ui", ExitInfo::Signal(6));
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "ui"), ProcState::Crashed);

        tokio::time::advance(Duration::from_millis(150)).await;
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "ui"), ProcState::Starting);
        assert_eq!(fx.launcher.launch_count("ui"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn unkillable_process_survives_leaving_desired_set() {
        let specs = vec![ProcessSpec::new("pandad", LaunchTarget::new("./pandad"))
            .with_eligibility(Eligibility::OnRoadOnly)
            .unkillable()];
        let mut fx = fixture(specs);
        fx.manager.init(&[], false).await.unwrap();
        set_onroad(&fx, true);
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "pandad"), ProcState::Running);

        set_onroad(&fx, false);
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "pandad"), ProcState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn ignored_process_never_starts() {
        let mut fx = fixture(ab_specs());
        fx.manager
            .init(&["a".to_string()], false)
            .await
            .unwrap();
        fx.manager.tick().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::NotStarted);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_flag_ends_loop_and_records_reason() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        fx.manager.tick().await.unwrap();

        fx.store.put_bool("DoReboot", true);
        let outcome = fx.manager.tick().await.unwrap();
        assert_eq!(outcome, TickOutcome::Shutdown("DoReboot".to_string()));

        let reason = fx.store.get("LastManagerExitReason").unwrap();
        assert!(reason.starts_with("DoReboot "));
        assert_eq!(exit_action("DoReboot"), ExitAction::Reboot);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_stops_everything_including_unkillable() {
        let specs = vec![
            ProcessSpec::new("a", LaunchTarget::new("./a")),
            ProcessSpec::new("pandad", LaunchTarget::new("./pandad")).unkillable(),
        ];
        let mut fx = fixture(specs);
        fx.manager.init(&[], false).await.unwrap();
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();

        fx.manager.teardown().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Stopped);
        assert_eq!(state_of(&fx.manager, "pandad"), ProcState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn stubborn_processes_are_force_killed_in_teardown() {
        let mut fx = fixture(ab_specs());
        fx.launcher.stubborn.store(true, Ordering::SeqCst);
        fx.manager.init(&[], false).await.unwrap();
        fx.manager.tick().await.unwrap();
        fx.manager.tick().await.unwrap();

        // Stubborn handles ignore SIGTERM but die to the kill escalation
        // inside finish_stop, still within the teardown grace.
        fx.manager.teardown().await.unwrap();
        assert_eq!(state_of(&fx.manager, "a"), ProcState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_config_removes_user_keys() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        fx.store.put("UserLaneChangeAssist", "1");
        fx.store.put("DongleIdBackup", "keep");
        fx.store.put_bool("ResetConfig", true);

        let outcome = fx.manager.tick().await.unwrap();
        assert_eq!(outcome, TickOutcome::Shutdown("ResetConfig".to_string()));
        assert!(fx.store.get("UserLaneChangeAssist").is_none());
        assert_eq!(fx.store.get("DongleIdBackup").as_deref(), Some("keep"));
        assert_eq!(exit_action("ResetConfig"), ExitAction::None);
    }

    #[tokio::test(start_paused = true)]
    async fn init_without_identity_is_fatal() {
        let store = Arc::new(MemParams::new());
        let launcher = FakeLauncher::new();
        let (_tx, feed) = DeviceFeed::channel();
        let mut manager = Manager::new(
            ManagerConfig::default(),
            ab_specs(),
            store,
            launcher,
            feed,
        )
        .unwrap();

        let err = manager.init(&[], false).await.unwrap_err();
        assert_eq!(err.as_label(), "manager_registration_failed");
    }

    #[tokio::test(start_paused = true)]
    async fn status_snapshot_is_published_each_tick_in_registry_order() {
        let mut fx = fixture(ab_specs());
        fx.manager.init(&[], false).await.unwrap();
        let mut rx = fx.manager.status_bus().subscribe();

        fx.manager.tick().await.unwrap();
        let state = rx.recv().await.unwrap();
        let names: Vec<_> = state.processes.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(state.processes[0].state, ProcState::Starting);
        assert!(state.processes[0].pid.is_some());
        assert!(state.processes[1].pid.is_none());
    }
}
