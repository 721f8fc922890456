//! # Desired-state resolver.
//!
//! Pure, deterministic, side-effect free: given the spec table and a
//! per-tick [`ResolveCtx`], [`resolve`] returns the names of processes that
//! should be running, in registry order.
//!
//! The ignore set is composed from independent contribution functions
//! combined by set union — each contribution is testable in isolation and
//! none overrides another: a name excluded by any contribution stays
//! excluded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::core::registration::is_registered;
use crate::procs::{table, Eligibility, ProcessSpec};
use crate::store::ParamStore;

/// Vehicle-configuration blob consumed by vehicle-dependent predicates.
///
/// Neutral defaults apply until the first device-state sample arrives.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CarParams {
    /// Fingerprinted car name, empty until known.
    pub car_name: String,
    /// The platform exposes no usable radar.
    pub radar_unavailable: bool,
    /// Driver monitoring is supported and enabled for this vehicle.
    pub driver_monitoring: bool,
}

impl Default for CarParams {
    fn default() -> Self {
        Self {
            car_name: String::new(),
            radar_unavailable: false,
            driver_monitoring: true,
        }
    }
}

/// Per-tick context the resolver evaluates against. Recomputed every tick,
/// never persisted.
#[derive(Clone, Debug)]
pub struct ResolveCtx {
    /// Latest on-road flag (last known value when samples are missing).
    pub onroad: bool,
    /// Names excluded from the desired set this tick.
    pub ignore: HashSet<String>,
    /// Latest vehicle configuration.
    pub car_params: CarParams,
}

fn eligible(spec: &ProcessSpec, ctx: &ResolveCtx) -> bool {
    match spec.eligibility() {
        Eligibility::Always => true,
        Eligibility::OnRoadOnly => ctx.onroad,
        Eligibility::OffRoadOnly => !ctx.onroad,
        // Validated at startup; a miss here would be a bug, not a config
        // error, so resolve treats it as not eligible.
        Eligibility::Conditional(key) => table::predicate(key).map_or(false, |p| p(ctx)),
    }
}

/// Returns the names of processes that should run, in registry order.
pub fn resolve<'a>(
    specs: impl IntoIterator<Item = &'a ProcessSpec>,
    ctx: &ResolveCtx,
) -> Vec<String> {
    specs
        .into_iter()
        .filter(|spec| !ctx.ignore.contains(spec.name()) && eligible(spec, ctx))
        .map(|spec| spec.name().to_string())
        .collect()
}

/// Processes requiring a registered device identity.
fn unregistered_exclusions(store: &dyn ParamStore) -> Vec<&'static str> {
    if is_registered(store) {
        Vec::new()
    } else {
        vec!["athenad", "uploader"]
    }
}

/// Processes suppressed when driver monitoring hardware is unavailable.
fn monitoring_exclusions(store: &dyn ParamStore) -> Vec<&'static str> {
    if store.get_bool("DriverMonitoringUnavailable") {
        vec!["dmonitoringd", "dmonitoringmodeld", "uploader"]
    } else {
        Vec::new()
    }
}

/// Vehicle-interface process suppressed when running without a board.
fn board_exclusions(no_board: bool) -> Vec<&'static str> {
    if no_board {
        vec!["pandad"]
    } else {
        Vec::new()
    }
}

/// Builds the ignore set as the union of all independent contributions.
///
/// `block` is the explicit operator block-list (CLI/environment);
/// `no_board` suppresses the vehicle-interface process for bench setups.
pub fn build_ignore_set(
    store: &dyn ParamStore,
    block: &[String],
    no_board: bool,
) -> HashSet<String> {
    let mut ignore: HashSet<String> = HashSet::new();
    ignore.extend(unregistered_exclusions(store).into_iter().map(String::from));
    ignore.extend(monitoring_exclusions(store).into_iter().map(String::from));
    ignore.extend(board_exclusions(no_board).into_iter().map(String::from));
    ignore.extend(block.iter().filter(|s| !s.is_empty()).cloned());
    ignore
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procs::LaunchTarget;
    use crate::store::MemParams;

    fn specs() -> Vec<ProcessSpec> {
        vec![
            ProcessSpec::new("a", LaunchTarget::new("./a")),
            ProcessSpec::new("b", LaunchTarget::new("./b"))
                .with_eligibility(Eligibility::OnRoadOnly),
            ProcessSpec::new("c", LaunchTarget::new("./c"))
                .with_eligibility(Eligibility::OffRoadOnly),
            ProcessSpec::new("d", LaunchTarget::new("./d"))
                .with_eligibility(Eligibility::Conditional("driver_monitoring")),
        ]
    }

    fn ctx(onroad: bool) -> ResolveCtx {
        ResolveCtx {
            onroad,
            ignore: HashSet::new(),
            car_params: CarParams::default(),
        }
    }

    #[test]
    fn offroad_selects_always_and_offroad_only() {
        let desired = resolve(&specs(), &ctx(false));
        assert_eq!(desired, vec!["a", "c"]);
    }

    #[test]
    fn onroad_selects_always_onroad_and_satisfied_conditionals() {
        let desired = resolve(&specs(), &ctx(true));
        assert_eq!(desired, vec!["a", "b", "d"]);
    }

    #[test]
    fn conditional_respects_car_params() {
        let mut c = ctx(true);
        c.car_params.driver_monitoring = false;
        let desired = resolve(&specs(), &c);
        assert_eq!(desired, vec!["a", "b"]);
    }

    #[test]
    fn ignored_names_are_excluded_regardless_of_eligibility() {
        let mut c = ctx(true);
        c.ignore.insert("a".to_string());
        c.ignore.insert("b".to_string());
        let desired = resolve(&specs(), &c);
        assert_eq!(desired, vec!["d"]);
    }

    #[test]
    fn resolve_is_deterministic_and_pure() {
        let s = specs();
        let c = ctx(true);
        assert_eq!(resolve(&s, &c), resolve(&s, &c));
    }

    #[test]
    fn ignore_set_unions_all_contributions() {
        let store = MemParams::new();
        // No DongleId stored: unregistered.
        store.put_bool("DriverMonitoringUnavailable", true);

        let block = vec!["loggerd".to_string()];
        let ignore = build_ignore_set(&store, &block, true);

        for name in ["athenad", "uploader", "dmonitoringd", "dmonitoringmodeld", "pandad", "loggerd"] {
            assert!(ignore.contains(name), "{name} should be ignored");
        }
    }

    #[test]
    fn registered_device_keeps_identity_processes() {
        let store = MemParams::new();
        store.put("DongleId", "1234567890abcdef");
        let ignore = build_ignore_set(&store, &[], false);
        assert!(ignore.is_empty());
    }

    #[test]
    fn overlapping_exclusions_stay_excluded() {
        // uploader is excluded by both the unregistered and the
        // monitoring-unavailable contributions; neither overrides the other.
        let store = MemParams::new();
        store.put("DongleId", "1234567890abcdef");
        store.put_bool("DriverMonitoringUnavailable", true);
        let ignore = build_ignore_set(&store, &[], false);
        assert!(ignore.contains("uploader"));
        assert!(!ignore.contains("athenad"));
    }
}
