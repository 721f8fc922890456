//! # Static registry of manageable processes.
//!
//! [`managed_processes`] builds the full driving-stack roster in registry
//! order; the loop starts, stops, and reports processes in exactly this
//! order for determinism.
//!
//! Conditional eligibility predicates live in [`predicates`];
//! [`validate_specs`] checks every `Conditional` key against that registry
//! at startup so an unknown key is a configuration error, never a
//! resolve-time surprise.

use crate::error::ManagerError;
use crate::procs::spec::{Eligibility, LaunchTarget, ProcessSpec};
use crate::resolver::ResolveCtx;

/// Eligibility predicate evaluated against the per-tick context.
pub type Predicate = fn(&ResolveCtx) -> bool;

fn driver_monitoring(ctx: &ResolveCtx) -> bool {
    ctx.onroad && ctx.car_params.driver_monitoring
}

fn radar_present(ctx: &ResolveCtx) -> bool {
    ctx.onroad && !ctx.car_params.radar_unavailable
}

static PREDICATES: &[(&str, Predicate)] = &[
    ("driver_monitoring", driver_monitoring as Predicate),
    ("radar_present", radar_present as Predicate),
];

/// Named predicates available to `Eligibility::Conditional`.
pub fn predicates() -> &'static [(&'static str, Predicate)] {
    PREDICATES
}

/// Looks up a predicate by key.
pub(crate) fn predicate(key: &str) -> Option<Predicate> {
    predicates()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, f)| *f)
}

fn native(name: &str) -> ProcessSpec {
    ProcessSpec::new(name, LaunchTarget::new(format!("./{name}")))
}

/// Builds the default process table, in registry order.
pub fn managed_processes() -> Vec<ProcessSpec> {
    vec![
        native("pandad").unkillable().persistent(),
        native("logmessaged"),
        native("camerad").with_eligibility(Eligibility::OnRoadOnly),
        native("sensord").with_eligibility(Eligibility::OnRoadOnly),
        native("modeld").with_eligibility(Eligibility::OnRoadOnly),
        native("calibrationd").with_eligibility(Eligibility::OnRoadOnly),
        native("locationd").with_eligibility(Eligibility::OnRoadOnly),
        native("paramsd").with_eligibility(Eligibility::OnRoadOnly),
        native("controlsd").with_eligibility(Eligibility::OnRoadOnly),
        native("plannerd").with_eligibility(Eligibility::OnRoadOnly),
        native("radard").with_eligibility(Eligibility::Conditional("radar_present")),
        native("dmonitoringd").with_eligibility(Eligibility::Conditional("driver_monitoring")),
        native("dmonitoringmodeld").with_eligibility(Eligibility::Conditional("driver_monitoring")),
        native("soundd").with_eligibility(Eligibility::OnRoadOnly),
        native("loggerd").with_eligibility(Eligibility::OnRoadOnly),
        native("deleter"),
        native("uploader"),
        native("athenad"),
        native("updated").with_eligibility(Eligibility::OffRoadOnly),
        native("ui").persistent(),
    ]
}

/// Verifies that every `Conditional` eligibility references a registered
/// predicate. Called once at supervisor startup.
pub fn validate_specs(specs: &[ProcessSpec]) -> Result<(), ManagerError> {
    for spec in specs {
        if let Eligibility::Conditional(key) = spec.eligibility() {
            if predicate(key).is_none() {
                return Err(ManagerError::UnknownPredicate {
                    process: spec.name().to_string(),
                    key,
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_validates() {
        let specs = managed_processes();
        assert!(validate_specs(&specs).is_ok());
    }

    #[test]
    fn names_are_unique() {
        let specs = managed_processes();
        let mut names: Vec<_> = specs.iter().map(|s| s.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), specs.len());
    }

    #[test]
    fn unknown_predicate_is_rejected() {
        let specs = vec![ProcessSpec::new("ghost", LaunchTarget::new("./ghost"))
            .with_eligibility(Eligibility::Conditional("no_such_predicate"))];
        let err = validate_specs(&specs).unwrap_err();
        assert_eq!(err.as_label(), "manager_unknown_predicate");
    }
}
