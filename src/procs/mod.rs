//! Managed processes: specs, the static registry, the launch seam, and the
//! per-process lifecycle controller.
//!
//! ## Contents
//! - [`ProcessSpec`], [`Eligibility`], [`LaunchTarget`] — immutable launch
//!   and eligibility metadata
//! - [`managed_processes`], [`predicates`], [`validate_specs`] — the static
//!   registry and its eligibility predicates
//! - [`ProcessHandle`], [`Launch`] — the OS launch-primitive boundary
//! - [`ProcessController`], [`ProcState`] — the per-process state machine

mod controller;
mod handle;
mod launcher;
mod spec;
pub(crate) mod table;

pub use controller::{ProcState, ProcessController};
pub use handle::{ExitInfo, ProcessHandle};
pub use launcher::{Launch, NativeLauncher};
pub use spec::{Eligibility, LaunchTarget, ProcessSpec};
pub use table::{managed_processes, predicates, validate_specs, Predicate};
