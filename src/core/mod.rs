//! Runtime core: initialization, the reconciliation loop, and teardown.
//!
//! The public API from this module is [`Manager`], which owns the
//! controllers, drives the tick loop, and enforces bounded teardown.
//!
//! Internal modules:
//! - [`manager`]: init, tick, run, teardown;
//! - [`registration`]: device-identity collaborator boundary;
//! - [`shutdown`]: cross-platform termination-signal handling.

pub(crate) mod manager;
pub mod registration;
pub mod shutdown;

pub use manager::{ExitAction, Manager, TickOutcome};
