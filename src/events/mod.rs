//! Runtime events: types and broadcast bus.
//!
//! Groups the event data model and the bus used to publish/subscribe to
//! lifecycle events emitted by the manager loop and process controllers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] — event classification and payload metadata
//! - [`Bus`] — thin wrapper over `tokio::sync::broadcast`
//!
//! Publishers: [`Manager`](crate::core::Manager) and every
//! [`ProcessController`](crate::procs::ProcessController). Consumers: the
//! log listener and the telemetry listener in [`crate::telemetry`].

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
