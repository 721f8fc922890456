//! # procvisor
//!
//! **Procvisor** is the top-level process supervisor for a vehicle-control
//! computer. It keeps a fixed registry of OS processes converged onto the
//! set the current driving context demands, and guarantees every spawned
//! process is accounted for until an orderly, bounded teardown.
//!
//! ## Architecture
//! ```text
//!     ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//!     │  ProcessSpec  │   │  ProcessSpec  │   │  ProcessSpec  │
//!     │   (pandad)    │   │   (modeld)    │   │     (ui)      │
//!     └──────┬────────┘   └──────┬────────┘   └──────┬────────┘
//!            ▼                   ▼                   ▼
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Manager (reconciliation loop)                                   │
//! │  - DeviceFeed (watch: on-road flag + vehicle config)             │
//! │  - resolver   (desired set, registry order)                      │
//! │  - ParamStore (lifecycle key/value store, clearing categories)   │
//! │  - Bus        (broadcast lifecycle events)                       │
//! │  - StatusBus  (outbound ManagerState snapshots)                  │
//! └──────┬───────────────────┬───────────────────┬───────────────────┘
//!        ▼                   ▼                   ▼
//!  ┌───────────────┐  ┌───────────────┐  ┌───────────────┐
//!  │ProcessControl.│  │ProcessControl.│  │ProcessControl.│
//!  │(state machine)│  │(state machine)│  │(state machine)│
//!  └──────┬────────┘  └──────┬────────┘  └──────┬────────┘
//!         ▼                  ▼                  ▼
//!     Launch / ProcessHandle (tokio::process + signal escalation)
//! ```
//!
//! ## Lifecycle
//! ```text
//! init:  clear tagged store keys ─► defaults ─► identity ─► prepare all
//! tick:  sample feed ─► edge actions ─► resolve ─► stops ─► starts
//!        ─► publish ManagerState ─► poll shutdown flags
//! exit:  record LastManagerExitReason ─► teardown (bounded, force-kill
//!        fallback) ─► report ExitAction
//! ```
//!
//! ## Features
//! | Area            | Description                                          | Key types / traits                     |
//! |-----------------|------------------------------------------------------|----------------------------------------|
//! | **Supervision** | Reconciliation loop, bounded teardown.               | [`Manager`], [`TickOutcome`]           |
//! | **Registry**    | Static process table with eligibility rules.         | [`ProcessSpec`], [`Eligibility`]       |
//! | **Lifecycle**   | Per-process state machine over a launch seam.        | [`ProcessController`], [`ProcState`]   |
//! | **Launching**   | OS process boundary, signal escalation.              | [`Launch`], [`ProcessHandle`]          |
//! | **Store**       | Key/value lifecycle store with clearing categories.  | [`ParamStore`], [`ParamKeyType`]       |
//! | **Policies**    | Crash-restart back-off with optional jitter.         | [`BackoffPolicy`], [`JitterPolicy`]    |
//! | **Status**      | Device-state input and manager-state output.         | [`DeviceFeed`], [`StatusBus`]          |
//! | **Events**      | Broadcast lifecycle event stream.                    | [`Event`], [`EventKind`], [`Bus`]      |
//! | **Errors**      | Typed errors for the loop and per-process failures.  | [`ManagerError`], [`ProcessError`]     |
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use procvisor::{
//!     managed_processes, DeviceFeed, Manager, ManagerConfig, MemParams, NativeLauncher,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemParams::new());
//!     let (device_tx, feed) = DeviceFeed::channel();
//!     let mut manager = Manager::new(
//!         ManagerConfig::default(),
//!         managed_processes(),
//!         store,
//!         Arc::new(NativeLauncher::default()),
//!         feed,
//!     )?;
//!
//!     manager.init(&[], false).await?;
//!
//!     let cancel = CancellationToken::new();
//!     let action = manager.run(cancel).await?;
//!     println!("exit action: {action:?}");
//!     drop(device_tx);
//!     Ok(())
//! }
//! ```

mod config;
mod core;
mod error;
mod events;
mod policies;
mod procs;
mod resolver;
mod status;
mod store;
mod telemetry;

// ---- Public re-exports ----

pub use config::ManagerConfig;
pub use core::shutdown::wait_for_shutdown_signal;
pub use core::{registration, ExitAction, Manager, TickOutcome};
pub use error::{ManagerError, ProcessError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, JitterPolicy};
pub use procs::{
    managed_processes, predicates, validate_specs, Eligibility, ExitInfo, Launch, LaunchTarget,
    NativeLauncher, ProcState, ProcessController, ProcessHandle, ProcessSpec,
};
pub use resolver::{build_ignore_set, resolve, CarParams, ResolveCtx};
pub use status::{DeviceFeed, DeviceState, ManagerState, ProcessSnapshot, StatusBus};
pub use store::{
    key_type, write_default_params, write_onroad_params, MemParams, ParamKeyType, ParamStore,
    SHUTDOWN_FLAGS,
};
pub use telemetry::spawn_log_listener;
