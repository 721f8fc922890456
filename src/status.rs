//! # Status channel: outbound manager snapshots, inbound device state.
//!
//! Outbound, [`StatusBus`] broadcasts one [`ManagerState`] per tick,
//! fire-and-forget: consumers (UI, diagnostics) subscribe and tolerate lag
//! the same way the event bus does.
//!
//! Inbound, [`DeviceFeed`] wraps a watch channel carrying the latest
//! [`DeviceState`]; sampling is non-blocking and retains the last known
//! value when no fresh sample has arrived, including the neutral default
//! before the first sample.

use serde::Serialize;
use tokio::sync::{broadcast, watch};

use crate::procs::ProcState;
use crate::resolver::CarParams;

/// Point-in-time view of one controller.
#[derive(Clone, Debug, Serialize)]
pub struct ProcessSnapshot {
    pub name: String,
    pub state: ProcState,
    /// Present only while a handle exists (Starting/Running/Stopping).
    pub pid: Option<u32>,
}

/// Consolidated health snapshot, one per tick, processes in registry order.
#[derive(Clone, Debug, Serialize)]
pub struct ManagerState {
    pub processes: Vec<ProcessSnapshot>,
}

/// Outbound broadcast of [`ManagerState`] snapshots.
#[derive(Clone, Debug)]
pub struct StatusBus {
    tx: broadcast::Sender<ManagerState>,
}

impl StatusBus {
    /// Creates a bus with the given ring-buffer capacity (clamped to >= 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publishes a snapshot; never blocks, drops when nobody listens.
    pub fn publish(&self, state: ManagerState) {
        let _ = self.tx.send(state);
    }

    /// Creates an independent receiver observing subsequent snapshots.
    pub fn subscribe(&self) -> broadcast::Receiver<ManagerState> {
        self.tx.subscribe()
    }
}

/// Latest device/vehicle sample.
#[derive(Clone, Debug, Default)]
pub struct DeviceState {
    /// The vehicle is on-road.
    pub started: bool,
    /// Vehicle configuration; neutral default until fingerprinted.
    pub car_params: CarParams,
}

/// Non-blocking sampler over the device-state feed.
pub struct DeviceFeed {
    rx: watch::Receiver<DeviceState>,
}

impl DeviceFeed {
    /// Creates a feed seeded with the neutral default state, returning the
    /// producer side alongside it.
    pub fn channel() -> (watch::Sender<DeviceState>, DeviceFeed) {
        let (tx, rx) = watch::channel(DeviceState::default());
        (tx, DeviceFeed { rx })
    }

    /// Returns the latest sample without blocking; repeated calls between
    /// samples return the retained previous value.
    pub fn sample(&mut self) -> DeviceState {
        self.rx.borrow_and_update().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_defaults_to_neutral_state() {
        let (_tx, mut feed) = DeviceFeed::channel();
        let s = feed.sample();
        assert!(!s.started);
        assert!(s.car_params.driver_monitoring);
    }

    #[test]
    fn feed_retains_last_value_without_fresh_samples() {
        let (tx, mut feed) = DeviceFeed::channel();
        tx.send_replace(DeviceState {
            started: true,
            car_params: CarParams::default(),
        });
        assert!(feed.sample().started);
        // No new sample: the previous value is reused.
        assert!(feed.sample().started);
    }

    #[tokio::test]
    async fn status_bus_delivers_snapshots() {
        let bus = StatusBus::new(4);
        let mut rx = bus.subscribe();
        bus.publish(ManagerState {
            processes: vec![ProcessSnapshot {
                name: "ui".into(),
                state: ProcState::Running,
                pid: Some(7),
            }],
        });
        let state = rx.recv().await.unwrap();
        assert_eq!(state.processes[0].name, "ui");
    }

    #[test]
    fn snapshot_serializes_with_snake_case_state() {
        let snap = ProcessSnapshot {
            name: "controlsd".into(),
            state: ProcState::NotStarted,
            pid: None,
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"not_started\""));
    }
}
