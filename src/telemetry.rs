//! Event-bus listeners: structured logging over lifecycle events.
//!
//! The manager and its controllers publish every lifecycle transition on the
//! broadcast [`Bus`]; this module turns that stream into `tracing` output.
//! Listeners are lossy by design (broadcast semantics), so a slow consumer
//! only costs itself events, never the loop.

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::events::{Bus, Event, EventKind};

/// Spawns a listener that logs every bus event until the token is cancelled
/// or the bus closes.
///
/// Call once during startup.
pub fn spawn_log_listener(bus: &Bus, cancel: CancellationToken) {
    let mut rx = bus.subscribe();

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                msg = rx.recv() => match msg {
                    Ok(ev) => log_event(&ev),
                    Err(RecvError::Closed) => break,
                    Err(RecvError::Lagged(n)) => {
                        warn!(skipped = n, "log listener lagged");
                        continue;
                    }
                }
            }
        }
    });
}

fn log_event(ev: &Event) {
    let process = ev.process.as_deref().unwrap_or("-");
    match ev.kind {
        EventKind::ProcessStarting => {
            info!(seq = ev.seq, process, "starting");
        }
        EventKind::ProcessStarted => {
            info!(seq = ev.seq, process, pid = ev.pid, "started");
        }
        EventKind::ProcessStopped => {
            info!(seq = ev.seq, process, reason = reason(ev), "stopped");
        }
        EventKind::ProcessCrashed => {
            warn!(seq = ev.seq, process, reason = reason(ev), "crashed");
        }
        EventKind::SpawnFailed => {
            warn!(seq = ev.seq, process, reason = reason(ev), "spawn failed");
        }
        EventKind::RestartScheduled => {
            info!(
                seq = ev.seq,
                process,
                delay_ms = ev.delay_ms,
                "restart scheduled"
            );
        }
        EventKind::OnroadTransition => {
            info!(seq = ev.seq, "onroad");
        }
        EventKind::OffroadTransition => {
            info!(seq = ev.seq, "offroad");
        }
        EventKind::ShutdownRequested => {
            warn!(seq = ev.seq, reason = reason(ev), "shutdown requested");
        }
        EventKind::TeardownComplete => {
            info!(seq = ev.seq, "teardown complete");
        }
        EventKind::GraceExceeded => {
            warn!(seq = ev.seq, stuck = reason(ev), "teardown grace exceeded");
        }
        EventKind::LoopFailed => {
            warn!(seq = ev.seq, reason = reason(ev), "manager loop failed");
        }
    }
    debug!(at = ?ev.at, "event");
}

fn reason(ev: &Event) -> &str {
    ev.reason.as_deref().unwrap_or("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn listener_exits_on_cancel() {
        let bus = Bus::new(8);
        let cancel = CancellationToken::new();
        spawn_log_listener(&bus, cancel.clone());

        bus.publish(Event::now(EventKind::ProcessStarting).with_process("a"));
        cancel.cancel();
        tokio::task::yield_now().await;

        // The listener no longer holds its receiver open forever; a fresh
        // subscriber still sees later events.
        let mut rx = bus.subscribe();
        bus.publish(Event::now(EventKind::TeardownComplete));
        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TeardownComplete);
    }
}
