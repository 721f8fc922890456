//! Supervisor daemon entry point.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use procvisor::{
    managed_processes, spawn_log_listener, wait_for_shutdown_signal, DeviceFeed, ExitAction,
    Manager, ManagerConfig, MemParams, NativeLauncher,
};

/// Process supervisor for the vehicle-control computer.
#[derive(Parser, Debug)]
#[command(name = "procvisor", version, about)]
struct Args {
    /// Process names to exclude from management for this run
    #[arg(long = "block", value_name = "NAME")]
    block: Vec<String>,

    /// Run without the vehicle-interface board attached
    #[arg(long)]
    no_board: bool,

    /// Initialize and prepare every process, then exit without supervising
    #[arg(long)]
    prepare_only: bool,

    /// Continue with a placeholder identity when the device is unregistered
    #[arg(long)]
    allow_unregistered: bool,

    /// Reconciliation interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 500)]
    tick_ms: u64,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut cfg = ManagerConfig::default();
    cfg.tick_interval = Duration::from_millis(args.tick_ms.max(1));
    cfg.allow_unregistered = args.allow_unregistered;

    let store = Arc::new(MemParams::new());
    let (device_tx, feed) = DeviceFeed::channel();
    let mut manager = Manager::new(
        cfg,
        managed_processes(),
        store,
        Arc::new(NativeLauncher::default()),
        feed,
    )
    .context("manager construction failed")?;

    let cancel = CancellationToken::new();
    spawn_log_listener(manager.bus(), cancel.clone());

    let dongle_id = manager
        .init(&args.block, args.no_board)
        .await
        .context("manager init failed")?;
    info!(version = env!("CARGO_PKG_VERSION"), dongle_id = %dongle_id, "manager initialized");

    if args.prepare_only {
        info!("prepare-only run, exiting");
        return Ok(());
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = wait_for_shutdown_signal().await {
                warn!(error = %e, "signal listener failed");
            }
            cancel.cancel();
        });
    }

    let action = manager.run(cancel.clone()).await?;
    cancel.cancel();
    drop(device_tx);

    // Power actions are delegated to the platform layer; report the request.
    match action {
        ExitAction::None => info!("manager exited"),
        ExitAction::Shutdown => warn!("manager exited, shutdown requested"),
        ExitAction::Reboot => warn!("manager exited, reboot requested"),
        ExitAction::Uninstall => warn!("manager exited, uninstall requested"),
    }
    Ok(())
}
