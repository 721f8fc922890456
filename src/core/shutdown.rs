//! # Termination-signal handling.
//!
//! An external termination request to the supervisor is a request to run
//! the orderly teardown path, not a crash: [`wait_for_shutdown_signal`]
//! completes when such a signal arrives and the caller cancels the loop
//! token.
//!
//! Unix listens for SIGINT, SIGTERM, and SIGQUIT; other platforms fall back
//! to Ctrl-C.

/// Waits for a termination signal.
///
/// Each call installs independent listeners. Returns `Ok(())` when any
/// signal is received, or `Err` if listener registration fails.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

/// Waits for a termination signal (Ctrl-C on non-unix platforms).
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
