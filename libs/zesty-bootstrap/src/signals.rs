use std::fmt;

use anyhow::{Context, Result};
use tokio::signal;

/// What asked the process to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    CtrlC,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CtrlC => "SIGINT",
            Self::Terminate => "SIGTERM",
        })
    }
}

/// Resolve on Ctrl+C or, on unix, SIGTERM.
///
/// # Errors
/// Fails when a signal handler cannot be installed.
pub async fn wait_for_shutdown() -> Result<ShutdownSignal> {
    let received = tokio::select! {
        r = ctrl_c() => r?,
        r = terminate() => r?,
    };
    tracing::info!(signal = %received, "shutdown requested; draining in-flight requests");
    Ok(received)
}

/// [`wait_for_shutdown`] for `with_graceful_shutdown`: a handler that cannot
/// be installed is logged and the future never resolves through it.
pub async fn shutdown_signal() {
    if let Err(e) = wait_for_shutdown().await {
        tracing::error!(error = %e, "signal handling failed; the server stops only when killed");
        std::future::pending::<()>().await;
    }
}

async fn ctrl_c() -> Result<ShutdownSignal> {
    signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    Ok(ShutdownSignal::CtrlC)
}

#[cfg(unix)]
async fn terminate() -> Result<ShutdownSignal> {
    signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?
        .recv()
        .await;
    Ok(ShutdownSignal::Terminate)
}

#[cfg(not(unix))]
async fn terminate() -> Result<ShutdownSignal> {
    std::future::pending().await
}
