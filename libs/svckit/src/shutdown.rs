use anyhow::Result;
use tokio_util::sync::CancellationToken;

/// Resolve on SIGTERM, SIGINT or Ctrl+C. Returns the name of the signal.
pub async fn wait_for_shutdown() -> Result<&'static str> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let name = tokio::select! {
            _ = sigterm.recv() => "SIGTERM",
            _ = sigint.recv()  => "SIGINT",
            _ = tokio::signal::ctrl_c() => "ctrl-c",
        };
        Ok(name)
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok("ctrl-c")
    }
}

/// Cancel `token` once a shutdown signal arrives.
pub fn cancel_on_signal(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => tracing::info!(signal, "shutdown requested"),
            Err(e) => tracing::error!(error = %e, "signal handler failed, shutting down"),
        }
        token.cancel();
    })
}
