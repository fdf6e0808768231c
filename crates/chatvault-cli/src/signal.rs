//! Termination signal handling.
//!
//! Ctrl+C and SIGTERM end the session through the same `terminate()` path
//! as the `exit` command, so the context is saved before the process stops.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use console::style;

use chatvault_core::ContextManager;
use chatvault_core::session::codec::SessionCodec;
use chatvault_core::session::store::ContextStore;
use chatvault_types::error::ContextError;

/// Wait for `signal`, then terminate the session.
///
/// Returns whether the final save succeeded. The wait for the session lock
/// and the save is bounded by `wait`; on timeout the shutdown token is
/// cancelled anyway so the chat loop stops.
pub async fn terminate_on<C, S>(
    signal: impl Future<Output = ()>,
    manager: ContextManager<C, S>,
    mut out: impl Write,
    wait: Duration,
) -> bool
where
    C: SessionCodec + 'static,
    S: ContextStore + 'static,
{
    signal.await;
    let _ = writeln!(out, "\n  {}", style("Program terminated. Saving context...").dim());
    tracing::info!(user_id = %manager.user_id(), "Termination signal received");

    match tokio::time::timeout(wait, manager.terminate()).await {
        Ok(Ok(())) => {
            let _ = writeln!(
                out,
                "  {}",
                style(format!("Context for user {} saved.", manager.user_id())).dim()
            );
            true
        }
        // The loop already ended the session and reported it.
        Ok(Err(ContextError::SessionClosed)) => true,
        Ok(Err(e)) => {
            let _ = writeln!(out, "  {} Could not save context: {e}", style("!").red().bold());
            false
        }
        Err(_) => {
            tracing::error!(
                user_id = %manager.user_id(),
                timeout_secs = wait.as_secs(),
                "Timed out waiting to save context on shutdown"
            );
            manager.shutdown_token().cancel();
            false
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
