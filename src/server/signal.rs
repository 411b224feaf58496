// Signal handling module
//
// - SIGINT (Ctrl+C): stop accepting connections
// - SIGTERM (Unix only): same as SIGINT

use std::sync::Arc;
use tokio::sync::Notify;

use crate::logger;

/// Spawn a task that notifies `shutdown` on the first termination signal
pub fn spawn_shutdown_listener(shutdown: Arc<Notify>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        shutdown.notify_one();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            logger::log_warning(&format!("Failed to register SIGTERM handler: {e}"));
            wait_for_ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        () = wait_for_ctrl_c() => {}
        _ = sigterm.recv() => logger::log_warning("SIGTERM received, shutting down"),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger::log_warning("Ctrl+C received, shutting down"),
        // Without a handler the process can only be killed
        Err(e) => {
            logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
            std::future::pending::<()>().await;
        }
    }
}
