//! Shutdown Handling
//!
//! Lets Ctrl+C or SIGTERM cut a replay short while still leaving time for
//! the final snapshot.
//!
//! A replay runs on the blocking pool and cannot be aborted, so shutdown
//! sets a stop flag that the replay checks between accesses and then waits
//! for it to return.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::signal;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

/// Waits for a shutdown signal (Ctrl+C or SIGTERM).
///
/// If a handler cannot be installed the error is logged and that signal is
/// never reported.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}

/// Waits for `work` to finish. If `shutdown` completes first, sets `stop`
/// and keeps waiting so the caller still gets the partial result.
pub async fn run_until_shutdown<T, S>(
    mut work: JoinHandle<T>,
    stop: &AtomicBool,
    shutdown: S,
) -> Result<T, JoinError>
where
    S: Future<Output = ()>,
{
    tokio::select! {
        result = &mut work => return result,
        _ = shutdown => {
            stop.store(true, Ordering::Relaxed);
            warn!("Shutdown requested, stopping replay early");
        }
    }
    work.await
}
