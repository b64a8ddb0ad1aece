//! Signal handling for graceful shutdown.
//!
//! SIGTERM and SIGINT (Ctrl+C elsewhere) cancel a shared
//! [`CancellationToken`]; the driver loop and the MOTD server both stop when
//! it fires.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::error::{ServerError, ServerResult};

/// Owns the shutdown token and the signal listener task.
#[derive(Debug, Clone, Default)]
pub struct SignalHandler {
    shutdown: CancellationToken,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the handlers and spawns the listener task.
    ///
    /// Must be called from inside the runtime.
    #[cfg(unix)]
    pub fn spawn_listener(&self) -> ServerResult<()> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigterm = signal(SignalKind::terminate()).map_err(ServerError::Signal)?;
        let mut sigint = signal(SignalKind::interrupt()).map_err(ServerError::Signal)?;
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("Received SIGINT, shutting down"),
                _ = shutdown.cancelled() => {
                    debug!("Signal listener stopped");
                    return;
                }
            }
            shutdown.cancel();
        });
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn spawn_listener(&self) -> ServerResult<()> {
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            tokio::select! {
                result = tokio::signal::ctrl_c() => match result {
                    Ok(()) => info!("Received Ctrl+C, shutting down"),
                    Err(e) => {
                        tracing::error!(error = %ServerError::Signal(e), "Ctrl+C handler failed");
                        return;
                    }
                },
                _ = shutdown.cancelled() => return,
            }
            shutdown.cancel();
        });
        Ok(())
    }

    /// A token that is cancelled on shutdown.
    pub fn token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Requests shutdown without a signal.
    pub fn trigger_shutdown(&self) {
        self.shutdown.cancel();
    }
}
