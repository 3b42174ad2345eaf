use tokio::signal;
use tracing::{info, warn};

/// Resolves once Ctrl+C is received.
///
/// Nothing needs flushing on shutdown; the server future is simply dropped.
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}
