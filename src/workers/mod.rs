//! Background workers for the analyzer service.
//!
//! Currently one worker: periodic cleanup of stale project workspaces, so
//! extracted trees do not accumulate across the process lifetime.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use archlens_core::Config;
use archlens_orchestrator::ArchiveExtractor;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(6 * 3600);

/// Spawn a background worker that periodically removes project workspaces
/// older than the configured retention.
pub fn spawn_cleanup_worker(
    extractor: Arc<ArchiveExtractor>,
    config: &Config,
    shutdown_token: CancellationToken,
) {
    let max_age = Duration::from_secs(config.storage.cleanup_after_days * 86_400);

    tokio::spawn(async move {
        info!(
            retention_days = max_age.as_secs() / 86_400,
            "Workspace cleanup worker started"
        );

        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        // The first tick fires immediately; the startup sweep is wanted
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let extractor = extractor.clone();
                    let result = tokio::task::spawn_blocking(move || {
                        extractor.cleanup_older_than(max_age)
                    })
                    .await;

                    match result {
                        Ok(Ok(removed)) if removed > 0 => {
                            info!(removed, "Removed stale project workspaces");
                        }
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => {
                            error!(error = %e, "Workspace cleanup failed");
                        }
                        Err(e) => {
                            error!(error = %e, "Workspace cleanup task panicked");
                        }
                    }
                }
                _ = shutdown_token.cancelled() => {
                    info!("Workspace cleanup worker shutting down");
                    break;
                }
            }
        }
    });
}
