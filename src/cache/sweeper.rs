//! Periodic purge of expired in-process cache entries.

use super::InMemoryCacheStore;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Purges expired entries every `interval` until `shutdown_token` is cancelled.
pub async fn run_cache_sweeper(
    store: Arc<InMemoryCacheStore>,
    interval: Duration,
    shutdown_token: CancellationToken,
) {
    info!("Starting cache sweeper, interval {:?}", interval);
    let mut ticker = tokio::time::interval(interval);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} expired cache entries", purged);
                }
            }
            _ = shutdown_token.cancelled() => {
                info!("Cache sweeper received shutdown signal");
                break;
            }
        }
    }
}
