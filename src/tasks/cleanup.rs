//! Periodic Cleanup Task
//!
//! Background task that sweeps the TTL-expiring shared state: feed-cache
//! entries, rate-governor windows and fan-out tombstones.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::fanout::Tombstones;
use crate::feed::FeedCache;
use crate::limit::RateGovernor;

/// Spawns a background task that periodically removes expired feed-cache
/// entries, rate windows and tombstones.
///
/// Returns a JoinHandle for the spawned task, which is aborted during
/// graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<FeedCache>>,
    governor: Arc<RateGovernor>,
    tombstones: Arc<Tombstones>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting cleanup task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            tokio::time::sleep(interval).await;

            let expired_pages = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };
            let expired_windows = governor.sweep_expired();
            let expired_tombstones = tombstones.sweep();

            if expired_pages + expired_windows + expired_tombstones > 0 {
                info!(
                    expired_pages,
                    expired_windows, expired_tombstones, "Cleanup pass removed expired state"
                );
            } else {
                debug!("Cleanup pass found nothing expired");
            }
        }
    })
}
