//! Periodic refresh loop for a single key.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::cache::{CacheKey, EntityCache, FetchFn};

/// Refresh `key` immediately and then every `interval` until shutdown or abort.
///
/// Failures are absorbed: the cache keeps the last good value and records the
/// error on the entry.
pub(crate) async fn run_timer(
    cache: EntityCache,
    key: CacheKey,
    interval: Duration,
    fetch: FetchFn,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::debug!(key = %key, interval_ms = interval.as_millis() as u64, "Poll timer started");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                cache.expire(&key);
                if let Err(e) = cache.fetch(&key, &fetch).await {
                    tracing::warn!(key = %key, error = %e, "Poll failed, serving last known value");
                }
            }
            _ = shutdown.recv() => {
                tracing::debug!(key = %key, "Poll timer received shutdown signal, exiting loop");
                break;
            }
        }
    }
}
