// registry-core/src/background/purge.rs
//
// Periodic `purgeExpiredSchemaChecks` tick (spec.md §5 "Background
// purge"). Runs independently of any single request's lock — storage
// itself guarantees purge and a racing `approveFailedSchemaCheck` on
// the same check never interleave unsafely (invariant I6: approvals
// are keyed by `context_id`, not check id, so a purge never orphans
// one).

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::interval;

use crate::ports::storage::Storage;

pub const DEFAULT_PURGE_INTERVAL: Duration = Duration::from_secs(300);

/// Runs `storage.purge_expired_schema_checks` on a fixed interval
/// until `shutdown` fires. Intended to be spawned once per process via
/// `tokio::spawn`; errors are logged and the loop continues rather
/// than exiting, since a single failed purge tick should not take the
/// worker down.
pub async fn run(storage: &dyn Storage, purge_interval: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(purge_interval);
    // The first tick fires immediately; skip it so the worker doesn't
    // purge right at process start before anything could have expired.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match storage.purge_expired_schema_checks(Utc::now()).await {
                    Ok(deleted) if deleted > 0 => tracing::info!(deleted, "purged expired schema checks"),
                    Ok(_) => {}
                    Err(err) => tracing::warn!(error = %err, "schema check purge tick failed"),
                }
            }
            _ = shutdown.changed() => {
                if *shutdown.borrow() {
                    tracing::info!("schema check purge worker shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::storage::InMemoryStorage;
    use tokio::sync::watch;

    #[tokio::test]
    async fn stops_when_shutdown_signalled() {
        let storage = InMemoryStorage::new();
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            run(&storage, Duration::from_millis(10), rx).await;
        });

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle).await.unwrap().unwrap();
    }
}
