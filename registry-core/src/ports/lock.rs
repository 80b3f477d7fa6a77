// registry-core/src/ports/lock.rs
//
// Per-target distributed mutual exclusion (spec.md §5 "Per-target
// lock"). The publisher acquires `target.lock_key` before loading any
// mutable state and releases it once the write transaction commits or
// the request is cancelled.

use async_trait::async_trait;
use std::time::Duration;

use crate::ports::PortError;

/// RAII guard over a held lock. Dropping it without calling
/// [`LockGuard::release`] must still free the lock (implementations
/// rely on `Drop`, a TTL lease, or both) — callers are not required to
/// call `release` on the cancellation/error paths.
#[async_trait]
pub trait LockGuard: Send + Sync {
    async fn release(self: Box<Self>) -> Result<(), PortError>;
}

#[async_trait]
pub trait DistributedLock: Send + Sync {
    /// Blocks (respecting `timeout`) until `key` is acquired.
    /// Implementations should poll or subscribe rather than busy-loop
    /// at full CPU; the in-memory adapter uses a short backoff, the
    /// Postgres adapter uses `pg_advisory_lock`.
    async fn acquire(&self, key: &str, timeout: Duration) -> Result<Box<dyn LockGuard>, PortError>;
}
