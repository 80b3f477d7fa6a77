// registry-core/src/ports/cache.rs
//
// The 15-second idempotency cache (spec.md §5 "Idempotency cache").
// Keyed by a caller-chosen idempotency key (typically a hash of the
// inbound request body); replays within the TTL return the cached
// response instead of re-running the pipeline.

use async_trait::async_trait;
use std::time::Duration;

use crate::ports::PortError;

pub const DEFAULT_IDEMPOTENCY_TTL: Duration = Duration::from_secs(15);

#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Returns the cached payload (raw bytes — the caller owns
    /// serialization) if `key` was stored within its TTL.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PortError>;

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), PortError>;
}
