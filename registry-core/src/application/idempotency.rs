// registry-core/src/application/idempotency.rs
//
// Schema Publisher step 3 (spec.md §4.6): wraps a request in a cache
// keyed by the request's own checksum with a 15-second TTL, so two
// concurrent identical requests observe the same result instead of
// racing each other through composition and storage twice.

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::RegistryError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::cache::{IdempotencyCache, DEFAULT_IDEMPOTENCY_TTL};
use crate::schema_helper::checksum;

/// Derives the cache key from `target_id` plus a checksum of the
/// request payload — two requests only collide when they'd produce
/// the same pipeline input.
pub fn idempotency_key(target_id: &str, request: &impl Serialize) -> Result<String, RegistryError> {
    let encoded = serde_json::to_string(request).map_err(InfrastructureError::from)?;
    Ok(format!("idempotency:{target_id}:{}", checksum(&encoded)))
}

pub async fn with_idempotency<T, F, Fut>(cache: &dyn IdempotencyCache, key: &str, run: F) -> Result<T, RegistryError>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, RegistryError>>,
{
    if let Some(cached) = cache.get(key).await? {
        let value = serde_json::from_slice(&cached).map_err(InfrastructureError::from)?;
        return Ok(value);
    }

    let result = run().await?;
    let encoded = serde_json::to_vec(&result).map_err(InfrastructureError::from)?;
    cache.put(key, encoded, DEFAULT_IDEMPOTENCY_TTL).await?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::cache::InMemoryCache;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn second_identical_call_does_not_rerun() {
        let cache = InMemoryCache::new();
        let calls = AtomicU32::new(0);

        let first: String = with_idempotency(&cache, "k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("result".to_string())
        })
        .await
        .unwrap();

        let second: String = with_idempotency(&cache, "k", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok("result".to_string())
        })
        .await
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn key_is_stable_for_identical_payloads() {
        let a = idempotency_key("t1", &"payload").unwrap();
        let b = idempotency_key("t1", &"payload").unwrap();
        assert_eq!(a, b);
    }
}
