// registry-core/src/infrastructure/memory/cache.rs

use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::ports::cache::IdempotencyCache;
use crate::ports::PortError;

struct CacheEntry {
    value: Vec<u8>,
    expires_at: Instant,
}

#[derive(Default)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdempotencyCache for InMemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PortError> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
            Some(_) => {
                self.entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<(), PortError> {
        self.entries.insert(key.to_string(), CacheEntry { value, expires_at: Instant::now() + ttl });
        Ok(())
    }
}
