// registry-core/src/infrastructure/memory/lock.rs

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::time::timeout;

use crate::ports::lock::{DistributedLock, LockGuard};
use crate::ports::PortError;

#[derive(Default)]
pub struct InMemoryLock {
    keys: DashMap<String, Arc<Mutex<()>>>,
}

impl InMemoryLock {
    pub fn new() -> Self {
        Self::default()
    }

    fn mutex_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.keys.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

struct InMemoryLockGuard {
    #[allow(dead_code)]
    guard: OwnedMutexGuard<()>,
}

#[async_trait]
impl LockGuard for InMemoryLockGuard {
    async fn release(self: Box<Self>) -> Result<(), PortError> {
        Ok(())
    }
}

#[async_trait]
impl DistributedLock for InMemoryLock {
    async fn acquire(&self, key: &str, lock_timeout: Duration) -> Result<Box<dyn LockGuard>, PortError> {
        let mutex = self.mutex_for(key);
        match timeout(lock_timeout, mutex.lock_owned()).await {
            Ok(guard) => Ok(Box::new(InMemoryLockGuard { guard })),
            Err(_) => Err(PortError::Lock(format!("timed out acquiring lock {key}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_blocks_until_release() {
        let lock = InMemoryLock::new();
        let guard = lock.acquire("registry:lock:t1", Duration::from_millis(50)).await.unwrap();
        let blocked = lock.acquire("registry:lock:t1", Duration::from_millis(20)).await;
        assert!(blocked.is_err());
        guard.release().await.unwrap();
        assert!(lock.acquire("registry:lock:t1", Duration::from_millis(50)).await.is_ok());
    }
}
