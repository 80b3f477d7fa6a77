// registry-core/src/infrastructure/memory/artifact_store.rs

use async_trait::async_trait;
use dashmap::DashMap;

use crate::ports::artifact_store::ArtifactStore;
use crate::ports::PortError;

#[derive(Default)]
pub struct InMemoryArtifactStore {
    objects: DashMap<String, String>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn put(&self, key: &str, contents: String) -> Result<(), PortError> {
        self.objects.insert(key.to_string(), contents);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, PortError> {
        Ok(self.objects.get(key).map(|v| v.clone()))
    }

    async fn delete(&self, key: &str) -> Result<(), PortError> {
        self.objects.remove(key);
        Ok(())
    }
}
