// registry-core/src/infrastructure/memory/notifier.rs
//
// Records events instead of fanning them out anywhere; used by the
// CLI demo and tests to assert a publish/delete notified as expected.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::ports::notifier::{Notifier, RegistryEvent};
use crate::ports::PortError;

#[derive(Default)]
pub struct InMemoryNotifier {
    events: Mutex<Vec<RegistryEvent>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<RegistryEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn notify(&self, event: RegistryEvent) -> Result<(), PortError> {
        tracing::info!(?event, "registry event");
        self.events.lock().await.push(event);
        Ok(())
    }
}
