// registry-core/src/ports/notifier.rs
//
// Fire-and-forget fan-out after a publish/delete accept (spec.md §4.6
// step 8). Failures here must never roll back the write that already
// committed — the publisher logs and moves on.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::ids::{SchemaVersionId, TargetId};
use crate::ports::PortError;

#[derive(Debug, Clone, Serialize)]
pub enum RegistryEvent {
    SchemaPublished { target_id: TargetId, version_id: SchemaVersionId, is_composable: bool },
    SchemaDeleted { target_id: TargetId, version_id: SchemaVersionId, service_name: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: RegistryEvent) -> Result<(), PortError>;
}
