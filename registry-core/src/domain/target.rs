// registry-core/src/domain/target.rs

use serde::{Deserialize, Serialize};

use crate::domain::ids::{OrganizationId, ProjectId, SchemaVersionId, TargetId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub id: TargetId,
    pub organization_id: OrganizationId,
    pub project_id: ProjectId,
    pub name: String,
    pub latest_version_id: Option<SchemaVersionId>,
    pub latest_composable_version_id: Option<SchemaVersionId>,
    /// `registry:lock:{target_id}` — the key every state-mutating
    /// operation on this target serializes on (spec.md §5).
    pub lock_key: String,
}

impl Target {
    pub fn new(organization_id: OrganizationId, project_id: ProjectId, name: impl Into<String>) -> Self {
        let id = TargetId::new();
        Self {
            id,
            organization_id,
            project_id,
            name: name.into(),
            latest_version_id: None,
            latest_composable_version_id: None,
            lock_key: format!("registry:lock:{id}"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.latest_version_id.is_none()
    }
}
