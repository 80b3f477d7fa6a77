// registry-core/src/domain/project.rs

use serde::{Deserialize, Serialize};

use crate::domain::ids::{OrganizationId, ProjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    Single,
    Composite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrchestratorKind {
    Single,
    Federation,
    Stitching,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: ProjectId,
    pub organization_id: OrganizationId,
    pub name: String,
    pub project_type: ProjectType,
    pub orchestrator_kind: OrchestratorKind,
    /// §4.5: selects between the modern and legacy model variant for
    /// this project's `project_type`.
    pub legacy_registry_model: bool,
    /// §4.6: delegate composition to a user-controlled HTTP endpoint.
    pub external_composition: Option<ExternalComposition>,
    /// §4.2: use the in-process native composer instead of the legacy
    /// remote composer.
    pub native_federation: bool,
    /// §4.5.1 step 4: compare against latest-composable instead of
    /// latest when deciding the check baseline.
    pub compare_to_previous_composable_version: bool,
    /// Retention window for schema_checks (§4.6 step 7).
    pub check_retention_days: i64,
    pub supports_contracts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExternalComposition {
    pub endpoint: String,
    pub secret: String,
}

impl Project {
    pub fn model_is_legacy(&self) -> bool {
        self.legacy_registry_model
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Organization {
    pub id: OrganizationId,
    pub name: String,
}
