// registry-core/src/domain/schema_check.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{SchemaCheckId, SchemaVersionId, TargetId};
use crate::domain::schema_change::SchemaChange;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyWarning {
    pub rule: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyError {
    pub rule: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompositionError {
    pub message: String,
    pub source: CompositionErrorSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionErrorSource {
    Graphql,
    Composition,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContractCheckResult {
    pub contract_id: crate::domain::ids::ContractId,
    pub contract_name: String,
    pub is_successful: bool,
    pub changes: Vec<SchemaChange>,
    pub composition_errors: Vec<CompositionError>,
    pub composite_schema_sdl: Option<String>,
    pub supergraph_sdl: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrationMetadata {
    pub repository: Option<String>,
    pub pull_request_number: Option<u64>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaCheck {
    pub id: SchemaCheckId,
    pub target_id: TargetId,
    pub schema_sdl: String,
    pub schema_version_id: Option<SchemaVersionId>,
    pub is_success: bool,
    pub breaking_changes: Vec<SchemaChange>,
    pub safe_changes: Vec<SchemaChange>,
    pub policy_warnings: Vec<PolicyWarning>,
    pub policy_errors: Vec<PolicyError>,
    pub composition_errors: Vec<CompositionError>,
    pub contract_checks: Vec<ContractCheckResult>,
    pub composite_schema_sdl: Option<String>,
    pub supergraph_sdl: Option<String>,
    pub context_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub integration_metadata: Option<IntegrationMetadata>,
    pub is_manually_approved: bool,
    pub approved_by: Option<String>,
}

impl SchemaCheck {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}
