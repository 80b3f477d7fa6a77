// registry-core/src/models/conclusion.rs
//
// The three outcomes a project model produces (spec.md §6 "inbound
// ops"). These are what the publisher persists and what the CLI/API
// surface renders — never a bare `Result`, because "rejected with
// blocking changes" is a normal, expected outcome, not an error.

use serde::{Deserialize, Serialize};

use crate::domain::contract::SchemaVersionContract;
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_check::{CompositionError, ContractCheckResult, PolicyError, PolicyWarning};
use crate::domain::schema_version::SchemaVersion;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaCheckConclusion {
    Success {
        // Non-empty only when the check succeeded despite breaking
        // changes because every one of them was approved (spec.md §4.4
        // "approval application") — an empty diff never populates this.
        breaking_changes: Vec<SchemaChange>,
        safe_changes: Vec<SchemaChange>,
        policy_warnings: Vec<PolicyWarning>,
        composite_schema_sdl: Option<String>,
        supergraph_sdl: Option<String>,
        contract_checks: Vec<ContractCheckResult>,
    },
    Failure {
        breaking_changes: Vec<SchemaChange>,
        safe_changes: Vec<SchemaChange>,
        policy_errors: Vec<PolicyError>,
        policy_warnings: Vec<PolicyWarning>,
        composition_errors: Vec<CompositionError>,
        contract_checks: Vec<ContractCheckResult>,
    },
}

impl SchemaCheckConclusion {
    pub fn is_success(&self) -> bool {
        matches!(self, SchemaCheckConclusion::Success { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaPublishConclusion {
    Accepted {
        version: SchemaVersion,
        changes: Vec<SchemaChange>,
        version_contracts: Vec<SchemaVersionContract>,
        make_latest: bool,
        make_latest_composable: bool,
    },
    Ignored {
        reason: String,
    },
    Rejected {
        breaking_changes: Vec<SchemaChange>,
        composition_errors: Vec<CompositionError>,
    },
}

impl SchemaPublishConclusion {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SchemaPublishConclusion::Accepted { .. })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SchemaDeleteConclusion {
    Accepted { version: SchemaVersion },
    Rejected { reason: String },
}

impl SchemaDeleteConclusion {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SchemaDeleteConclusion::Accepted { .. })
    }
}
