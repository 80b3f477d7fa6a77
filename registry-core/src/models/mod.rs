// registry-core/src/models/mod.rs
//
// Project models (spec.md §4.5): the four check/publish/delete state
// machines — Single/Composite crossed with modern/legacy. The
// publisher (`application::publisher`) loads a `ModelContext` once per
// request and dispatches into exactly one of these based on
// `project.project_type` and `project.legacy_registry_model`.

pub mod composite;
pub mod composite_legacy;
pub mod conclusion;
pub mod single;
pub mod single_legacy;

use serde::{Deserialize, Serialize};

use crate::domain::approval::ApprovedChanges;
use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::project::Project;
use crate::domain::schema_check::IntegrationMetadata;
use crate::domain::schema_version::SchemaVersion;
use crate::domain::target::Target;
use crate::ports::orchestrator::Orchestrator;
use crate::ports::policy::PolicyEngine;
use crate::ports::usage::UsageOracle;

pub struct ModelContext<'a> {
    pub project: &'a Project,
    pub target: &'a Target,
    pub previous_version: Option<SchemaVersion>,
    pub approved_changes: &'a ApprovedChanges,
    pub orchestrator: &'a dyn Orchestrator,
    pub policy_engine: Option<&'a dyn PolicyEngine>,
    pub usage_oracle: Option<&'a dyn UsageOracle>,
    pub contracts: &'a [Contract],
    pub contract_baselines: &'a [SchemaVersionContract],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInput {
    pub sdl: String,
    pub service_name: Option<String>,
    pub service_url: Option<String>,
    pub metadata: Option<String>,
    pub context_id: Option<String>,
    pub integration_metadata: Option<IntegrationMetadata>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublishInput {
    pub sdl: String,
    pub service_name: Option<String>,
    pub service_url: Option<String>,
    pub metadata: Option<String>,
    pub author: Option<String>,
    pub commit: Option<String>,
    /// Deprecated escape hatch (spec.md §9 open question #3): accepted
    /// on every request, honored only by the legacy models.
    pub force: bool,
    pub experimental_accept_breaking_changes: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteInput {
    pub service_name: String,
    pub dry_run: bool,
}
