// registry-core/src/application/context.rs
//
// Schema Publisher step 4-5 (spec.md §4.6): parallel context loading
// plus context-id resolution. Everything here is read-only — the
// result feeds a [`crate::models::ModelContext`] borrow, never mutated
// in place.

use futures::future::try_join3;

use crate::domain::approval::ApprovedChanges;
use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::error::DomainError;
use crate::domain::project::Project;
use crate::domain::schema_check::IntegrationMetadata;
use crate::domain::schema_version::SchemaVersion;
use crate::domain::target::Target;
use crate::error::RegistryError;
use crate::ports::storage::Storage;

pub struct LoadedContext {
    pub target: Target,
    pub project: Project,
    pub previous_version: Option<SchemaVersion>,
    pub approved_changes: ApprovedChanges,
    pub contracts: Vec<Contract>,
    pub contract_baselines: Vec<SchemaVersionContract>,
}

/// Resolves the baseline version, approvals and contract state for a
/// single check/publish/delete request. Spec.md's step 4 also fetches
/// target/project/organization rows; those are assumed already loaded
/// by the caller (CLI/API layer) since they come from the same
/// authorization lookup that gated entry into the pipeline.
pub async fn load(storage: &dyn Storage, target: Target, project: Project, context_id: Option<&str>) -> Result<LoadedContext, RegistryError> {
    let previous_version_fut = async {
        if project.compare_to_previous_composable_version {
            storage.get_maybe_latest_valid_version(target.id).await
        } else {
            storage.get_maybe_latest_version(target.id).await
        }
    };
    let approved_changes_fut = async {
        match context_id {
            Some(id) => storage.get_approved_schema_changes_for_context_id(target.id, id).await,
            None => Ok(ApprovedChanges::new()),
        }
    };
    let contracts_fut = async {
        if project.supports_contracts {
            storage.get_contracts(target.id).await
        } else {
            Ok(Vec::new())
        }
    };

    let (previous_version, approved_changes, contracts) = try_join3(previous_version_fut, approved_changes_fut, contracts_fut).await?;

    let mut contract_baselines = Vec::with_capacity(contracts.len());
    for contract in &contracts {
        if let Some(baseline) = storage.get_latest_valid_version_contract(contract.id).await? {
            contract_baselines.push(baseline);
        }
    }

    Ok(LoadedContext { target, project, previous_version, approved_changes, contracts, contract_baselines })
}

/// Explicit `context_id` wins; otherwise synthesize `"{repo}#{pr}"`
/// from integration metadata when both halves are present (spec.md
/// §4.6 step 5). Validated to 1..=200 characters either way.
pub fn resolve_context_id(explicit: Option<String>, integration_metadata: Option<&IntegrationMetadata>) -> Result<Option<String>, RegistryError> {
    let resolved = explicit.or_else(|| {
        let meta = integration_metadata?;
        let repo = meta.repository.as_ref()?;
        let pr = meta.pull_request_number?;
        Some(format!("{repo}#{pr}"))
    });

    match resolved {
        Some(id) if !(1..=200).contains(&id.len()) => Err(DomainError::InvalidContextId(id).into()),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_context_id_wins_over_integration_metadata() {
        let meta = IntegrationMetadata { repository: Some("org/repo".to_string()), pull_request_number: Some(42), commit_sha: None };
        let resolved = resolve_context_id(Some("explicit".to_string()), Some(&meta)).unwrap();
        assert_eq!(resolved.as_deref(), Some("explicit"));
    }

    #[test]
    fn integration_metadata_synthesizes_context_id() {
        let meta = IntegrationMetadata { repository: Some("org/repo".to_string()), pull_request_number: Some(42), commit_sha: None };
        let resolved = resolve_context_id(None, Some(&meta)).unwrap();
        assert_eq!(resolved.as_deref(), Some("org/repo#42"));
    }

    #[test]
    fn no_metadata_and_no_explicit_id_resolves_to_none() {
        let resolved = resolve_context_id(None, None).unwrap();
        assert!(resolved.is_none());
    }

    #[test]
    fn oversized_context_id_is_rejected() {
        let oversized = "a".repeat(201);
        assert!(resolve_context_id(Some(oversized), None).is_err());
    }
}
