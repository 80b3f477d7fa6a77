// registry-core/src/application/publisher.rs
//
// The Schema Publisher (spec.md §4.6): the top-level entry point the
// CLI/HTTP surface calls into once authorization has already granted
// access. Owns mutual exclusion, idempotency, context loading, model
// dispatch and persistence — callers never talk to a project model or
// `Storage` directly.

use std::time::Duration;

use chrono::Utc;

use crate::application::artifacts::publish_artifacts_action;
use crate::application::context::{load, resolve_context_id};
use crate::application::idempotency::{idempotency_key, with_idempotency};
use crate::domain::project::ProjectType;
use crate::domain::schema_check::SchemaCheck;
use crate::domain::target::Target;
use crate::domain::{project::Project, schema_version::SchemaVersion};
use crate::error::RegistryError;
use crate::models::conclusion::{SchemaCheckConclusion, SchemaDeleteConclusion, SchemaPublishConclusion};
use crate::models::{composite, composite_legacy, single, single_legacy, CheckInput, DeleteInput, ModelContext, PublishInput};
use crate::ports::artifact_store::ArtifactStore;
use crate::ports::cache::IdempotencyCache;
use crate::ports::lock::DistributedLock;
use crate::ports::notifier::{Notifier, RegistryEvent};
use crate::ports::orchestrator::Orchestrator;
use crate::ports::policy::PolicyEngine;
use crate::ports::storage::{Storage, VersionWrite};
use crate::ports::usage::UsageOracle;

const LOCK_TIMEOUT: Duration = Duration::from_secs(30);

pub struct Publisher<'a> {
    pub storage: &'a dyn Storage,
    pub lock: &'a dyn DistributedLock,
    pub cache: &'a dyn IdempotencyCache,
    pub artifact_store: &'a dyn ArtifactStore,
    pub notifier: &'a dyn Notifier,
    pub orchestrator: &'a dyn Orchestrator,
    pub policy_engine: Option<&'a dyn PolicyEngine>,
    pub usage_oracle: Option<&'a dyn UsageOracle>,
}

impl<'a> Publisher<'a> {
    pub async fn check(&self, target: Target, project: Project, input: CheckInput) -> Result<SchemaCheckConclusion, RegistryError> {
        let guard = self.lock.acquire(&target.lock_key, LOCK_TIMEOUT).await?;

        let key = idempotency_key(&target.id.to_string(), &input)?;
        let conclusion = with_idempotency(self.cache, &key, || self.run_check(&target, &project, &input)).await;

        guard.release().await?;
        let conclusion = conclusion?;
        self.persist_check(&target, &input, &conclusion).await?;
        Ok(conclusion)
    }

    async fn run_check(&self, target: &Target, project: &Project, input: &CheckInput) -> Result<SchemaCheckConclusion, RegistryError> {
        let context_id = resolve_context_id(input.context_id.clone(), input.integration_metadata.as_ref())?;
        let loaded = load(self.storage, target.clone(), project.clone(), context_id.as_deref()).await?;

        let ctx = ModelContext {
            project: &loaded.project,
            target: &loaded.target,
            previous_version: loaded.previous_version,
            approved_changes: &loaded.approved_changes,
            orchestrator: self.orchestrator,
            policy_engine: self.policy_engine,
            usage_oracle: self.usage_oracle,
            contracts: &loaded.contracts,
            contract_baselines: &loaded.contract_baselines,
        };

        match (project.project_type, project.legacy_registry_model) {
            (ProjectType::Single, false) => single::check(&ctx, input).await,
            (ProjectType::Single, true) => single_legacy::check(&ctx, input).await,
            (ProjectType::Composite, false) => composite::check(&ctx, input).await,
            (ProjectType::Composite, true) => composite_legacy::check(&ctx, input).await,
        }
    }

    async fn persist_check(&self, target: &Target, input: &CheckInput, conclusion: &SchemaCheckConclusion) -> Result<(), RegistryError> {
        let now = Utc::now();
        let check = match conclusion {
            SchemaCheckConclusion::Success { breaking_changes, safe_changes, policy_warnings, composite_schema_sdl, supergraph_sdl, contract_checks } => {
                // A Success with non-empty breaking_changes means every
                // one of them was let through by an approval (otherwise
                // the model would have returned Failure) — surface that
                // on the persisted row too (spec.md invariant I4).
                let approved_by = self.approved_by_for(target, input, breaking_changes).await?;
                SchemaCheck {
                    id: crate::domain::ids::SchemaCheckId::new(),
                    target_id: target.id,
                    schema_sdl: input.sdl.clone(),
                    schema_version_id: None,
                    is_success: true,
                    breaking_changes: breaking_changes.clone(),
                    safe_changes: safe_changes.clone(),
                    policy_warnings: policy_warnings.clone(),
                    policy_errors: Vec::new(),
                    composition_errors: Vec::new(),
                    contract_checks: contract_checks.clone(),
                    composite_schema_sdl: composite_schema_sdl.clone(),
                    supergraph_sdl: supergraph_sdl.clone(),
                    context_id: input.context_id.clone(),
                    created_at: now,
                    expires_at: now + chrono::Duration::days(7),
                    integration_metadata: input.integration_metadata.clone(),
                    is_manually_approved: !breaking_changes.is_empty(),
                    approved_by,
                }
            }
            SchemaCheckConclusion::Failure { breaking_changes, safe_changes, policy_errors, policy_warnings, composition_errors, contract_checks } => SchemaCheck {
                id: crate::domain::ids::SchemaCheckId::new(),
                target_id: target.id,
                schema_sdl: input.sdl.clone(),
                schema_version_id: None,
                is_success: false,
                breaking_changes: breaking_changes.clone(),
                safe_changes: safe_changes.clone(),
                policy_warnings: policy_warnings.clone(),
                policy_errors: policy_errors.clone(),
                composition_errors: composition_errors.clone(),
                contract_checks: contract_checks.clone(),
                composite_schema_sdl: None,
                supergraph_sdl: None,
                context_id: input.context_id.clone(),
                created_at: now,
                expires_at: now + chrono::Duration::days(7),
                integration_metadata: input.integration_metadata.clone(),
                is_manually_approved: false,
                approved_by: None,
            },
        };
        self.storage.create_schema_check(check).await?;
        Ok(())
    }

    /// Looks up who approved an already-passed breaking change, for the
    /// `approved_by` column on the persisted `SchemaCheck`. Re-fetches
    /// the approvals for this context rather than threading them down
    /// from `run_check`, since idempotency caching means `run_check`
    /// may not have actually run for this call.
    async fn approved_by_for(
        &self,
        target: &Target,
        input: &CheckInput,
        breaking_changes: &[crate::domain::schema_change::SchemaChange],
    ) -> Result<Option<String>, RegistryError> {
        if breaking_changes.is_empty() {
            return Ok(None);
        }
        let context_id = resolve_context_id(input.context_id.clone(), input.integration_metadata.as_ref())?;
        let Some(context_id) = context_id else {
            return Ok(None);
        };
        let approved_changes = self.storage.get_approved_schema_changes_for_context_id(target.id, &context_id).await?;
        Ok(breaking_changes.iter().find_map(|c| approved_changes.get(&c.id)).map(|a| a.approved_by.clone()))
    }

    pub async fn publish(&self, target: Target, project: Project, input: PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
        let guard = self.lock.acquire(&target.lock_key, LOCK_TIMEOUT).await?;
        let result = self.publish_locked(&target, &project, input).await;
        guard.release().await?;
        result
    }

    async fn publish_locked(&self, target: &Target, project: &Project, input: PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
        let key = idempotency_key(&target.id.to_string(), &input)?;
        let conclusion = with_idempotency(self.cache, &key, || self.run_publish(target, project, &input)).await?;

        if let SchemaPublishConclusion::Accepted { version, changes, version_contracts, make_latest, make_latest_composable } = &conclusion {
            let action = publish_artifacts_action(self.artifact_store, target.id, version, &[], version_contracts);
            let write = VersionWrite {
                version: version.clone(),
                changes: changes.clone(),
                version_contracts: version_contracts.clone(),
                make_latest: *make_latest,
                make_latest_composable: *make_latest_composable,
            };
            self.storage.create_schema_version(write, action).await?;
            self.notify_publish(target.id, version, changes.is_empty()).await;
        }

        Ok(conclusion)
    }

    async fn run_publish(&self, target: &Target, project: &Project, input: &PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
        let loaded = load(self.storage, target.clone(), project.clone(), None).await?;
        let ctx = ModelContext {
            project: &loaded.project,
            target: &loaded.target,
            previous_version: loaded.previous_version,
            approved_changes: &loaded.approved_changes,
            orchestrator: self.orchestrator,
            policy_engine: self.policy_engine,
            usage_oracle: self.usage_oracle,
            contracts: &loaded.contracts,
            contract_baselines: &loaded.contract_baselines,
        };

        match (project.project_type, project.legacy_registry_model) {
            (ProjectType::Single, false) => single::publish(&ctx, input).await,
            (ProjectType::Single, true) => single_legacy::publish(&ctx, input).await,
            (ProjectType::Composite, false) => composite::publish(&ctx, input).await,
            (ProjectType::Composite, true) => composite_legacy::publish(&ctx, input).await,
        }
    }

    async fn notify_publish(&self, target_id: crate::domain::ids::TargetId, version: &SchemaVersion, changes_empty: bool) {
        if changes_empty && version.schema_composition_errors.is_empty() {
            return;
        }
        let event = RegistryEvent::SchemaPublished { target_id, version_id: version.id, is_composable: version.is_composable };
        if let Err(err) = self.notifier.notify(event).await {
            tracing::warn!(error = %err, "notification fan-out failed, publish already committed");
        }
    }

    pub async fn delete(&self, target: Target, project: Project, input: DeleteInput) -> Result<SchemaDeleteConclusion, RegistryError> {
        let guard = self.lock.acquire(&target.lock_key, LOCK_TIMEOUT).await?;
        let result = self.delete_locked(&target, &project, input).await;
        guard.release().await?;
        result
    }

    async fn delete_locked(&self, target: &Target, project: &Project, input: DeleteInput) -> Result<SchemaDeleteConclusion, RegistryError> {
        let loaded = load(self.storage, target.clone(), project.clone(), None).await?;
        let ctx = ModelContext {
            project: &loaded.project,
            target: &loaded.target,
            previous_version: loaded.previous_version,
            approved_changes: &loaded.approved_changes,
            orchestrator: self.orchestrator,
            policy_engine: self.policy_engine,
            usage_oracle: self.usage_oracle,
            contracts: &loaded.contracts,
            contract_baselines: &loaded.contract_baselines,
        };

        let conclusion = match (project.project_type, project.legacy_registry_model) {
            (ProjectType::Single, false) => single::delete(&ctx, &input).await?,
            (ProjectType::Single, true) => single_legacy::delete(&ctx, &input).await?,
            (ProjectType::Composite, false) => composite::delete(&ctx, &input).await?,
            (ProjectType::Composite, true) => composite_legacy::delete(&ctx, &input).await?,
        };

        if let SchemaDeleteConclusion::Accepted { version } = &conclusion {
            if !input.dry_run {
                let action = publish_artifacts_action(self.artifact_store, target.id, version, &[], &[]);
                let write = VersionWrite {
                    version: version.clone(),
                    changes: Vec::new(),
                    version_contracts: Vec::new(),
                    make_latest: true,
                    make_latest_composable: version.is_composable,
                };
                self.storage.delete_schema(write, action).await?;

                let event = RegistryEvent::SchemaDeleted { target_id: target.id, version_id: version.id, service_name: input.service_name.clone() };
                if let Err(err) = self.notifier.notify(event).await {
                    tracing::warn!(error = %err, "notification fan-out failed, delete already committed");
                }
            }
        }

        Ok(conclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrganizationId, ProjectId};
    use crate::domain::project::OrchestratorKind;
    use crate::infrastructure::memory::artifact_store::InMemoryArtifactStore;
    use crate::infrastructure::memory::cache::InMemoryCache;
    use crate::infrastructure::memory::lock::InMemoryLock;
    use crate::infrastructure::memory::notifier::InMemoryNotifier;
    use crate::infrastructure::memory::storage::InMemoryStorage;
    use crate::ports::orchestrator::{CompositionOptions, CompositionResult, SubgraphInput};
    use crate::ports::PortError;
    use async_trait::async_trait;

    struct NoopOrchestrator;

    #[async_trait]
    impl Orchestrator for NoopOrchestrator {
        async fn compose_and_validate(&self, _schemas: &[SubgraphInput], _options: &CompositionOptions) -> Result<CompositionResult, PortError> {
            Ok(CompositionResult::default())
        }
    }

    fn single_project() -> Project {
        Project {
            id: ProjectId::new(),
            organization_id: OrganizationId::new(),
            name: "demo".to_string(),
            project_type: ProjectType::Single,
            orchestrator_kind: OrchestratorKind::Single,
            legacy_registry_model: false,
            external_composition: None,
            native_federation: false,
            compare_to_previous_composable_version: false,
            check_retention_days: 7,
            supports_contracts: false,
        }
    }

    #[tokio::test]
    async fn publish_then_check_round_trip() {
        let storage = InMemoryStorage::new();
        let lock = InMemoryLock::new();
        let cache = InMemoryCache::new();
        let artifact_store = InMemoryArtifactStore::new();
        let notifier = InMemoryNotifier::new();
        let orchestrator = NoopOrchestrator;

        let publisher = Publisher {
            storage: &storage,
            lock: &lock,
            cache: &cache,
            artifact_store: &artifact_store,
            notifier: &notifier,
            orchestrator: &orchestrator,
            policy_engine: None,
            usage_oracle: None,
        };

        let project = single_project();
        let target = Target::new(project.organization_id, project.id, "prod");

        let publish_input = PublishInput { sdl: "type Query { a: String }".to_string(), ..Default::default() };
        let conclusion = publisher.publish(target.clone(), project.clone(), publish_input).await.unwrap();
        assert!(conclusion.is_accepted());

        let check_input = CheckInput { sdl: "type Query { a: String b: Int }".to_string(), ..Default::default() };
        let check_conclusion = publisher.check(target.clone(), project.clone(), check_input).await.unwrap();
        assert!(check_conclusion.is_success());

        assert!(!notifier.events().await.is_empty());
    }
}
