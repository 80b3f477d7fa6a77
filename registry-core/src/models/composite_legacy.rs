// registry-core/src/models/composite_legacy.rs
//
// Legacy Composite project model: same subgraph-composition pipeline
// as the modern model, but breaking changes are accepted under the
// deprecated `force` flag, policy checks never run, and contracts
// collapse to "no contracts" (spec.md §4.5 "Single/Composite Legacy
// models differ in three ways").

use chrono::Utc;

use crate::checks::{federation_filter, service_name as service_name_check, service_url as service_url_check, url_change};
use crate::domain::ids::TargetId;
use crate::domain::project::OrchestratorKind;
use crate::domain::schema_check::{CompositionError, CompositionErrorSource};
use crate::models::composite::validation_failure;
use crate::domain::schema_log::{swap_services, DeleteLogEntry, PushLogEntry, SchemaLogAction, SchemaLogEntry};
use crate::domain::schema_version::SchemaVersion;
use crate::error::RegistryError;
use crate::models::conclusion::{SchemaCheckConclusion, SchemaDeleteConclusion, SchemaPublishConclusion};
use crate::models::single::{diff_report, split_changes};
use crate::models::{CheckInput, DeleteInput, ModelContext, PublishInput};
use crate::ports::orchestrator::{CompositionOptions, ExternalComposerOptions, SubgraphInput};
use crate::ports::usage::UsageSelector;

const VALIDATION_WINDOW_DAYS: u32 = 28;

fn selector(target_id: TargetId) -> UsageSelector {
    UsageSelector { target_id, validation_window_days: VALIDATION_WINDOW_DAYS }
}

fn subgraph_inputs(logs: &[SchemaLogEntry]) -> Vec<SubgraphInput> {
    logs.iter()
        .filter_map(|log| log.as_push())
        .map(|push| SubgraphInput { name: push.service_name.clone(), sdl: push.sdl.clone(), url: push.service_url.clone() })
        .collect()
}

fn composition_options(ctx: &ModelContext<'_>) -> CompositionOptions {
    // Legacy models never composed per-contract; the registry did not
    // yet have the concept when these projects were created.
    CompositionOptions {
        external: ctx.project.external_composition.as_ref().map(|e| ExternalComposerOptions { endpoint: e.endpoint.clone(), secret: e.secret.clone() }),
        native: ctx.project.native_federation,
        contracts: Vec::new(),
    }
}

fn is_federation(ctx: &ModelContext<'_>) -> bool {
    ctx.project.orchestrator_kind == OrchestratorKind::Federation
}

fn to_domain_composition_errors(orchestrator_errors: &[crate::ports::orchestrator::OrchestratorErrorEntry]) -> Vec<CompositionError> {
    orchestrator_errors
        .iter()
        .map(|e| CompositionError {
            message: e.message.clone(),
            source: match e.source {
                crate::ports::orchestrator::ErrorSource::Graphql => CompositionErrorSource::Graphql,
                crate::ports::orchestrator::ErrorSource::Composition => CompositionErrorSource::Composition,
            },
        })
        .collect()
}

pub async fn check(ctx: &ModelContext<'_>, input: &CheckInput) -> Result<SchemaCheckConclusion, RegistryError> {
    let Some(service_name) = input.service_name.clone() else {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes: Vec::new(),
            safe_changes: Vec::new(),
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors: validation_failure("MISSING_SERVICE_NAME", "composite checks require a service_name"),
            contract_checks: Vec::new(),
        });
    };

    let previous_logs = ctx.previous_version.as_ref().map(|v| v.active_logs.clone()).unwrap_or_default();
    let incoming_log = SchemaLogEntry {
        id: crate::domain::ids::SchemaLogId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        action: SchemaLogAction::Push(PushLogEntry {
            sdl: input.sdl.clone(),
            service_name: service_name.clone(),
            service_url: input.service_url.clone(),
            metadata: input.metadata.clone(),
            author: None,
            commit: None,
        }),
    };
    let candidate_logs = swap_services(&previous_logs, &incoming_log);

    if let crate::checks::Outcome::Failed(reason) = service_name_check::run(&candidate_logs) {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes: Vec::new(),
            safe_changes: Vec::new(),
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors: validation_failure("DUPLICATE_SERVICE_NAME", reason),
            contract_checks: Vec::new(),
        });
    }
    if let crate::checks::Outcome::Failed(reason) = service_url_check::run(input.service_url.as_deref(), true) {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes: Vec::new(),
            safe_changes: Vec::new(),
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors: validation_failure("MISSING_SERVICE_URL", reason),
            contract_checks: Vec::new(),
        });
    }

    let composition = ctx.orchestrator.compose_and_validate(&subgraph_inputs(&candidate_logs), &composition_options(ctx)).await?;
    let composition_errors = to_domain_composition_errors(&composition.errors);

    if !composition.is_composable() {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes: Vec::new(),
            safe_changes: Vec::new(),
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors,
            contract_checks: Vec::new(),
        });
    }

    let composite_sdl = composition.sdl.clone().ok_or_else(|| {
        RegistryError::InternalError("orchestrator reported composable=true but returned no sdl".to_string())
    })?;

    let baseline_sdl = ctx.previous_version.as_ref().and_then(|v| v.composite_schema_sdl.clone());
    let selector = selector(ctx.target.id);
    let report = diff_report(baseline_sdl.as_deref(), &composite_sdl, is_federation(ctx), ctx.usage_oracle, &selector, ctx.approved_changes).await;
    let (breaking_changes, mut safe_changes) = split_changes(&report);

    if let Some(url_change) = url_change::detect(&previous_logs, &service_name, input.service_url.as_deref()) {
        safe_changes.push(url_change);
    }

    if report.is_blocked() {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes,
            safe_changes,
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors,
            contract_checks: Vec::new(),
        });
    }

    Ok(SchemaCheckConclusion::Success {
        breaking_changes,
        safe_changes,
        policy_warnings: Vec::new(),
        composite_schema_sdl: Some(composite_sdl),
        supergraph_sdl: composition.supergraph,
        contract_checks: Vec::new(),
    })
}

pub async fn publish(ctx: &ModelContext<'_>, input: &PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
    let Some(service_name) = input.service_name.clone() else {
        return Ok(SchemaPublishConclusion::Rejected {
            breaking_changes: Vec::new(),
            composition_errors: validation_failure("MISSING_SERVICE_NAME", "composite publishes require a service_name"),
        });
    };

    let previous_logs = ctx.previous_version.as_ref().map(|v| v.active_logs.clone()).unwrap_or_default();
    let incoming_log = SchemaLogEntry {
        id: crate::domain::ids::SchemaLogId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        action: SchemaLogAction::Push(PushLogEntry {
            sdl: input.sdl.clone(),
            service_name: service_name.clone(),
            service_url: input.service_url.clone(),
            metadata: input.metadata.clone(),
            author: input.author.clone(),
            commit: input.commit.clone(),
        }),
    };
    let active_logs = swap_services(&previous_logs, &incoming_log);

    if let crate::checks::Outcome::Failed(reason) = service_name_check::run(&active_logs) {
        return Ok(SchemaPublishConclusion::Rejected {
            breaking_changes: Vec::new(),
            composition_errors: validation_failure("DUPLICATE_SERVICE_NAME", reason),
        });
    }
    if let crate::checks::Outcome::Failed(reason) = service_url_check::run(input.service_url.as_deref(), true) {
        return Ok(SchemaPublishConclusion::Rejected {
            breaking_changes: Vec::new(),
            composition_errors: validation_failure("MISSING_SERVICE_URL", reason),
        });
    }

    let composition = ctx.orchestrator.compose_and_validate(&subgraph_inputs(&active_logs), &composition_options(ctx)).await?;
    let composition_errors = to_domain_composition_errors(&composition.errors);
    let is_composable = composition.is_composable();

    let baseline_sdl = ctx.previous_version.as_ref().and_then(|v| v.composite_schema_sdl.clone());
    let (breaking_changes, mut changes) = if is_composable {
        if let Some(ref composite_sdl) = composition.sdl {
            let selector = selector(ctx.target.id);
            let report = diff_report(baseline_sdl.as_deref(), composite_sdl, is_federation(ctx), ctx.usage_oracle, &selector, ctx.approved_changes).await;
            split_changes(&report)
        } else {
            (Vec::new(), Vec::new())
        }
    } else {
        (Vec::new(), Vec::new())
    };

    let forced = input.force || input.experimental_accept_breaking_changes;
    let blocked = breaking_changes.iter().any(|c| c.is_blocking(ctx.approved_changes.contains_key(&c.id)));
    if !is_composable {
        return Ok(SchemaPublishConclusion::Rejected { breaking_changes, composition_errors });
    }
    if blocked && !forced {
        return Ok(SchemaPublishConclusion::Rejected { breaking_changes, composition_errors });
    }

    let breaking_changes = if blocked {
        federation_filter::filter_out_federation_changes(breaking_changes, is_federation(ctx))
    } else {
        breaking_changes
    };

    if let Some(change) = url_change::detect(&previous_logs, &service_name, input.service_url.as_deref()) {
        changes.push(change);
    }
    changes.splice(0..0, breaking_changes);

    let version = SchemaVersion {
        id: crate::domain::ids::SchemaVersionId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        is_composable,
        previous_schema_version_id: ctx.previous_version.as_ref().map(|v| v.id),
        base_schema: None,
        composite_schema_sdl: composition.sdl,
        supergraph_sdl: composition.supergraph,
        tags: None,
        schema_composition_errors: composition_errors.iter().map(|e| e.message.clone()).collect(),
        active_logs,
    };

    Ok(SchemaPublishConclusion::Accepted {
        version,
        changes,
        version_contracts: Vec::new(),
        make_latest: true,
        make_latest_composable: is_composable,
    })
}

pub async fn delete(ctx: &ModelContext<'_>, input: &DeleteInput) -> Result<SchemaDeleteConclusion, RegistryError> {
    let Some(previous) = ctx.previous_version.clone() else {
        return Ok(SchemaDeleteConclusion::Rejected { reason: "target has no published schema to delete from".to_string() });
    };

    if !previous.active_logs.iter().any(|l| l.service_name() == input.service_name) {
        return Ok(SchemaDeleteConclusion::Rejected { reason: format!("service {} is not currently published", input.service_name) });
    }

    let delete_log = SchemaLogEntry {
        id: crate::domain::ids::SchemaLogId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        action: SchemaLogAction::Delete(DeleteLogEntry { service_name: input.service_name.clone() }),
    };
    let active_logs = swap_services(&previous.active_logs, &delete_log);

    if input.dry_run {
        return Ok(SchemaDeleteConclusion::Accepted { version: SchemaVersion { active_logs, ..previous } });
    }

    let composition = ctx.orchestrator.compose_and_validate(&subgraph_inputs(&active_logs), &composition_options(ctx)).await?;
    let composition_errors = to_domain_composition_errors(&composition.errors);
    let is_composable = composition.is_composable();

    let version = SchemaVersion {
        id: crate::domain::ids::SchemaVersionId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        is_composable,
        previous_schema_version_id: Some(previous.id),
        base_schema: None,
        composite_schema_sdl: composition.sdl,
        supergraph_sdl: composition.supergraph,
        tags: None,
        schema_composition_errors: composition_errors.iter().map(|e| e.message.clone()).collect(),
        active_logs,
    };

    Ok(SchemaDeleteConclusion::Accepted { version })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrganizationId, ProjectId};
    use crate::domain::project::{Project, ProjectType};
    use crate::domain::target::Target;
    use crate::ports::orchestrator::{CompositionResult, Orchestrator};
    use crate::ports::PortError;
    use async_trait::async_trait;

    struct StubOrchestrator;

    #[async_trait]
    impl Orchestrator for StubOrchestrator {
        async fn compose_and_validate(&self, schemas: &[SubgraphInput], _options: &CompositionOptions) -> Result<CompositionResult, PortError> {
            let sdl = schemas.iter().map(|s| s.sdl.clone()).collect::<Vec<_>>().join("\n");
            Ok(CompositionResult { sdl: Some(sdl.clone()), supergraph: Some(sdl), ..Default::default() })
        }
    }

    fn project() -> Project {
        Project {
            id: ProjectId::new(),
            organization_id: OrganizationId::new(),
            name: "demo".to_string(),
            project_type: ProjectType::Composite,
            orchestrator_kind: OrchestratorKind::Federation,
            legacy_registry_model: true,
            external_composition: None,
            native_federation: true,
            compare_to_previous_composable_version: false,
            check_retention_days: 7,
            supports_contracts: false,
        }
    }

    #[tokio::test]
    async fn publish_without_baseline_is_accepted() {
        let project = project();
        let target = Target::new(project.organization_id, project.id, "prod");
        let orchestrator = StubOrchestrator;
        let approved = Default::default();
        let ctx = ModelContext {
            project: &project,
            target: &target,
            previous_version: None,
            approved_changes: &approved,
            orchestrator: &orchestrator,
            policy_engine: None,
            usage_oracle: None,
            contracts: &[],
            contract_baselines: &[],
        };
        let input = PublishInput {
            sdl: "type Query { a: String }".to_string(),
            service_name: Some("users".to_string()),
            service_url: Some("https://users.internal".to_string()),
            ..Default::default()
        };
        let conclusion = publish(&ctx, &input).await.unwrap();
        assert!(conclusion.is_accepted());
    }
}
