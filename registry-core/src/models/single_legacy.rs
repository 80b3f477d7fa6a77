// registry-core/src/models/single_legacy.rs
//
// Legacy Single project model (spec.md §4.5 "Single/Composite Legacy
// models differ in three ways"): breaking changes are accepted when
// the deprecated `force`/`experimental_accept_breaking_changes` flags
// are set, policy checks are skipped entirely, and there is no
// contract handling (single-schema projects never had contracts).

use chrono::Utc;

use crate::checks::diff::DiffReport;
use crate::domain::ids::TargetId;
use crate::domain::schema_log::{swap_services, PushLogEntry, SchemaLogAction, SchemaLogEntry};
use crate::domain::schema_version::SchemaVersion;
use crate::error::RegistryError;
use crate::models::conclusion::{SchemaCheckConclusion, SchemaDeleteConclusion, SchemaPublishConclusion};
use crate::models::single::{diff_report, split_changes};
use crate::models::{CheckInput, DeleteInput, ModelContext, PublishInput};
use crate::ports::usage::UsageSelector;

const VALIDATION_WINDOW_DAYS: u32 = 28;
const SINGLE_SERVICE_NAME: &str = "__single__";

fn selector(target_id: TargetId) -> UsageSelector {
    UsageSelector { target_id, validation_window_days: VALIDATION_WINDOW_DAYS }
}

pub async fn check(ctx: &ModelContext<'_>, input: &CheckInput) -> Result<SchemaCheckConclusion, RegistryError> {
    let previous_sdl = ctx.previous_version.as_ref().and_then(|v| v.composite_schema_sdl.clone());
    let selector = selector(ctx.target.id);

    let report: DiffReport = diff_report(previous_sdl.as_deref(), &input.sdl, false, ctx.usage_oracle, &selector, ctx.approved_changes).await;
    let (breaking_changes, safe_changes) = split_changes(&report);

    if report.is_blocked() {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes,
            safe_changes,
            policy_errors: Vec::new(),
            policy_warnings: Vec::new(),
            composition_errors: Vec::new(),
            contract_checks: Vec::new(),
        });
    }

    Ok(SchemaCheckConclusion::Success {
        breaking_changes,
        safe_changes,
        policy_warnings: Vec::new(),
        composite_schema_sdl: Some(input.sdl.clone()),
        supergraph_sdl: None,
        contract_checks: Vec::new(),
    })
}

pub async fn publish(ctx: &ModelContext<'_>, input: &PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
    let previous_sdl = ctx.previous_version.as_ref().and_then(|v| v.composite_schema_sdl.clone());

    if previous_sdl.as_deref() == Some(input.sdl.as_str()) {
        return Ok(SchemaPublishConclusion::Ignored { reason: "schema is identical to the latest version".to_string() });
    }

    let selector = selector(ctx.target.id);
    let report = diff_report(previous_sdl.as_deref(), &input.sdl, false, ctx.usage_oracle, &selector, ctx.approved_changes).await;
    let (breaking_changes, safe_changes) = split_changes(&report);

    let forced = input.force || input.experimental_accept_breaking_changes;
    if report.is_blocked() && !forced {
        return Ok(SchemaPublishConclusion::Rejected { breaking_changes, composition_errors: Vec::new() });
    }

    let previous_logs = ctx.previous_version.as_ref().map(|v| v.active_logs.clone()).unwrap_or_default();
    let incoming_log = SchemaLogEntry {
        id: crate::domain::ids::SchemaLogId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        action: SchemaLogAction::Push(PushLogEntry {
            sdl: input.sdl.clone(),
            service_name: SINGLE_SERVICE_NAME.to_string(),
            service_url: None,
            metadata: input.metadata.clone(),
            author: input.author.clone(),
            commit: input.commit.clone(),
        }),
    };
    let active_logs = swap_services(&previous_logs, &incoming_log);

    let version = SchemaVersion {
        id: crate::domain::ids::SchemaVersionId::new(),
        target_id: ctx.target.id,
        created_at: Utc::now(),
        is_composable: true,
        previous_schema_version_id: ctx.previous_version.as_ref().map(|v| v.id),
        base_schema: None,
        composite_schema_sdl: Some(input.sdl.clone()),
        supergraph_sdl: None,
        tags: None,
        schema_composition_errors: Vec::new(),
        active_logs,
    };

    let mut changes = breaking_changes;
    changes.extend(safe_changes);

    Ok(SchemaPublishConclusion::Accepted {
        version,
        changes,
        version_contracts: Vec::new(),
        make_latest: true,
        make_latest_composable: true,
    })
}

pub async fn delete(_ctx: &ModelContext<'_>, _input: &DeleteInput) -> Result<SchemaDeleteConclusion, RegistryError> {
    Ok(SchemaDeleteConclusion::Rejected { reason: "single-schema projects do not support delete".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrganizationId, ProjectId};
    use crate::domain::project::{OrchestratorKind, Project, ProjectType};
    use crate::domain::target::Target;
    use crate::ports::orchestrator::{CompositionOptions, CompositionResult, Orchestrator, SubgraphInput};
    use crate::ports::PortError;
    use async_trait::async_trait;

    struct NoopOrchestrator;

    #[async_trait]
    impl Orchestrator for NoopOrchestrator {
        async fn compose_and_validate(&self, _schemas: &[SubgraphInput], _options: &CompositionOptions) -> Result<CompositionResult, PortError> {
            Ok(CompositionResult::default())
        }
    }

    fn project() -> Project {
        Project {
            id: ProjectId::new(),
            organization_id: OrganizationId::new(),
            name: "demo".to_string(),
            project_type: ProjectType::Single,
            orchestrator_kind: OrchestratorKind::Single,
            legacy_registry_model: true,
            external_composition: None,
            native_federation: false,
            compare_to_previous_composable_version: false,
            check_retention_days: 7,
            supports_contracts: false,
        }
    }

    fn previous_version(target_id: crate::domain::ids::TargetId) -> SchemaVersion {
        SchemaVersion {
            id: crate::domain::ids::SchemaVersionId::new(),
            target_id,
            created_at: Utc::now(),
            is_composable: true,
            previous_schema_version_id: None,
            base_schema: None,
            composite_schema_sdl: Some("type Query { a: String }".to_string()),
            supergraph_sdl: None,
            tags: None,
            schema_composition_errors: Vec::new(),
            active_logs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn breaking_change_without_force_is_rejected() {
        let project = project();
        let target = Target::new(project.organization_id, project.id, "prod");
        let orchestrator = NoopOrchestrator;
        let approved = Default::default();
        let ctx = ModelContext {
            project: &project,
            target: &target,
            previous_version: Some(previous_version(target.id)),
            approved_changes: &approved,
            orchestrator: &orchestrator,
            policy_engine: None,
            usage_oracle: None,
            contracts: &[],
            contract_baselines: &[],
        };
        let input = PublishInput { sdl: "type Query {}".to_string(), ..Default::default() };
        let conclusion = publish(&ctx, &input).await.unwrap();
        assert!(matches!(conclusion, SchemaPublishConclusion::Rejected { .. }));
    }

    #[tokio::test]
    async fn breaking_change_with_force_is_accepted() {
        let project = project();
        let target = Target::new(project.organization_id, project.id, "prod");
        let orchestrator = NoopOrchestrator;
        let approved = Default::default();
        let ctx = ModelContext {
            project: &project,
            target: &target,
            previous_version: Some(previous_version(target.id)),
            approved_changes: &approved,
            orchestrator: &orchestrator,
            policy_engine: None,
            usage_oracle: None,
            contracts: &[],
            contract_baselines: &[],
        };
        let input = PublishInput { sdl: "type Query {}".to_string(), force: true, ..Default::default() };
        let conclusion = publish(&ctx, &input).await.unwrap();
        assert!(conclusion.is_accepted());
    }
}
