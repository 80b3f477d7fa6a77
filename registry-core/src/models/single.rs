// registry-core/src/models/single.rs
//
// Modern Single project model (spec.md §4.5.1): one schema per
// target, no subgraph composition. Checks and publishes diff straight
// against the latest (or latest-composable, per
// `compare_to_previous_composable_version`) version's SDL.

use chrono::Utc;

use crate::checks::diff::DiffReport;
use crate::checks::{diff as diff_check, policy as policy_check};
use crate::domain::ids::TargetId;
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_log::{swap_services, PushLogEntry, SchemaLogAction, SchemaLogEntry};
use crate::domain::schema_version::SchemaVersion;
use crate::error::RegistryError;
use crate::models::conclusion::{SchemaCheckConclusion, SchemaDeleteConclusion, SchemaPublishConclusion};
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

    let policy_outcome = policy_check::run(ctx.policy_engine, previous_sdl.as_deref().unwrap_or_default(), &input.sdl).await;
    let (policy_errors, policy_warnings) = policy_conclusion_parts(&policy_outcome);

    let report = diff_report(previous_sdl.as_deref(), &input.sdl, false, ctx.usage_oracle, &selector, ctx.approved_changes).await;
    let (breaking_changes, safe_changes) = split_changes(&report);

    if !policy_errors.is_empty() || report.is_blocked() {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes,
            safe_changes,
            policy_errors,
            policy_warnings,
            composition_errors: Vec::new(),
            contract_checks: Vec::new(),
        });
    }

    Ok(SchemaCheckConclusion::Success {
        breaking_changes,
        safe_changes,
        policy_warnings,
        composite_schema_sdl: Some(input.sdl.clone()),
        supergraph_sdl: None,
        contract_checks: Vec::new(),
    })
}

pub async fn publish(ctx: &ModelContext<'_>, input: &PublishInput) -> Result<SchemaPublishConclusion, RegistryError> {
    let previous_sdl = ctx.previous_version.as_ref().and_then(|v| v.composite_schema_sdl.clone());

    let unchanged = previous_sdl.as_deref() == Some(input.sdl.as_str());
    if unchanged {
        return Ok(SchemaPublishConclusion::Ignored { reason: "schema is identical to the latest version".to_string() });
    }

    let selector = selector(ctx.target.id);
    let report = diff_report(previous_sdl.as_deref(), &input.sdl, false, ctx.usage_oracle, &selector, ctx.approved_changes).await;
    let (breaking_changes, safe_changes) = split_changes(&report);
    let accept = !report.is_blocked() || input.experimental_accept_breaking_changes;

    if !accept {
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

/// Runs the `diff` check primitive and unwraps its `Outcome`: `Skipped`
/// (no previous version) is indistinguishable from "nothing changed"
/// for a project model, since there is nothing to reject against.
pub(crate) async fn diff_report(
    previous_sdl: Option<&str>,
    incoming_sdl: &str,
    is_federation: bool,
    usage_oracle: Option<&dyn crate::ports::usage::UsageOracle>,
    selector: &UsageSelector,
    approved: &crate::domain::approval::ApprovedChanges,
) -> DiffReport {
    match diff_check::run(previous_sdl, incoming_sdl, is_federation, usage_oracle, selector, approved).await {
        crate::checks::Outcome::Completed(report) => report,
        _ => DiffReport { all_changes: Vec::new(), blocking_changes: Vec::new() },
    }
}

pub(crate) fn split_changes(report: &DiffReport) -> (Vec<SchemaChange>, Vec<SchemaChange>) {
    let (breaking, safe): (Vec<SchemaChange>, Vec<SchemaChange>) = report.all_changes.iter().cloned().partition(|c| c.is_breaking());
    (breaking, safe)
}

/// `checks::policy::run` speaks the port's `PolicyError`/`PolicyWarning`
/// (what a `PolicyEngine` implementation returns); conclusions speak the
/// domain's (what gets persisted on a `SchemaCheck`). Same shape, kept as
/// distinct types so the port crate boundary doesn't leak into storage.
pub(crate) fn policy_conclusion_parts(
    outcome: &crate::checks::Outcome<crate::ports::policy::PolicyResult>,
) -> (Vec<crate::domain::schema_check::PolicyError>, Vec<crate::domain::schema_check::PolicyWarning>) {
    let crate::checks::Outcome::Completed(result) = outcome else {
        return (Vec::new(), Vec::new());
    };
    let errors = result
        .errors
        .iter()
        .map(|e| crate::domain::schema_check::PolicyError { rule: e.rule.clone(), message: e.message.clone() })
        .collect();
    let warnings = result
        .warnings
        .iter()
        .map(|w| crate::domain::schema_check::PolicyWarning { rule: w.rule.clone(), message: w.message.clone() })
        .collect();
    (errors, warnings)
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
            legacy_registry_model: false,
            external_composition: None,
            native_federation: false,
            compare_to_previous_composable_version: false,
            check_retention_days: 7,
            supports_contracts: false,
        }
    }

    #[tokio::test]
    async fn first_publish_is_accepted() {
        let project = project();
        let target = Target::new(project.organization_id, project.id, "prod");
        let orchestrator = NoopOrchestrator;
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

        let input = PublishInput { sdl: "type Query { a: String }".to_string(), ..Default::default() };
        let conclusion = publish(&ctx, &input).await.unwrap();
        assert!(conclusion.is_accepted());
    }

    #[tokio::test]
    async fn identical_publish_is_ignored() {
        let project = project();
        let target = Target::new(project.organization_id, project.id, "prod");
        let orchestrator = NoopOrchestrator;
        let approved = Default::default();
        let previous = SchemaVersion {
            id: crate::domain::ids::SchemaVersionId::new(),
            target_id: target.id,
            created_at: Utc::now(),
            is_composable: true,
            previous_schema_version_id: None,
            base_schema: None,
            composite_schema_sdl: Some("type Query { a: String }".to_string()),
            supergraph_sdl: None,
            tags: None,
            schema_composition_errors: Vec::new(),
            active_logs: Vec::new(),
        };
        let ctx = ModelContext {
            project: &project,
            target: &target,
            previous_version: Some(previous),
            approved_changes: &approved,
            orchestrator: &orchestrator,
            policy_engine: None,
            usage_oracle: None,
            contracts: &[],
            contract_baselines: &[],
        };
        let input = PublishInput { sdl: "type Query { a: String }".to_string(), ..Default::default() };
        let conclusion = publish(&ctx, &input).await.unwrap();
        assert!(matches!(conclusion, SchemaPublishConclusion::Ignored { .. }));
    }
}
