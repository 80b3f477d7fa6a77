// registry-core/src/models/composite.rs
//
// Modern Composite project model (spec.md §4.5.2-4.5.4): N subgraphs
// composed into one supergraph per target, optionally split further
// into per-contract public schemas. Every publish/check first replays
// `swap_services` to get the would-be active log set, then asks the
// orchestrator to compose it before diffing against the previous
// composite SDL.

use chrono::Utc;

use crate::checks::{
    checksum as checksum_check, federation_filter, metadata as metadata_check, service_name as service_name_check, service_url as service_url_check, url_change,
};
use crate::domain::ids::TargetId;
use crate::domain::project::OrchestratorKind;
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_check::{CompositionError, CompositionErrorSource, ContractCheckResult};
use crate::domain::schema_log::{swap_services, DeleteLogEntry, PushLogEntry, SchemaLogAction, SchemaLogEntry};
use crate::domain::schema_version::SchemaVersion;
use crate::error::RegistryError;
use crate::models::conclusion::{SchemaCheckConclusion, SchemaDeleteConclusion, SchemaPublishConclusion};
use crate::models::single::{diff_report, policy_conclusion_parts, split_changes};
use crate::checks::policy as policy_check;
use crate::models::{CheckInput, DeleteInput, ModelContext, PublishInput};
use crate::ports::orchestrator::{CompositionOptions, ContractInput, ExternalComposerOptions, SubgraphInput};
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
    CompositionOptions {
        external: ctx.project.external_composition.as_ref().map(|e| ExternalComposerOptions { endpoint: e.endpoint.clone(), secret: e.secret.clone() }),
        native: ctx.project.native_federation,
        contracts: ctx
            .contracts
            .iter()
            .map(|c| ContractInput {
                id: c.id.to_string(),
                include_tags: c.include_tags.clone(),
                exclude_tags: c.exclude_tags.clone(),
                remove_unreachable_types_from_public_api_schema: c.remove_unreachable_types_from_public_api_schema,
            })
            .collect(),
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

/// Input-validation failures (missing `service_name`/`service_url`,
/// duplicate names) are a normal `Reject`/`Failure` with a specific
/// code (spec.md §7 kind 1), never a thrown error — the publisher
/// still needs to persist a check record and a caller still needs a
/// conclusion value, not a propagated `Err`.
pub(crate) fn validation_failure(code: &str, message: impl std::fmt::Display) -> Vec<CompositionError> {
    vec![CompositionError { message: format!("{code}: {message}"), source: CompositionErrorSource::Composition }]
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
    let (mut breaking_changes, mut safe_changes) = split_changes(&report);

    if let Some(url_change) = url_change::detect(&previous_logs, &service_name, input.service_url.as_deref()) {
        safe_changes.push(url_change);
    }

    if is_federation(ctx) {
        breaking_changes = federation_filter::filter_out_federation_changes(breaking_changes, true);
    }

    let policy_outcome = policy_check::run(ctx.policy_engine, baseline_sdl.as_deref().unwrap_or_default(), &composite_sdl).await;
    let (policy_errors, policy_warnings) = policy_conclusion_parts(&policy_outcome);

    let contract_checks = contract_checks_from_composition(ctx, &composition.contracts).await;

    if report.is_blocked() || !policy_errors.is_empty() || contract_checks.iter().any(|c| !c.is_successful) {
        return Ok(SchemaCheckConclusion::Failure {
            breaking_changes,
            safe_changes,
            policy_errors,
            policy_warnings,
            composition_errors,
            contract_checks,
        });
    }

    Ok(SchemaCheckConclusion::Success {
        breaking_changes,
        safe_changes,
        policy_warnings,
        composite_schema_sdl: Some(composite_sdl),
        supergraph_sdl: composition.supergraph,
        contract_checks,
    })
}

/// Each contract is checked in isolation (spec.md scenario "contract
/// check failure isolates"): a breaking change against contract A's
/// own baseline fails only A's `ContractCheckResult`, never B's, even
/// though both come out of the same composition call.
async fn contract_checks_from_composition(
    ctx: &ModelContext<'_>,
    results: &[crate::ports::orchestrator::ContractCompositionResult],
) -> Vec<ContractCheckResult> {
    let mut checks = Vec::with_capacity(results.len());
    for r in results {
        let contract = ctx.contracts.iter().find(|c| c.id.to_string() == r.id);
        let composition_errors = to_domain_composition_errors(&r.errors);

        let changes = if r.errors.is_empty() {
            if let (Some(contract), Some(sdl)) = (contract, r.sdl.as_deref()) {
                let baseline = ctx.contract_baselines.iter().find(|b| b.contract_id == contract.id).and_then(|b| b.composite_schema_sdl.as_deref());
                let selector = selector(ctx.target.id);
                let report = diff_report(baseline, sdl, is_federation(ctx), ctx.usage_oracle, &selector, ctx.approved_changes).await;
                let (breaking, safe) = split_changes(&report);
                breaking.into_iter().chain(safe).collect()
            } else {
                Vec::new()
            }
        } else {
            Vec::new()
        };
        let is_blocked = changes.iter().any(|c: &SchemaChange| c.is_blocking(ctx.approved_changes.contains_key(&c.id)));

        checks.push(ContractCheckResult {
            contract_id: contract.map(|c| c.id).unwrap_or_default(),
            contract_name: contract.map(|c| c.contract_name.clone()).unwrap_or_else(|| r.id.clone()),
            is_successful: r.errors.is_empty() && !is_blocked,
            changes,
            composition_errors,
            composite_schema_sdl: r.sdl.clone(),
            supergraph_sdl: r.supergraph.clone(),
        });
    }
    checks
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

    // "Unchanged" gates on the whole published entry, not just the SDL
    // text — a URL-only republish (scenario 4) must still go through as
    // a Publish carrying the URL change, never an Ignore.
    let previous_entry = previous_logs.iter().rev().find(|l| l.service_name() == service_name).and_then(|l| l.as_push());
    let previous_service_sdl = previous_entry.map(|p| p.sdl.clone());
    let previous_service_url = previous_entry.and_then(|p| p.service_url.clone());
    let sdl_unchanged = matches!(checksum_check::run(None, previous_service_sdl.as_deref(), &input.sdl), crate::checks::Outcome::Completed(true));
    if sdl_unchanged && previous_service_url == input.service_url {
        return Ok(SchemaPublishConclusion::Ignored { reason: "schema is identical to the latest version of this service".to_string() });
    }

    if let crate::checks::Outcome::Failed(reason) = metadata_check::run(input.metadata.as_deref()) {
        return Ok(SchemaPublishConclusion::Rejected {
            breaking_changes: Vec::new(),
            composition_errors: validation_failure("METADATA_PARSING_FAILURE", reason),
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

    let blocked = breaking_changes.iter().any(|c| c.is_blocking(ctx.approved_changes.contains_key(&c.id)));
    if !is_composable {
        return Ok(SchemaPublishConclusion::Rejected { breaking_changes, composition_errors });
    }
    if blocked && !input.experimental_accept_breaking_changes {
        return Ok(SchemaPublishConclusion::Rejected { breaking_changes, composition_errors });
    }

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
        tags: if ctx.project.supports_contracts { Some(composition.tags.unwrap_or_default()) } else { None },
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
        return Ok(SchemaDeleteConclusion::Accepted {
            version: SchemaVersion { active_logs, ..previous },
        });
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
