// registry-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::ids::{SchemaVersionId, TargetId};

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("target {target_id} has no latest version")]
    #[diagnostic(
        code(registry::domain::no_latest_version),
        help("a target must be published to at least once before it can be checked against")
    )]
    NoLatestVersion { target_id: TargetId },

    #[error("active log set for version {version_id} contains duplicate service name {service_name}")]
    #[diagnostic(
        code(registry::domain::duplicate_service),
        help("the active log set invariant requires at most one PUSH entry per service_name")
    )]
    DuplicateServiceName {
        version_id: SchemaVersionId,
        service_name: String,
    },

    #[error("composable version {version_id} is missing composite_schema_sdl")]
    #[diagnostic(
        code(registry::domain::missing_composite_sdl),
        help("is_composable=true requires a non-null composite_schema_sdl (programmer invariant)")
    )]
    MissingCompositeSdl { version_id: SchemaVersionId },

    #[error("non-composable version {version_id} has no composition errors recorded")]
    #[diagnostic(code(registry::domain::missing_composition_errors))]
    MissingCompositionErrors { version_id: SchemaVersionId },

    #[error("context id '{0}' is invalid: must be 1..=200 characters")]
    #[diagnostic(code(registry::domain::invalid_context_id))]
    InvalidContextId(String),

    #[error("invalid lifecycle transition for version {version_id}: {from} -> {to}")]
    #[diagnostic(code(registry::domain::invalid_transition))]
    InvalidComposabilityTransition {
        version_id: SchemaVersionId,
        from: bool,
        to: bool,
    },

    #[error("contract '{0}' not found on target")]
    #[diagnostic(code(registry::domain::contract_not_found))]
    ContractNotFound(String),

    #[error("schema change approval snapshot is inconsistent for change {0}")]
    #[diagnostic(code(registry::domain::approval_mismatch))]
    ApprovalMismatch(String),
}
