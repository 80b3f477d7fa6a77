// registry-core/src/domain/schema_version.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::ids::{SchemaVersionId, TargetId};
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_log::SchemaLogEntry;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaVersion {
    pub id: SchemaVersionId,
    pub target_id: TargetId,
    pub created_at: DateTime<Utc>,
    pub is_composable: bool,
    pub previous_schema_version_id: Option<SchemaVersionId>,
    pub base_schema: Option<String>,
    pub composite_schema_sdl: Option<String>,
    pub supergraph_sdl: Option<String>,
    pub tags: Option<Vec<String>>,
    pub schema_composition_errors: Vec<String>,
    pub active_logs: Vec<SchemaLogEntry>,
}

impl SchemaVersion {
    /// spec.md §3 invariant: if `composite_schema_sdl` is null,
    /// `supergraph_sdl` must also be null and
    /// `schema_composition_errors` must be non-empty.
    pub fn check_invariants(&self) -> Result<(), DomainError> {
        if self.composite_schema_sdl.is_none() {
            if self.supergraph_sdl.is_some() {
                return Err(DomainError::MissingCompositeSdl { version_id: self.id });
            }
            if self.schema_composition_errors.is_empty() {
                return Err(DomainError::MissingCompositionErrors { version_id: self.id });
            }
        }
        if self.is_composable && self.composite_schema_sdl.is_none() {
            return Err(DomainError::MissingCompositeSdl { version_id: self.id });
        }
        if let Some(dup) = crate::domain::schema_log::has_duplicate_service_names(&self.active_logs) {
            return Err(DomainError::DuplicateServiceName {
                version_id: self.id,
                service_name: dup,
            });
        }
        Ok(())
    }

    /// `tags` is non-null iff the version is composable and the
    /// project supports contracts (spec.md §3 invariant).
    pub fn tags_invariant_holds(&self, project_supports_contracts: bool) -> bool {
        let should_have_tags = self.is_composable && project_supports_contracts;
        self.tags.is_some() == should_have_tags
    }

    pub fn active_service_names(&self) -> Vec<&str> {
        self.active_logs.iter().map(|l| l.service_name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_version() -> SchemaVersion {
        SchemaVersion {
            id: SchemaVersionId::new(),
            target_id: TargetId::new(),
            created_at: Utc::now(),
            is_composable: true,
            previous_schema_version_id: None,
            base_schema: None,
            composite_schema_sdl: Some("type Query { a: Int }".into()),
            supergraph_sdl: Some("type Query { a: Int }".into()),
            tags: None,
            schema_composition_errors: vec![],
            active_logs: vec![],
        }
    }

    #[test]
    fn composable_without_sdl_is_invalid() {
        let mut v = base_version();
        v.composite_schema_sdl = None;
        assert!(v.check_invariants().is_err());
    }

    #[test]
    fn non_composable_without_errors_is_invalid() {
        let mut v = base_version();
        v.is_composable = false;
        v.composite_schema_sdl = None;
        v.supergraph_sdl = None;
        v.schema_composition_errors = vec![];
        assert!(v.check_invariants().is_err());
    }

    #[test]
    fn non_composable_with_errors_is_valid() {
        let mut v = base_version();
        v.is_composable = false;
        v.composite_schema_sdl = None;
        v.supergraph_sdl = None;
        v.schema_composition_errors = vec!["boom".into()];
        assert!(v.check_invariants().is_ok());
    }
}
