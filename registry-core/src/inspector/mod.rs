// registry-core/src/inspector/mod.rs
//
// Schema diffing (spec.md §4.3). `diff` wraps the structural
// classifier with a usage-oracle consultation pass: every breaking
// change gets a chance to be downgraded to usage-safe before the
// publisher decides whether it blocks.

pub mod classify;
pub mod schema_model;

use crate::domain::schema_change::SchemaChange;
use crate::ports::usage::{SchemaCoordinate, UsageOracle, UsageSelector};

/// Structural diff only, no usage consultation. Used by callers that
/// already know usage doesn't apply (e.g. comparing two checks before
/// either is published).
pub fn diff_structural(previous_sdl: &str, incoming_sdl: &str) -> Vec<SchemaChange> {
    let previous = schema_model::extract(previous_sdl);
    let incoming = schema_model::extract(incoming_sdl);
    classify::diff(&previous, &incoming)
}

/// Full diff: structural changes, with each breaking change checked
/// against the usage oracle and flagged `is_safe_based_on_usage` when
/// the affected coordinate saw no traffic in the selector's window
/// (spec.md §4.3 "Usage-oracle consultation").
pub async fn diff(
    previous_sdl: &str,
    incoming_sdl: &str,
    usage_oracle: Option<&dyn UsageOracle>,
    selector: &UsageSelector,
) -> Vec<SchemaChange> {
    let mut changes = diff_structural(previous_sdl, incoming_sdl);

    let Some(oracle) = usage_oracle else {
        return changes;
    };

    for change in changes.iter_mut().filter(|c| c.is_breaking()) {
        if let Some(coordinate) = coordinate_for(change) {
            if let Ok(true) = oracle.is_coordinate_unused(selector, &coordinate).await {
                change.is_safe_based_on_usage = true;
            }
        }
    }

    changes
}

fn coordinate_for(change: &SchemaChange) -> Option<SchemaCoordinate> {
    let type_name = change.meta.get("typeName")?.as_str()?;
    match change.meta.get("fieldName").and_then(|v| v.as_str()) {
        Some(field_name) => Some(SchemaCoordinate::field(type_name, field_name)),
        None => Some(SchemaCoordinate::type_name(type_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::domain::ids::TargetId;
    use crate::ports::PortError;

    struct AlwaysUnused;

    #[async_trait]
    impl UsageOracle for AlwaysUnused {
        async fn is_coordinate_unused(&self, _selector: &UsageSelector, _coordinate: &SchemaCoordinate) -> Result<bool, PortError> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn unused_breaking_change_is_marked_safe() {
        let oracle = AlwaysUnused;
        let selector = UsageSelector { target_id: TargetId::new(), validation_window_days: 28 };
        let changes = diff("type Query { a: String }", "type Query {}", Some(&oracle), &selector).await;
        let removed = changes.iter().find(|c| c.is_breaking()).unwrap();
        assert!(removed.is_safe_based_on_usage);
    }

    #[tokio::test]
    async fn no_oracle_leaves_changes_unmarked() {
        let selector = UsageSelector { target_id: TargetId::new(), validation_window_days: 28 };
        let changes = diff("type Query { a: String }", "type Query {}", None, &selector).await;
        let removed = changes.iter().find(|c| c.is_breaking()).unwrap();
        assert!(!removed.is_safe_based_on_usage);
    }
}
