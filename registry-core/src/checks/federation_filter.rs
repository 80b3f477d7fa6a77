// registry-core/src/checks/federation_filter.rs
//
// `filterOutFederationChanges` (spec.md §4.4): federation directive
// usage (`@key`, `@external`, `@requires`, `@provides`, `@shareable`,
// `@override`, `@inaccessible`) shifting between subgraphs is expected
// churn under a federated orchestrator, not a breaking change.

use crate::domain::schema_change::{Severity, SchemaChange, DIRECTIVE_USAGE_CHANGED};

const FEDERATION_DIRECTIVES: &[&str] = &["key", "external", "requires", "provides", "shareable", "override", "inaccessible"];

pub fn filter_out_federation_changes(changes: Vec<SchemaChange>, is_federation: bool) -> Vec<SchemaChange> {
    if !is_federation {
        return changes;
    }
    changes
        .into_iter()
        .filter(|change| !is_federation_directive_noise(change))
        .collect()
}

fn is_federation_directive_noise(change: &SchemaChange) -> bool {
    if change.change_type != DIRECTIVE_USAGE_CHANGED {
        return false;
    }
    change
        .meta
        .get("directiveName")
        .and_then(|v| v.as_str())
        .map(|name| FEDERATION_DIRECTIVES.contains(&name))
        .unwrap_or(false)
}
