// registry-core/src/domain/approval.rs
//
// `(target_id, context_id, schema_change_id) -> snapshot` (spec.md
// §3). Looked up by the `diff` check primitive so a previously
// approved breaking change never blocks a later check sharing the
// same `context_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{SchemaChangeId, TargetId};
use crate::domain::schema_change::SchemaChange;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaChangeApproval {
    pub target_id: TargetId,
    pub context_id: String,
    pub schema_change_id: SchemaChangeId,
    pub schema_change_snapshot: SchemaChange,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
}

/// A lookup table of approvals keyed by the `schema_change_id`s found
/// in a given `(target_id, context_id)` scope; this is what the
/// `diff` check primitive and the `CompositeModel`/`SingleModel`
/// receive as `approved_changes`.
pub type ApprovedChanges = std::collections::HashMap<SchemaChangeId, SchemaChangeApproval>;

pub fn index_by_change_id(approvals: Vec<SchemaChangeApproval>) -> ApprovedChanges {
    approvals
        .into_iter()
        .map(|a| (a.schema_change_id.clone(), a))
        .collect()
}
