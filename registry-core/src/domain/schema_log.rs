// registry-core/src/domain/schema_log.rs
//
// The append-only per-action record (spec.md §3 "Schema Log Entry")
// and the "active log set" derivation that both the single-schema and
// composite state machines rely on (invariant I1: after a publish
// accept, `new.active_logs == swap_services(previous.active_logs,
// incoming)`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::SchemaLogId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushLogEntry {
    pub sdl: String,
    pub service_name: String,
    pub service_url: Option<String>,
    pub metadata: Option<String>,
    pub author: Option<String>,
    pub commit: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteLogEntry {
    pub service_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaLogAction {
    Push(PushLogEntry),
    Delete(DeleteLogEntry),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaLogEntry {
    pub id: SchemaLogId,
    pub target_id: crate::domain::ids::TargetId,
    pub created_at: DateTime<Utc>,
    pub action: SchemaLogAction,
}

impl SchemaLogEntry {
    /// The `service_name` a log entry is keyed by, for both variants.
    pub fn service_name(&self) -> &str {
        match &self.action {
            SchemaLogAction::Push(p) => &p.service_name,
            SchemaLogAction::Delete(d) => &d.service_name,
        }
    }

    pub fn is_push(&self) -> bool {
        matches!(self.action, SchemaLogAction::Push(_))
    }

    pub fn as_push(&self) -> Option<&PushLogEntry> {
        match &self.action {
            SchemaLogAction::Push(p) => Some(p),
            SchemaLogAction::Delete(_) => None,
        }
    }
}

/// Computes the new active log set: the union of `previous` plus
/// `incoming`, with `Delete` removing the entry matching its
/// `service_name` and `Push` replacing any entry with the same
/// `service_name`. This is the `swapServices` operation referenced by
/// spec.md invariant I1.
///
/// Preserves the relative order of `previous` for untouched entries
/// and appends newly-introduced services at the end, so repeated
/// calls with equivalent inputs (modulo entry order) settle on a
/// stable final ordering.
pub fn swap_services(previous: &[SchemaLogEntry], incoming: &SchemaLogEntry) -> Vec<SchemaLogEntry> {
    let incoming_name = incoming.service_name();
    let mut next: Vec<SchemaLogEntry> = previous
        .iter()
        .filter(|e| e.service_name() != incoming_name)
        .cloned()
        .collect();

    if incoming.is_push() {
        next.push(incoming.clone());
    }
    // Delete: entry already excluded above, nothing to append.

    next
}

/// Active log set never contains two PUSH entries with the same
/// `service_name` (spec.md §3 invariant).
pub fn has_duplicate_service_names(logs: &[SchemaLogEntry]) -> Option<String> {
    let mut seen = std::collections::HashSet::new();
    for log in logs.iter().filter(|l| l.is_push()) {
        if !seen.insert(log.service_name().to_string()) {
            return Some(log.service_name().to_string());
        }
    }
    None
}
