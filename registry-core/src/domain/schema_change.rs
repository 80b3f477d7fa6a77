// registry-core/src/domain/schema_change.rs

use serde::{Deserialize, Serialize};

use crate::domain::ids::SchemaChangeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Breaking,
    Dangerous,
    Safe,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaChange {
    pub id: SchemaChangeId,
    #[serde(rename = "type")]
    pub change_type: String,
    pub severity: Severity,
    pub meta: serde_json::Value,
    pub is_safe_based_on_usage: bool,
    pub path: Option<String>,
}

impl SchemaChange {
    pub fn new(change_type: impl Into<String>, severity: Severity, meta: serde_json::Value, path: Option<String>) -> Self {
        let change_type = change_type.into();
        let id = SchemaChangeId::compute(&change_type, &meta);
        Self {
            id,
            change_type,
            severity,
            meta,
            is_safe_based_on_usage: false,
            path,
        }
    }

    pub fn is_breaking(&self) -> bool {
        self.severity == Severity::Breaking
    }

    /// A breaking change is blocking unless the usage oracle marked it
    /// safe or it was approved (spec.md §4.4 `diff` primitive rule).
    pub fn is_blocking(&self, approved: bool) -> bool {
        self.is_breaking() && !self.is_safe_based_on_usage && !approved
    }
}

pub const URL_CHANGED: &str = "REGISTRY_SERVICE_URL_CHANGED";
pub const FIELD_TYPE_CHANGED: &str = "FIELD_TYPE_CHANGED";
pub const FIELD_REMOVED: &str = "FIELD_REMOVED";
pub const FIELD_ADDED: &str = "FIELD_ADDED";
pub const TYPE_REMOVED: &str = "TYPE_REMOVED";
pub const TYPE_ADDED: &str = "TYPE_ADDED";
pub const TYPE_KIND_CHANGED: &str = "TYPE_KIND_CHANGED";
pub const ENUM_VALUE_REMOVED: &str = "ENUM_VALUE_REMOVED";
pub const ENUM_VALUE_ADDED: &str = "ENUM_VALUE_ADDED";
pub const ARGUMENT_REMOVED: &str = "ARGUMENT_REMOVED";
pub const ARGUMENT_ADDED: &str = "ARGUMENT_ADDED";
pub const ARGUMENT_TYPE_CHANGED: &str = "ARGUMENT_TYPE_CHANGED";
pub const DIRECTIVE_USAGE_CHANGED: &str = "DIRECTIVE_USAGE_CHANGED";

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn blocking_rules() {
        let mut change = SchemaChange::new(FIELD_REMOVED, Severity::Breaking, json!({}), None);
        assert!(change.is_blocking(false));
        change.is_safe_based_on_usage = true;
        assert!(!change.is_blocking(false));
        change.is_safe_based_on_usage = false;
        assert!(!change.is_blocking(true));
    }

    #[test]
    fn safe_changes_never_block() {
        let change = SchemaChange::new(URL_CHANGED, Severity::Safe, json!({}), None);
        assert!(!change.is_blocking(false));
    }
}
