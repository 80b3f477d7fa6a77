// registry-core/src/checks/service_name.rs

use crate::checks::Outcome;
use crate::domain::schema_log::{has_duplicate_service_names, SchemaLogEntry};

pub fn run(active_logs: &[SchemaLogEntry]) -> Outcome<()> {
    match has_duplicate_service_names(active_logs) {
        Some(name) => Outcome::Failed(format!("duplicate service name: {name}")),
        None => Outcome::Completed(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{SchemaLogId, TargetId};
    use crate::domain::schema_log::{PushLogEntry, SchemaLogAction};
    use chrono::Utc;

    fn push(service_name: &str) -> SchemaLogEntry {
        SchemaLogEntry {
            id: SchemaLogId::new(),
            target_id: TargetId::new(),
            created_at: Utc::now(),
            action: SchemaLogAction::Push(PushLogEntry {
                sdl: "type Query { a: String }".to_string(),
                service_name: service_name.to_string(),
                service_url: None,
                metadata: None,
                author: None,
                commit: None,
            }),
        }
    }

    #[test]
    fn unique_names_pass() {
        assert!(run(&[push("a"), push("b")]).is_completed());
    }

    #[test]
    fn duplicate_names_fail() {
        assert!(run(&[push("a"), push("a")]).is_failed());
    }
}
