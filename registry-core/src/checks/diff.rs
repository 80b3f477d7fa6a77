// registry-core/src/checks/diff.rs
//
// The `diff` check primitive (spec.md §4.4): runs the inspector,
// drops federation directive-usage noise, and splits the result into
// breaking/safe buckets after approvals and usage-safety are applied.
// Always `Completed` (or `Skipped` with no previous version) — whether
// the blocking changes it found should reject the request is the
// project model's call, not this primitive's.

use crate::checks::federation_filter::filter_out_federation_changes;
use crate::checks::Outcome;
use crate::domain::approval::ApprovedChanges;
use crate::domain::schema_change::SchemaChange;
use crate::inspector;
use crate::ports::usage::{UsageOracle, UsageSelector};

#[derive(Debug, Clone)]
pub struct DiffReport {
    pub all_changes: Vec<SchemaChange>,
    pub blocking_changes: Vec<SchemaChange>,
}

impl DiffReport {
    pub fn is_blocked(&self) -> bool {
        !self.blocking_changes.is_empty()
    }
}

pub async fn run(
    previous_sdl: Option<&str>,
    incoming_sdl: &str,
    is_federation: bool,
    usage_oracle: Option<&dyn UsageOracle>,
    selector: &UsageSelector,
    approved: &ApprovedChanges,
) -> Outcome<DiffReport> {
    let Some(previous_sdl) = previous_sdl else {
        return Outcome::Skipped;
    };

    let changes = inspector::diff(previous_sdl, incoming_sdl, usage_oracle, selector).await;
    let changes = filter_out_federation_changes(changes, is_federation);

    let blocking_changes: Vec<SchemaChange> = changes.iter().filter(|c| c.is_blocking(approved.contains_key(&c.id))).cloned().collect();

    Outcome::Completed(DiffReport { all_changes: changes, blocking_changes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::TargetId;

    #[tokio::test]
    async fn no_previous_sdl_skips() {
        let selector = UsageSelector { target_id: TargetId::new(), validation_window_days: 28 };
        let outcome = run(None, "type Query { a: String }", false, None, &selector, &ApprovedChanges::new()).await;
        assert!(outcome.is_skipped());
    }

    #[tokio::test]
    async fn breaking_change_without_approval_is_blocking() {
        let selector = UsageSelector { target_id: TargetId::new(), validation_window_days: 28 };
        let outcome = run(
            Some("type Query { a: String }"),
            "type Query {}",
            false,
            None,
            &selector,
            &ApprovedChanges::new(),
        )
        .await;
        let report = outcome.completed().unwrap();
        assert!(report.is_blocked());
    }

    #[tokio::test]
    async fn safe_changes_complete() {
        let selector = UsageSelector { target_id: TargetId::new(), validation_window_days: 28 };
        let outcome = run(
            Some("type Query { a: String }"),
            "type Query { a: String b: Int }",
            false,
            None,
            &selector,
            &ApprovedChanges::new(),
        )
        .await;
        assert!(outcome.is_completed());
    }
}
