// registry-core/src/checks/url_change.rs
//
// Detects a `REGISTRY_SERVICE_URL_CHANGED` event when a service
// republishes under a different `service_url` (spec.md §4.4). The
// reference implementation this was modeled on had the early return
// for "no previous URL on record" duplicated on both branches of the
// match; spec.md §9 calls that out as a typo rather than a deliberate
// behavior, so this only returns once, after both URLs are known.
//
// A service that isn't in the previous active log set at all (a
// brand-new service, not a republish) is not a URL change — the
// comparison only applies when the service appears on both sides.

use serde_json::json;

use crate::domain::schema_change::{Severity, SchemaChange, URL_CHANGED};
use crate::domain::schema_log::SchemaLogEntry;

pub fn detect(previous_logs: &[SchemaLogEntry], service_name: &str, incoming_url: Option<&str>) -> Option<SchemaChange> {
    let previous_entry = previous_logs.iter().rev().find(|log| log.service_name() == service_name)?;

    let previous_url = previous_entry.as_push().and_then(|push| push.service_url.clone());

    if previous_url.as_deref() == incoming_url {
        return None;
    }

    Some(SchemaChange::new(
        URL_CHANGED,
        Severity::Safe,
        json!({
            "serviceName": service_name,
            "previousUrl": previous_url,
            "newUrl": incoming_url,
        }),
        None,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{SchemaLogId, TargetId};
    use crate::domain::schema_log::{PushLogEntry, SchemaLogAction};
    use chrono::Utc;

    fn push_with_url(service_name: &str, url: Option<&str>) -> SchemaLogEntry {
        SchemaLogEntry {
            id: SchemaLogId::new(),
            target_id: TargetId::new(),
            created_at: Utc::now(),
            action: SchemaLogAction::Push(PushLogEntry {
                sdl: "type Query { a: Int }".to_string(),
                service_name: service_name.to_string(),
                service_url: url.map(str::to_string),
                metadata: None,
                author: None,
                commit: None,
            }),
        }
    }

    #[test]
    fn no_previous_log_and_no_incoming_url_is_not_a_change() {
        assert!(detect(&[], "users", None).is_none());
    }

    #[test]
    fn service_absent_from_previous_logs_is_not_a_change() {
        assert!(detect(&[], "users", Some("https://users.internal")).is_none());
    }

    #[test]
    fn url_set_for_the_first_time_on_a_known_service_is_a_change() {
        let previous = vec![push_with_url("users", None)];
        let change = detect(&previous, "users", Some("https://users.internal")).unwrap();
        assert_eq!(change.change_type, URL_CHANGED);
    }

    #[test]
    fn identical_url_is_not_a_change() {
        let previous = vec![push_with_url("users", Some("https://users.internal"))];
        assert!(detect(&previous, "users", Some("https://users.internal")).is_none());
    }

    #[test]
    fn different_url_is_a_change() {
        let previous = vec![push_with_url("users", Some("https://users.internal"))];
        assert!(detect(&previous, "users", Some("https://users.v2.internal")).is_some());
    }
}
