// registry-core/src/checks/metadata.rs
//
// `metadata` is an opaque, user-supplied JSON blob attached to a
// publish (spec.md §3 Schema Log Entry); the only constraint the
// registry enforces is that it parses as JSON, since it is stored and
// replayed verbatim rather than interpreted.

use crate::checks::Outcome;

pub fn run(metadata: Option<&str>) -> Outcome<()> {
    match metadata {
        None => Outcome::Skipped,
        Some(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(_) => Outcome::Completed(()),
            Err(err) => Outcome::Failed(format!("metadata is not valid json: {err}")),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_metadata_skips() {
        assert!(run(None).is_skipped());
    }

    #[test]
    fn valid_json_passes() {
        assert!(run(Some(r#"{"team":"core"}"#)).is_completed());
    }

    #[test]
    fn invalid_json_fails() {
        assert!(run(Some("not json")).is_failed());
    }
}
