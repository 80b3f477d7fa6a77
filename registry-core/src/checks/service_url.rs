// registry-core/src/checks/service_url.rs
//
// Composite projects require a service URL per subgraph that parses as
// a URL; single-schema projects have no such requirement (spec.md §4.4
// "serviceUrl": "Fails when missing or not parseable as URL").

use url::Url;

use crate::checks::Outcome;

pub fn run(service_url: Option<&str>, required: bool) -> Outcome<()> {
    if !required {
        return Outcome::Skipped;
    }
    match service_url.map(str::trim) {
        Some(url) if !url.is_empty() => match Url::parse(url) {
            Ok(_) => Outcome::Completed(()),
            Err(err) => Outcome::Failed(format!("service url is not a valid URL: {err}")),
        },
        _ => Outcome::Failed("service url is required for composite projects".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_schema_skips() {
        assert!(run(None, false).is_skipped());
    }

    #[test]
    fn missing_url_fails_when_required() {
        assert!(run(None, true).is_failed());
    }

    #[test]
    fn blank_url_fails() {
        assert!(run(Some("   "), true).is_failed());
    }

    #[test]
    fn present_url_passes() {
        assert!(run(Some("https://svc.internal"), true).is_completed());
    }

    #[test]
    fn non_parseable_url_fails() {
        assert!(run(Some("not-a-url"), true).is_failed());
    }
}
