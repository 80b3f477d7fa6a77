// registry-core/src/checks/checksum.rs
//
// `Completed(true)` means the incoming SDL is byte-for-byte identical
// (post-canonicalization) to the previous version — the publisher
// short-circuits the rest of the pipeline in that case (spec.md §4.6
// step 3).

use crate::checks::Outcome;
use crate::schema_helper::{canonicalize, checksum as hash_of};

pub fn run(base_schema: Option<&str>, previous_sdl: Option<&str>, incoming_sdl: &str) -> Outcome<bool> {
    let Some(previous_sdl) = previous_sdl else {
        return Outcome::Skipped;
    };
    let previous = hash_of(&canonicalize(base_schema, previous_sdl));
    let incoming = hash_of(&canonicalize(base_schema, incoming_sdl));
    Outcome::Completed(previous == incoming)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_previous_sdl_skips() {
        assert!(run(None, None, "type Query { a: String }").is_skipped());
    }

    #[test]
    fn identical_schemas_match() {
        let outcome = run(None, Some("type Query { a: String }"), "type Query { a: String }");
        assert!(matches!(outcome, Outcome::Completed(true)));
    }

    #[test]
    fn reordered_definitions_still_match() {
        let previous = "type Query { a: String } type B { x: Int }";
        let incoming = "type B { x: Int } type Query { a: String }";
        assert!(matches!(run(None, Some(previous), incoming), Outcome::Completed(true)));
    }

    #[test]
    fn changed_schema_does_not_match() {
        let outcome = run(None, Some("type Query { a: String }"), "type Query { a: Int }");
        assert!(matches!(outcome, Outcome::Completed(false)));
    }
}
