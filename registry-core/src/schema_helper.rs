// registry-core/src/schema_helper.rs
//
// Canonicalization and checksum computation (spec.md §4.1). The
// checksum is the cache key the `checksum` check primitive compares
// against: two SDL documents that only differ in whitespace or
// definition order must hash identically (invariant I3).

use apollo_parser::cst::{CstNode, Definition};
use apollo_parser::Parser;
use sha2::{Digest, Sha256};

/// Parses `sdl`, sorts its top-level definitions alphabetically by
/// name, and re-serializes using each definition's original CST text
/// (trimmed). Falls back to the raw trimmed input for documents that
/// fail to parse a single definition's name (e.g. schema extensions or
/// directive-only documents), since those have no natural sort key.
pub fn canonicalize(base_schema: Option<&str>, sdl: &str) -> String {
    let parser = Parser::new(sdl);
    let cst = parser.parse();
    let document = cst.document();

    let mut named: Vec<(String, String)> = Vec::new();
    let mut unnamed: Vec<String> = Vec::new();

    for definition in document.definitions() {
        let text = definition.syntax().text().to_string().trim().to_string();
        if text.is_empty() {
            continue;
        }
        match definition_name(&definition) {
            Some(name) => named.push((name, text)),
            None => unnamed.push(text),
        }
    }

    named.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::new();
    if let Some(base) = base_schema {
        let trimmed = base.trim();
        if !trimmed.is_empty() {
            out.push_str(trimmed);
            out.push('\n');
        }
    }
    for text in unnamed {
        out.push_str(&text);
        out.push('\n');
    }
    for (_, text) in named {
        out.push_str(&text);
        out.push('\n');
    }
    out
}

fn definition_name(definition: &Definition) -> Option<String> {
    match definition {
        Definition::ObjectTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::ObjectTypeExtension(d) => d.name().map(|n| n.text().to_string()),
        Definition::InterfaceTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::InterfaceTypeExtension(d) => d.name().map(|n| n.text().to_string()),
        Definition::InputObjectTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::InputObjectTypeExtension(d) => d.name().map(|n| n.text().to_string()),
        Definition::EnumTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::EnumTypeExtension(d) => d.name().map(|n| n.text().to_string()),
        Definition::UnionTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::UnionTypeExtension(d) => d.name().map(|n| n.text().to_string()),
        Definition::ScalarTypeDefinition(d) => d.name().map(|n| n.text().to_string()),
        Definition::DirectiveDefinition(d) => d.name().map(|n| n.text().to_string()),
        _ => None,
    }
}

pub fn checksum(canonical_sdl: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_sdl.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: &str = "type Query { a: String } type Aardvark { name: String }";
    const B: &str = "type Aardvark { name: String }\ntype Query { a: String }";

    #[test]
    fn canonicalize_is_order_independent() {
        assert_eq!(canonicalize(None, A), canonicalize(None, B));
    }

    #[test]
    fn checksum_matches_for_reordered_definitions() {
        let a = checksum(&canonicalize(None, A));
        let b = checksum(&canonicalize(None, B));
        assert_eq!(a, b);
    }

    #[test]
    fn checksum_changes_with_content() {
        let a = checksum(&canonicalize(None, A));
        let b = checksum(&canonicalize(None, "type Query { a: Int }"));
        assert_ne!(a, b);
    }

    #[test]
    fn base_schema_is_prepended() {
        let out = canonicalize(Some("directive @tag on FIELD_DEFINITION"), "type Query { a: String }");
        assert!(out.starts_with("directive @tag"));
    }
}
