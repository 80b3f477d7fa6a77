// registry-core/src/domain/ids.rs
//
// Newtype identifiers. Entity ids are UUIDv7 (time-ordered, so
// `created_at`/`id` tie-breaking in storage sorts naturally); the one
// exception is `SchemaChangeId`, which spec.md defines as a
// deterministic hash of `(type, meta)` rather than a random id.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(OrganizationId);
uuid_id!(ProjectId);
uuid_id!(TargetId);
uuid_id!(SchemaVersionId);
uuid_id!(SchemaLogId);
uuid_id!(SchemaCheckId);
uuid_id!(ContractId);
uuid_id!(SchemaVersionContractId);

/// Deterministic hash of `(change_type, meta)` — equal inputs always
/// produce the same id, which is what lets an approval recorded
/// against one check apply to a structurally identical change
/// detected on a later check (spec.md invariant I4).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaChangeId(pub String);

impl SchemaChangeId {
    pub fn compute(change_type: &str, meta: &serde_json::Value) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(change_type.as_bytes());
        hasher.update(b"\0");
        // serde_json::Value's Ord-free map iteration order is the
        // insertion order of the JSON text; canonicalize first so two
        // semantically-equal meta objects with differently-ordered
        // keys hash identically.
        let canonical = canonicalize_json(meta);
        hasher.update(canonical.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }
}

impl fmt::Display for SchemaChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn canonicalize_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut out = String::from("{");
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                out.push_str(&canonicalize_json(&map[*key]));
            }
            out.push('}');
            out
        }
        serde_json::Value::Array(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&canonicalize_json(item));
            }
            out.push(']');
            out
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn change_id_is_stable_across_key_order() {
        let a = SchemaChangeId::compute("FIELD_TYPE_CHANGED", &json!({"field": "name", "type": "String"}));
        let b = SchemaChangeId::compute("FIELD_TYPE_CHANGED", &json!({"type": "String", "field": "name"}));
        assert_eq!(a, b);
    }

    #[test]
    fn change_id_differs_on_type() {
        let a = SchemaChangeId::compute("FIELD_TYPE_CHANGED", &json!({"field": "name"}));
        let b = SchemaChangeId::compute("FIELD_REMOVED", &json!({"field": "name"}));
        assert_ne!(a, b);
    }

    #[test]
    fn uuid_ids_round_trip_serde() {
        let id = TargetId::new();
        let encoded = serde_json::to_string(&id).unwrap();
        let decoded: TargetId = serde_json::from_str(&encoded).unwrap();
        assert_eq!(id, decoded);
    }
}
