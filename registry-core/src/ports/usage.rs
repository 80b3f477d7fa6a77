// registry-core/src/ports/usage.rs
//
// The usage oracle decides whether a breaking structural change is
// "usage-safe": no traffic within the target's validation window
// exercises the affected schema coordinate (spec.md §4.3, GLOSSARY).

use async_trait::async_trait;

use crate::ports::PortError;

/// A GraphQL schema coordinate, e.g. `Query.user` or `User.email`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SchemaCoordinate(pub String);

impl SchemaCoordinate {
    pub fn field(parent_type: &str, field_name: &str) -> Self {
        Self(format!("{parent_type}.{field_name}"))
    }

    pub fn type_name(type_name: &str) -> Self {
        Self(type_name.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct UsageSelector {
    pub target_id: crate::domain::ids::TargetId,
    pub validation_window_days: u32,
}

#[async_trait]
pub trait UsageOracle: Send + Sync {
    /// Returns `true` when `coordinate` had zero requests within the
    /// selector's validation window — i.e. the breaking change is
    /// safe to let through.
    async fn is_coordinate_unused(
        &self,
        selector: &UsageSelector,
        coordinate: &SchemaCoordinate,
    ) -> Result<bool, PortError>;
}
