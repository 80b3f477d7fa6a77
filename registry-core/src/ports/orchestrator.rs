// registry-core/src/ports/orchestrator.rs
//
// The pluggable composition backend (spec.md §4.2). May run
// in-process (native federation / single-schema composition) or
// delegate to a user-controlled HTTP endpoint (§6 "Wire protocol to
// external composer"). Either way the pipeline only ever talks to
// this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSource {
    Graphql,
    Composition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorErrorEntry {
    pub message: String,
    pub source: ErrorSource,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubgraphInput {
    pub name: String,
    pub sdl: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractInput {
    pub id: String,
    pub include_tags: Option<Vec<String>>,
    pub exclude_tags: Option<Vec<String>>,
    pub remove_unreachable_types_from_public_api_schema: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ExternalComposerOptions {
    pub endpoint: String,
    pub secret: String,
}

#[derive(Debug, Clone, Default)]
pub struct CompositionOptions {
    pub external: Option<ExternalComposerOptions>,
    pub native: bool,
    pub contracts: Vec<ContractInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractCompositionResult {
    pub id: String,
    pub sdl: Option<String>,
    pub supergraph: Option<String>,
    pub errors: Vec<OrchestratorErrorEntry>,
}

/// `composeAndValidate` result. Per spec.md §4.2, composition may
/// return *both* a non-empty `errors` and a non-null `sdl`
/// simultaneously in a legacy path — both are preserved verbatim
/// (spec.md §9 open question #2); `is_composable()` is the only
/// place that derives a boolean from `errors`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositionResult {
    pub sdl: Option<String>,
    pub supergraph: Option<String>,
    pub tags: Option<Vec<String>>,
    pub errors: Vec<OrchestratorErrorEntry>,
    pub contracts: Vec<ContractCompositionResult>,
}

impl CompositionResult {
    pub fn is_composable(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn graphql_errors(&self) -> Vec<&OrchestratorErrorEntry> {
        self.errors.iter().filter(|e| e.source == ErrorSource::Graphql).collect()
    }

    pub fn composition_errors(&self) -> Vec<&OrchestratorErrorEntry> {
        self.errors.iter().filter(|e| e.source == ErrorSource::Composition).collect()
    }

    pub fn has_graphql_errors(&self) -> bool {
        !self.graphql_errors().is_empty()
    }
}

#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Compose N subgraphs into a supergraph (or validate a single
    /// schema). Transport failures (timeouts, connection errors
    /// reaching an external composer) must be returned as
    /// [`PortError::Unavailable`] so the caller can retry; validation
    /// failures belong in [`CompositionResult::errors`] instead.
    async fn compose_and_validate(
        &self,
        schemas: &[SubgraphInput],
        options: &CompositionOptions,
    ) -> Result<CompositionResult, PortError>;
}
