// registry-cli/src/orchestrator.rs
//
// Every production deployment of this registry wires `Orchestrator`
// to either `infrastructure::composer_http::HttpOrchestrator` or a
// real in-process federation composer; the demo binary has neither a
// composition service to call nor a federation engine linked in. This
// concatenates subgraph SDLs verbatim, which is enough to drive
// `check`/`publish`/`delete` end to end against schemas that don't
// collide on type names — it is not a composer anyone should point at
// overlapping subgraphs.

use async_trait::async_trait;
use registry_core::ports::orchestrator::{CompositionOptions, CompositionResult, Orchestrator, SubgraphInput};
use registry_core::ports::PortError;

pub struct NaiveOrchestrator;

#[async_trait]
impl Orchestrator for NaiveOrchestrator {
    async fn compose_and_validate(&self, schemas: &[SubgraphInput], _options: &CompositionOptions) -> Result<CompositionResult, PortError> {
        if schemas.is_empty() {
            return Ok(CompositionResult::default());
        }
        let sdl = schemas.iter().map(|s| s.sdl.as_str()).collect::<Vec<_>>().join("\n\n");
        Ok(CompositionResult {
            sdl: Some(sdl.clone()),
            supergraph: Some(sdl),
            tags: None,
            errors: Vec::new(),
            contracts: Vec::new(),
        })
    }
}
