// registry-core/src/checks/composition.rs

use crate::checks::Outcome;
use crate::ports::orchestrator::{CompositionOptions, CompositionResult, Orchestrator, SubgraphInput};
use crate::ports::PortError;

pub async fn run(
    orchestrator: &dyn Orchestrator,
    schemas: &[SubgraphInput],
    options: &CompositionOptions,
) -> Outcome<CompositionResult> {
    match orchestrator.compose_and_validate(schemas, options).await {
        Ok(result) => Outcome::Completed(result),
        Err(PortError::Unavailable(reason)) => Outcome::Failed(format!("orchestrator unavailable: {reason}")),
        Err(err) => Outcome::Failed(err.to_string()),
    }
}
