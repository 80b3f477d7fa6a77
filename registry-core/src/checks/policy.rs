// registry-core/src/checks/policy.rs

use crate::checks::Outcome;
use crate::ports::policy::{PolicyEngine, PolicyResult};
use crate::ports::PortError;

pub async fn run(engine: Option<&dyn PolicyEngine>, composed: &str, modified: &str) -> Outcome<PolicyResult> {
    let Some(engine) = engine else {
        return Outcome::Skipped;
    };
    match engine.check(composed, modified).await {
        Ok(result) => Outcome::Completed(result),
        Err(PortError::Unavailable(reason)) => Outcome::Failed(format!("policy engine unavailable: {reason}")),
        Err(err) => Outcome::Failed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct AlwaysOk;

    #[async_trait]
    impl PolicyEngine for AlwaysOk {
        async fn check(&self, _composed: &str, _modified: &str) -> Result<PolicyResult, PortError> {
            Ok(PolicyResult::default())
        }
    }

    #[tokio::test]
    async fn no_engine_skips() {
        assert!(run(None, "", "").await.is_skipped());
    }

    #[tokio::test]
    async fn engine_success_completes() {
        let engine = AlwaysOk;
        assert!(run(Some(&engine), "a", "b").await.is_completed());
    }
}
