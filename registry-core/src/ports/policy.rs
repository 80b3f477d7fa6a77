// registry-core/src/ports/policy.rs

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::PortError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyWarning {
    pub rule: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyError {
    pub rule: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyResult {
    pub warnings: Vec<PolicyWarning>,
    pub errors: Vec<PolicyError>,
}

impl PolicyResult {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

#[async_trait]
pub trait PolicyEngine: Send + Sync {
    /// Evaluates organization/project policy against the incoming SDL
    /// modification. `modified` is the raw subgraph/document SDL the
    /// user submitted; `composed` is the already-composed schema used
    /// for cross-cutting rules. Transport failures surface as
    /// [`PortError::Unavailable`].
    async fn check(&self, composed: &str, modified: &str) -> Result<PolicyResult, PortError>;
}
