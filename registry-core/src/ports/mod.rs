// registry-core/src/ports/mod.rs
//
// This module defines what the pipeline needs from the outside world,
// without knowing how it's provided. Analogy kept from the teacher's
// `ports::connector`: these are electrical outlets — they define the
// shape and the voltage, not whether the power comes from Postgres,
// Redis, or an in-memory test double.

pub mod artifact_store;
pub mod cache;
pub mod lock;
pub mod notifier;
pub mod orchestrator;
pub mod policy;
pub mod storage;
pub mod usage;

pub use artifact_store::ArtifactStore;
pub use cache::IdempotencyCache;
pub use lock::{DistributedLock, LockGuard};
pub use notifier::Notifier;
pub use orchestrator::Orchestrator;
pub use policy::PolicyEngine;
pub use storage::Storage;
pub use usage::UsageOracle;

use thiserror::Error;

/// Errors raised by port implementations. `Unavailable` is the only
/// variant the pipeline retries (spec.md §4.2 "Fails with
/// OrchestratorUnavailable on transport errors; these are retried by
/// the caller. Validation errors are not retried.").
#[derive(Error, Debug, Clone)]
pub enum PortError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("lock error: {0}")]
    Lock(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("artifact store error: {0}")]
    ArtifactStore(String),

    #[error("notification error: {0}")]
    Notification(String),
}
