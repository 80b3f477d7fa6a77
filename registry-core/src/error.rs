// registry-core/src/error.rs

use thiserror::Error;

use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::PortError;

/// Top-level facade error. Mirrors the teacher's `VerityError`: every
/// subsystem error eventually reaches this type, either transparently
/// wrapped or, for "this should never happen" conditions, escalated
/// as [`RegistryError::InternalError`] (spec.md §7 kind 5).
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Infrastructure(#[from] InfrastructureError),

    #[error(transparent)]
    Port(#[from] PortError),

    /// Input-validation failures that should surface as a `Reject`
    /// with a specific code rather than an internal error (spec.md §7
    /// kind 1). Carries a stable machine-readable code plus message.
    #[error("validation failed ({code}): {message}")]
    Validation { code: &'static str, message: String },

    /// The request's cancellation signal fired (spec.md §5
    /// "Cancellation").
    #[error("operation cancelled")]
    Cancelled,

    /// Programmer-invariant violations that aren't representable as a
    /// `DomainError` variant — escalated to the error-reporting
    /// collaborator by whoever catches this at the boundary.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for RegistryError {
    fn from(err: std::io::Error) -> Self {
        RegistryError::Infrastructure(InfrastructureError::Io(err))
    }
}

impl RegistryError {
    pub fn validation(code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation { code, message: message.into() }
    }

    /// Operational, transport-style failures are retriable (spec.md
    /// §7 kind 3); everything else is not.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            RegistryError::Port(PortError::Unavailable(_))
                | RegistryError::Infrastructure(InfrastructureError::Transport(_))
        )
    }
}
