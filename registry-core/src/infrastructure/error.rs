// registry-core/src/infrastructure/error.rs
//
// Errors from the adapters behind the ports — I/O, SQL, HTTP. Kept
// separate from [`crate::ports::PortError`] because a port error is a
// *contract* outcome (e.g. "composer unavailable, retry me") while an
// infrastructure error is the low-level cause an adapter converts into
// one of those contract outcomes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
