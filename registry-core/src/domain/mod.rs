// registry-core/src/domain/mod.rs

pub mod approval;
pub mod contract;
pub mod error;
pub mod ids;
pub mod project;
pub mod schema_change;
pub mod schema_check;
pub mod schema_log;
pub mod schema_version;
pub mod target;

pub use error::DomainError;
