// registry-core/src/infrastructure/mod.rs
//
// Adapters implementing the `ports` traits. `memory` backs the CLI
// demo and the test suite; `sql` and `composer_http` are the
// production adapters described in spec.md §4.7 and §6.

pub mod composer_http;
pub mod error;
pub mod memory;
pub mod postgres_lock;
pub mod sql;

pub use error::InfrastructureError;
