// registry-core/src/lib.rs

#![allow(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::perf)]

//! Schema registry core: the check/publish/delete decision pipeline,
//! the schema-version state machine, and the concurrency contract
//! that the rest of a multi-tenant GraphQL schema registry is built
//! around. HTTP/RPC transport, authentication, the composition
//! engine, the policy engine, object storage, notification fan-out
//! and usage analytics are all external collaborators reached through
//! [`ports`].

// --- PORTS (interfaces this crate requires from the outside world) ---
pub mod ports;

// --- DOMAIN (data model, state machine; depends on nothing else here) ---
pub mod domain;

// --- SCHEMA HELPER (canonicalization & checksum) ---
pub mod schema_helper;

// --- REGISTRY CHECKS (the reusable check primitives) ---
pub mod checks;

// --- INSPECTOR (schema diffing) ---
pub mod inspector;

// --- PROJECT MODELS (check/publish/delete per project shape) ---
pub mod models;

// --- APPLICATION (Schema Publisher: top-level orchestration) ---
pub mod application;

// --- INFRASTRUCTURE (adapters implementing the ports) ---
pub mod infrastructure;

// --- BACKGROUND WORKERS ---
pub mod background;

// --- ERROR HANDLING (facade) ---
pub mod error;

pub use error::RegistryError;
