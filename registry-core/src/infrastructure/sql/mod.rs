// registry-core/src/infrastructure/sql/mod.rs
//
// Durable `Storage` adapter over Postgres. Structured columns hold the
// fields queries filter/sort on (`target_id`, `created_at`,
// `is_composable`, `expires_at`); everything else — change lists,
// active logs, per-contract results — rides along as `jsonb`, the same
// split golem's component registry and almanac's repository layer use
// for nested domain payloads that are always read back whole.

mod storage;

pub use storage::PostgresStorage;
