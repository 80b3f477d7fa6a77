// registry-core/src/ports/storage.rs
//
// The full storage contract from spec.md §4.7. Storage owns
// deterministic ordering (`created_at` with an `id` tie-break) and
// MUST serialize writes to the same target — ordinarily guaranteed by
// the caller holding `registry:lock:{target_id}` (§5), with a
// defensive row-level lock on the target row inside write
// transactions as a second line of defense.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::domain::approval::ApprovedChanges;
use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::ids::{ContractId, SchemaCheckId, TargetId};
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_check::SchemaCheck;
use crate::domain::schema_log::SchemaLogEntry;
use crate::domain::schema_version::SchemaVersion;
use crate::ports::PortError;

#[derive(Debug, Clone, Default)]
pub struct LatestSchemas {
    pub version: Option<SchemaVersion>,
    /// Keyed by `service_name`; empty for single-schema projects
    /// (where there is exactly one conceptual "service").
    pub logs: Vec<SchemaLogEntry>,
}

/// The transactional side-effect invoked just before `COMMIT` inside
/// `create_schema_version`/`delete_schema` (spec.md §4.6 step 7,
/// §9 "Transactional side-effects"). If it returns `Err`, the whole
/// write rolls back: commit implies "artifacts are durable".
pub type ActionFn<'a> = Box<dyn FnOnce() -> BoxFuture<'a, Result<(), PortError>> + Send + 'a>;

/// Everything `create_schema_version`/`delete_schema` need to persist
/// atomically: the new version row, its change rows, its per-contract
/// rows, and whether it becomes the new latest / latest-composable
/// pointer.
pub struct VersionWrite {
    pub version: SchemaVersion,
    pub changes: Vec<SchemaChange>,
    pub version_contracts: Vec<SchemaVersionContract>,
    pub make_latest: bool,
    pub make_latest_composable: bool,
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Always persists a check row, success or failure (spec.md §4.6
    /// step 7 "Check").
    async fn create_schema_check(&self, check: SchemaCheck) -> Result<SchemaCheck, PortError>;

    /// Transactional publish-accept persistence (spec.md §4.6 step 7
    /// "Publish accept"). `action` runs inside the same transaction,
    /// before commit.
    async fn create_schema_version<'a>(
        &'a self,
        write: VersionWrite,
        action: ActionFn<'a>,
    ) -> Result<SchemaVersion, PortError>;

    /// Same mechanics as `create_schema_version`, for a DELETE log
    /// entry (spec.md §4.6 step 7 "Delete accept").
    async fn delete_schema<'a>(
        &'a self,
        write: VersionWrite,
        action: ActionFn<'a>,
    ) -> Result<SchemaVersion, PortError>;

    async fn get_latest_schemas(&self, target_id: TargetId, only_composable: bool) -> Result<LatestSchemas, PortError>;

    async fn get_maybe_latest_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError>;

    async fn get_maybe_latest_valid_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError>;

    async fn get_approved_schema_changes_for_context_id(
        &self,
        target_id: TargetId,
        context_id: &str,
    ) -> Result<ApprovedChanges, PortError>;

    /// Promotes a failing check's breaking changes into approvals
    /// scoped to its `context_id` (the `approveFailedSchemaCheck`
    /// inbound operation, spec.md §6).
    async fn approve_failed_schema_check(
        &self,
        check_id: SchemaCheckId,
        approved_by: &str,
    ) -> Result<SchemaCheck, PortError>;

    /// Deletes exactly `{c | c.expires_at <= expires_at}` in a single
    /// transaction; approvals (keyed by `context_id`, not check id)
    /// are untouched (spec.md invariant I6). Returns the number of
    /// rows deleted.
    async fn purge_expired_schema_checks(&self, expires_at: DateTime<Utc>) -> Result<u64, PortError>;

    async fn get_contracts(&self, target_id: TargetId) -> Result<Vec<Contract>, PortError>;

    async fn get_latest_valid_version_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<SchemaVersionContract>, PortError>;

    async fn create_contract(&self, contract: Contract) -> Result<Contract, PortError>;

    /// Flips `is_composable` on a past version (the `updateVersionStatus`
    /// admin operation, spec.md §6). Does not itself republish
    /// artifacts — that is the publisher's job once this returns.
    async fn update_version_composability(
        &self,
        target_id: TargetId,
        version_id: crate::domain::ids::SchemaVersionId,
        is_composable: bool,
    ) -> Result<SchemaVersion, PortError>;
}
