// registry-core/src/infrastructure/memory/storage.rs
//
// Reference `Storage` implementation backing the CLI demo and the
// integration tests. Not meant to survive a process restart; see
// `infrastructure::sql` for the durable adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::RwLock;

use crate::domain::approval::{ApprovedChanges, SchemaChangeApproval};
use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::ids::{ContractId, SchemaChangeId, SchemaCheckId, SchemaVersionId, TargetId};
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_check::SchemaCheck;
use crate::domain::schema_version::SchemaVersion;
use crate::ports::storage::{ActionFn, LatestSchemas, Storage, VersionWrite};
use crate::ports::PortError;

/// A serializable dump of everything this adapter holds for one
/// target. Exists for callers with no durable backing store of their
/// own (the CLI demo) that still need state to survive past one
/// process — not used by the pipeline itself.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TargetSnapshot {
    pub versions: Vec<SchemaVersion>,
    pub checks: Vec<SchemaCheck>,
    pub contracts: Vec<Contract>,
    pub version_contracts: Vec<SchemaVersionContract>,
    pub approvals_by_context: HashMap<String, ApprovedChanges>,
    pub latest_version_id: Option<SchemaVersionId>,
    pub latest_composable_version_id: Option<SchemaVersionId>,
}

#[derive(Default)]
struct TargetRecord {
    versions: Vec<SchemaVersion>,
    changes: Vec<SchemaChange>,
    checks: Vec<SchemaCheck>,
    contracts: Vec<Contract>,
    version_contracts: Vec<SchemaVersionContract>,
    approvals_by_context: HashMap<String, ApprovedChanges>,
    latest_version_id: Option<SchemaVersionId>,
    latest_composable_version_id: Option<SchemaVersionId>,
}

#[derive(Default)]
pub struct InMemoryStorage {
    targets: DashMap<TargetId, RwLock<TargetRecord>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self, target_id: TargetId) -> TargetSnapshot {
        let Some(entry) = self.targets.get(&target_id) else { return TargetSnapshot::default() };
        let record = entry.read().await;
        TargetSnapshot {
            versions: record.versions.clone(),
            checks: record.checks.clone(),
            contracts: record.contracts.clone(),
            version_contracts: record.version_contracts.clone(),
            approvals_by_context: record.approvals_by_context.clone(),
            latest_version_id: record.latest_version_id,
            latest_composable_version_id: record.latest_composable_version_id,
        }
    }

    pub async fn seed(&self, target_id: TargetId, snapshot: TargetSnapshot) {
        let entry = self.targets.entry(target_id).or_default();
        let mut record = entry.write().await;
        record.versions = snapshot.versions;
        record.checks = snapshot.checks;
        record.contracts = snapshot.contracts;
        record.version_contracts = snapshot.version_contracts;
        record.approvals_by_context = snapshot.approvals_by_context;
        record.latest_version_id = snapshot.latest_version_id;
        record.latest_composable_version_id = snapshot.latest_composable_version_id;
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_schema_check(&self, check: SchemaCheck) -> Result<SchemaCheck, PortError> {
        let entry = self.targets.entry(check.target_id).or_default();
        let mut record = entry.write().await;
        record.checks.push(check.clone());
        Ok(check)
    }

    async fn create_schema_version<'a>(
        &'a self,
        write: VersionWrite,
        action: ActionFn<'a>,
    ) -> Result<SchemaVersion, PortError> {
        self.persist_version(write, action).await
    }

    async fn delete_schema<'a>(
        &'a self,
        write: VersionWrite,
        action: ActionFn<'a>,
    ) -> Result<SchemaVersion, PortError> {
        self.persist_version(write, action).await
    }

    async fn get_latest_schemas(&self, target_id: TargetId, only_composable: bool) -> Result<LatestSchemas, PortError> {
        let Some(entry) = self.targets.get(&target_id) else {
            return Ok(LatestSchemas::default());
        };
        let record = entry.read().await;
        let version = if only_composable {
            record.versions.iter().rev().find(|v| v.is_composable)
        } else {
            record.versions.last()
        };
        match version {
            Some(v) => Ok(LatestSchemas { version: Some(v.clone()), logs: v.active_logs.clone() }),
            None => Ok(LatestSchemas::default()),
        }
    }

    async fn get_maybe_latest_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError> {
        let Some(entry) = self.targets.get(&target_id) else { return Ok(None) };
        let record = entry.read().await;
        Ok(record.versions.last().cloned())
    }

    async fn get_maybe_latest_valid_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError> {
        let Some(entry) = self.targets.get(&target_id) else { return Ok(None) };
        let record = entry.read().await;
        Ok(record.versions.iter().rev().find(|v| v.is_composable).cloned())
    }

    async fn get_approved_schema_changes_for_context_id(
        &self,
        target_id: TargetId,
        context_id: &str,
    ) -> Result<ApprovedChanges, PortError> {
        let Some(entry) = self.targets.get(&target_id) else { return Ok(ApprovedChanges::default()) };
        let record = entry.read().await;
        Ok(record.approvals_by_context.get(context_id).cloned().unwrap_or_default())
    }

    async fn approve_failed_schema_check(
        &self,
        check_id: SchemaCheckId,
        approved_by: &str,
    ) -> Result<SchemaCheck, PortError> {
        for entry in self.targets.iter() {
            let mut record = entry.write().await;
            if let Some(check) = record.checks.iter().find(|c| c.id == check_id).cloned() {
                let Some(context_id) = check.context_id.clone() else {
                    return Err(PortError::Storage(format!(
                        "check {check_id} has no context_id, cannot approve"
                    )));
                };
                let now = Utc::now();
                let approvals = record.approvals_by_context.entry(context_id.clone()).or_default();
                for change in &check.breaking_changes {
                    approvals.insert(
                        change.id.clone(),
                        SchemaChangeApproval {
                            target_id: check.target_id,
                            context_id: context_id.clone(),
                            schema_change_id: change.id.clone(),
                            schema_change_snapshot: change.clone(),
                            approved_by: approved_by.to_string(),
                            approved_at: now,
                        },
                    );
                }
                if let Some(stored) = record.checks.iter_mut().find(|c| c.id == check_id) {
                    stored.is_manually_approved = true;
                    stored.approved_by = Some(approved_by.to_string());
                    return Ok(stored.clone());
                }
            }
        }
        Err(PortError::Storage(format!("schema check {check_id} not found")))
    }

    async fn purge_expired_schema_checks(&self, expires_at: DateTime<Utc>) -> Result<u64, PortError> {
        let mut purged = 0u64;
        for entry in self.targets.iter() {
            let mut record = entry.write().await;
            let before = record.checks.len();
            record.checks.retain(|c| c.expires_at > expires_at);
            purged += (before - record.checks.len()) as u64;
        }
        Ok(purged)
    }

    async fn get_contracts(&self, target_id: TargetId) -> Result<Vec<Contract>, PortError> {
        let Some(entry) = self.targets.get(&target_id) else { return Ok(Vec::new()) };
        Ok(entry.read().await.contracts.clone())
    }

    async fn get_latest_valid_version_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<SchemaVersionContract>, PortError> {
        let mut best: Option<SchemaVersionContract> = None;
        for entry in self.targets.iter() {
            let record = entry.read().await;
            for svc in record.version_contracts.iter().filter(|v| v.contract_id == contract_id && v.is_composable) {
                let is_newer = match &best {
                    Some(b) => svc.created_at > b.created_at,
                    None => true,
                };
                if is_newer {
                    best = Some(svc.clone());
                }
            }
        }
        Ok(best)
    }

    async fn create_contract(&self, contract: Contract) -> Result<Contract, PortError> {
        let entry = self.targets.entry(contract.target_id).or_default();
        let mut record = entry.write().await;
        record.contracts.push(contract.clone());
        Ok(contract)
    }

    async fn update_version_composability(
        &self,
        target_id: TargetId,
        version_id: SchemaVersionId,
        is_composable: bool,
    ) -> Result<SchemaVersion, PortError> {
        let entry = self.targets.entry(target_id).or_default();
        let mut record = entry.write().await;
        let version = record
            .versions
            .iter_mut()
            .find(|v| v.id == version_id)
            .ok_or_else(|| PortError::Storage(format!("version {version_id} not found")))?;
        version.is_composable = is_composable;
        Ok(version.clone())
    }
}

impl InMemoryStorage {
    async fn persist_version<'a>(&'a self, write: VersionWrite, action: ActionFn<'a>) -> Result<SchemaVersion, PortError> {
        action().await?;

        let entry = self.targets.entry(write.version.target_id).or_default();
        let mut record = entry.write().await;
        record.versions.push(write.version.clone());
        record.changes.extend(write.changes);
        record.version_contracts.extend(write.version_contracts);
        if write.make_latest {
            record.latest_version_id = Some(write.version.id);
        }
        if write.make_latest_composable {
            record.latest_composable_version_id = Some(write.version.id);
        }
        Ok(write.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{OrganizationId, ProjectId};

    fn sample_version(target_id: TargetId) -> SchemaVersion {
        SchemaVersion {
            id: SchemaVersionId::new(),
            target_id,
            created_at: Utc::now(),
            is_composable: true,
            previous_schema_version_id: None,
            base_schema: None,
            composite_schema_sdl: Some("type Query { ok: Boolean }".to_string()),
            supergraph_sdl: None,
            tags: None,
            schema_composition_errors: Vec::new(),
            active_logs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_then_fetch_latest_version() {
        let storage = InMemoryStorage::new();
        let _org = OrganizationId::new();
        let _proj = ProjectId::new();
        let target_id = TargetId::new();
        let version = sample_version(target_id);

        let write = VersionWrite {
            version: version.clone(),
            changes: Vec::new(),
            version_contracts: Vec::new(),
            make_latest: true,
            make_latest_composable: true,
        };
        storage
            .create_schema_version(write, Box::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();

        let fetched = storage.get_maybe_latest_version(target_id).await.unwrap().unwrap();
        assert_eq!(fetched.id, version.id);
    }

    #[tokio::test]
    async fn snapshot_then_seed_round_trip() {
        let storage = InMemoryStorage::new();
        let target_id = TargetId::new();
        let version = sample_version(target_id);
        let write = VersionWrite {
            version: version.clone(),
            changes: Vec::new(),
            version_contracts: Vec::new(),
            make_latest: true,
            make_latest_composable: true,
        };
        storage
            .create_schema_version(write, Box::new(|| Box::pin(async { Ok(()) })))
            .await
            .unwrap();

        let snapshot = storage.snapshot(target_id).await;
        assert_eq!(snapshot.versions.len(), 1);

        let restored = InMemoryStorage::new();
        restored.seed(target_id, snapshot).await;
        let fetched = restored.get_maybe_latest_version(target_id).await.unwrap().unwrap();
        assert_eq!(fetched.id, version.id);
    }

    #[tokio::test]
    async fn action_failure_aborts_persistence() {
        let storage = InMemoryStorage::new();
        let target_id = TargetId::new();
        let write = VersionWrite {
            version: sample_version(target_id),
            changes: Vec::new(),
            version_contracts: Vec::new(),
            make_latest: true,
            make_latest_composable: true,
        };
        let result = storage
            .create_schema_version(write, Box::new(|| Box::pin(async { Err(PortError::ArtifactStore("boom".into())) })))
            .await;
        assert!(result.is_err());
        assert!(storage.get_maybe_latest_version(target_id).await.unwrap().is_none());
    }

    fn sample_check(target_id: TargetId, context_id: &str, expires_at: DateTime<Utc>) -> SchemaCheck {
        use crate::domain::schema_change::{FIELD_TYPE_CHANGED, Severity};
        let change = SchemaChange::new(FIELD_TYPE_CHANGED, Severity::Breaking, serde_json::json!({"field": "name"}), None);
        SchemaCheck {
            id: SchemaCheckId::new(),
            target_id,
            schema_sdl: "type Query { ok: Boolean }".to_string(),
            schema_version_id: None,
            is_success: false,
            breaking_changes: vec![change],
            safe_changes: Vec::new(),
            policy_warnings: Vec::new(),
            policy_errors: Vec::new(),
            composition_errors: Vec::new(),
            contract_checks: Vec::new(),
            composite_schema_sdl: None,
            supergraph_sdl: None,
            context_id: Some(context_id.to_string()),
            created_at: Utc::now(),
            expires_at,
            integration_metadata: None,
            is_manually_approved: false,
            approved_by: None,
        }
    }

    #[tokio::test]
    async fn purge_removes_only_expired_checks_and_leaves_approvals_untouched() {
        let storage = InMemoryStorage::new();
        let target_id = TargetId::new();
        let now = Utc::now();

        let expired = storage
            .create_schema_check(sample_check(target_id, "repo#1", now - chrono::Duration::seconds(1)))
            .await
            .unwrap();
        let live = storage
            .create_schema_check(sample_check(target_id, "repo#2", now + chrono::Duration::hours(1)))
            .await
            .unwrap();

        storage.approve_failed_schema_check(expired.id, "alice").await.unwrap();
        storage.approve_failed_schema_check(live.id, "bob").await.unwrap();

        let purged = storage.purge_expired_schema_checks(now).await.unwrap();
        assert_eq!(purged, 1);

        let snapshot = storage.snapshot(target_id).await;
        assert_eq!(snapshot.checks.len(), 1);
        assert_eq!(snapshot.checks[0].id, live.id);

        // approvals are keyed by context_id, independent of the check
        // rows they were raised from, so purging the expired check's
        // row must not remove its context's recorded approval.
        let approved_repo1 = storage.get_approved_schema_changes_for_context_id(target_id, "repo#1").await.unwrap();
        let approved_repo2 = storage.get_approved_schema_changes_for_context_id(target_id, "repo#2").await.unwrap();
        assert_eq!(approved_repo1.len(), 1, "approval for the purged check's context must survive the purge");
        assert_eq!(approved_repo2.len(), 1);
    }
}
