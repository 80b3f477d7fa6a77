// registry-core/src/infrastructure/sql/storage.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::domain::approval::{ApprovedChanges, SchemaChangeApproval};
use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::ids::{ContractId, SchemaChangeId, SchemaCheckId, SchemaVersionId, TargetId};
use crate::domain::schema_change::SchemaChange;
use crate::domain::schema_check::SchemaCheck;
use crate::domain::schema_log::SchemaLogEntry;
use crate::domain::schema_version::SchemaVersion;
use crate::ports::storage::{ActionFn, LatestSchemas, Storage, VersionWrite};
use crate::ports::PortError;

pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_sqlx(context: &'static str) -> impl Fn(sqlx::Error) -> PortError + Clone {
        move |err| PortError::Storage(format!("{context}: {err}"))
    }
}

#[async_trait]
impl Storage for PostgresStorage {
    async fn create_schema_check(&self, check: SchemaCheck) -> Result<SchemaCheck, PortError> {
        sqlx::query(
            r#"
            INSERT INTO schema_checks (
                id, target_id, schema_sdl, schema_version_id, is_success,
                breaking_changes, safe_changes, policy_warnings, policy_errors,
                composition_errors, contract_checks, composite_schema_sdl,
                supergraph_sdl, context_id, created_at, expires_at,
                integration_metadata, is_manually_approved, approved_by
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18,$19)
            "#,
        )
        .bind(check.id.to_string())
        .bind(check.target_id.to_string())
        .bind(&check.schema_sdl)
        .bind(check.schema_version_id.map(|v| v.to_string()))
        .bind(check.is_success)
        .bind(Json(&check.breaking_changes))
        .bind(Json(&check.safe_changes))
        .bind(Json(&check.policy_warnings))
        .bind(Json(&check.policy_errors))
        .bind(Json(&check.composition_errors))
        .bind(Json(&check.contract_checks))
        .bind(&check.composite_schema_sdl)
        .bind(&check.supergraph_sdl)
        .bind(&check.context_id)
        .bind(check.created_at)
        .bind(check.expires_at)
        .bind(Json(&check.integration_metadata))
        .bind(check.is_manually_approved)
        .bind(&check.approved_by)
        .execute(&self.pool)
        .await
        .map_err(Self::map_sqlx("create_schema_check"))?;
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
        let query = if only_composable {
            r#"SELECT * FROM schema_versions WHERE target_id = $1 AND is_composable ORDER BY created_at DESC LIMIT 1"#
        } else {
            r#"SELECT * FROM schema_versions WHERE target_id = $1 ORDER BY created_at DESC LIMIT 1"#
        };
        let row = sqlx::query(query)
            .bind(target_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_sqlx("get_latest_schemas"))?;
        match row {
            Some(row) => {
                let version = Self::version_from_row(&row)?;
                let logs = version.active_logs.clone();
                Ok(LatestSchemas { version: Some(version), logs })
            }
            None => Ok(LatestSchemas::default()),
        }
    }

    async fn get_maybe_latest_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError> {
        self.latest_version_where(target_id, false).await
    }

    async fn get_maybe_latest_valid_version(&self, target_id: TargetId) -> Result<Option<SchemaVersion>, PortError> {
        self.latest_version_where(target_id, true).await
    }

    async fn get_approved_schema_changes_for_context_id(
        &self,
        target_id: TargetId,
        context_id: &str,
    ) -> Result<ApprovedChanges, PortError> {
        let rows = sqlx::query(
            r#"SELECT schema_change_id, snapshot, approved_by, approved_at
               FROM schema_change_approvals WHERE target_id = $1 AND context_id = $2"#,
        )
        .bind(target_id.to_string())
        .bind(context_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Self::map_sqlx("get_approved_schema_changes_for_context_id"))?;

        let mut approvals = ApprovedChanges::new();
        for row in rows {
            let change_id = SchemaChangeId(row.try_get::<String, _>("schema_change_id").map_err(Self::map_sqlx("row"))?);
            let snapshot: Json<SchemaChange> = row.try_get("snapshot").map_err(Self::map_sqlx("row"))?;
            let approved_by: String = row.try_get("approved_by").map_err(Self::map_sqlx("row"))?;
            let approved_at: DateTime<Utc> = row.try_get("approved_at").map_err(Self::map_sqlx("row"))?;
            approvals.insert(
                change_id.clone(),
                SchemaChangeApproval {
                    target_id,
                    context_id: context_id.to_string(),
                    schema_change_id: change_id,
                    schema_change_snapshot: snapshot.0,
                    approved_by,
                    approved_at,
                },
            );
        }
        Ok(approvals)
    }

    async fn approve_failed_schema_check(
        &self,
        check_id: SchemaCheckId,
        approved_by: &str,
    ) -> Result<SchemaCheck, PortError> {
        let mut tx = self.pool.begin().await.map_err(Self::map_sqlx("approve_failed_schema_check:begin"))?;

        let row = sqlx::query(r#"SELECT * FROM schema_checks WHERE id = $1 FOR UPDATE"#)
            .bind(check_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(Self::map_sqlx("approve_failed_schema_check:select"))?
            .ok_or_else(|| PortError::Storage(format!("schema check {check_id} not found")))?;

        let check = Self::check_from_row(&row)?;
        let context_id = check
            .context_id
            .clone()
            .ok_or_else(|| PortError::Storage(format!("check {check_id} has no context_id, cannot approve")))?;

        let now = Utc::now();
        for change in &check.breaking_changes {
            sqlx::query(
                r#"INSERT INTO schema_change_approvals (target_id, context_id, schema_change_id, snapshot, approved_by, approved_at)
                   VALUES ($1,$2,$3,$4,$5,$6)
                   ON CONFLICT (context_id, schema_change_id) DO UPDATE SET approved_by = EXCLUDED.approved_by, approved_at = EXCLUDED.approved_at"#,
            )
            .bind(check.target_id.to_string())
            .bind(&context_id)
            .bind(&change.id.0)
            .bind(Json(change))
            .bind(approved_by)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_sqlx("approve_failed_schema_check:insert"))?;
        }

        sqlx::query(r#"UPDATE schema_checks SET is_manually_approved = true, approved_by = $2 WHERE id = $1"#)
            .bind(check_id.to_string())
            .bind(approved_by)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_sqlx("approve_failed_schema_check:update"))?;

        tx.commit().await.map_err(Self::map_sqlx("approve_failed_schema_check:commit"))?;

        Ok(SchemaCheck { is_manually_approved: true, approved_by: Some(approved_by.to_string()), ..check })
    }

    async fn purge_expired_schema_checks(&self, expires_at: DateTime<Utc>) -> Result<u64, PortError> {
        let result = sqlx::query(r#"DELETE FROM schema_checks WHERE expires_at <= $1"#)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(Self::map_sqlx("purge_expired_schema_checks"))?;
        Ok(result.rows_affected())
    }

    async fn get_contracts(&self, target_id: TargetId) -> Result<Vec<Contract>, PortError> {
        let rows = sqlx::query(r#"SELECT * FROM contracts WHERE target_id = $1 ORDER BY created_at ASC"#)
            .bind(target_id.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_sqlx("get_contracts"))?;
        rows.iter().map(Self::contract_from_row).collect()
    }

    async fn get_latest_valid_version_contract(
        &self,
        contract_id: ContractId,
    ) -> Result<Option<SchemaVersionContract>, PortError> {
        let row = sqlx::query(
            r#"SELECT * FROM schema_version_contracts
               WHERE contract_id = $1 AND is_composable
               ORDER BY created_at DESC LIMIT 1"#,
        )
        .bind(contract_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_sqlx("get_latest_valid_version_contract"))?;
        row.as_ref().map(Self::version_contract_from_row).transpose()
    }

    async fn create_contract(&self, contract: Contract) -> Result<Contract, PortError> {
        sqlx::query(
            r#"INSERT INTO contracts (id, target_id, contract_name, include_tags, exclude_tags, remove_unreachable_types_from_public_api_schema, created_at)
               VALUES ($1,$2,$3,$4,$5,$6,$7)"#,
        )
        .bind(contract.id.to_string())
        .bind(contract.target_id.to_string())
        .bind(&contract.contract_name)
        .bind(contract.include_tags.as_ref().map(Json))
        .bind(contract.exclude_tags.as_ref().map(Json))
        .bind(contract.remove_unreachable_types_from_public_api_schema)
        .bind(contract.created_at)
        .execute(&self.pool)
        .await
        .map_err(Self::map_sqlx("create_contract"))?;
        Ok(contract)
    }

    async fn update_version_composability(
        &self,
        target_id: TargetId,
        version_id: SchemaVersionId,
        is_composable: bool,
    ) -> Result<SchemaVersion, PortError> {
        let row = sqlx::query(
            r#"UPDATE schema_versions SET is_composable = $3 WHERE target_id = $1 AND id = $2 RETURNING *"#,
        )
        .bind(target_id.to_string())
        .bind(version_id.to_string())
        .bind(is_composable)
        .fetch_optional(&self.pool)
        .await
        .map_err(Self::map_sqlx("update_version_composability"))?
        .ok_or_else(|| PortError::Storage(format!("version {version_id} not found")))?;
        Self::version_from_row(&row)
    }
}

impl PostgresStorage {
    async fn persist_version<'a>(&'a self, write: VersionWrite, action: ActionFn<'a>) -> Result<SchemaVersion, PortError> {
        let mut tx = self.pool.begin().await.map_err(Self::map_sqlx("persist_version:begin"))?;

        sqlx::query(
            r#"
            INSERT INTO schema_versions (
                id, target_id, created_at, is_composable, previous_schema_version_id,
                base_schema, composite_schema_sdl, supergraph_sdl, tags,
                schema_composition_errors, active_logs
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
            "#,
        )
        .bind(write.version.id.to_string())
        .bind(write.version.target_id.to_string())
        .bind(write.version.created_at)
        .bind(write.version.is_composable)
        .bind(write.version.previous_schema_version_id.map(|v| v.to_string()))
        .bind(&write.version.base_schema)
        .bind(&write.version.composite_schema_sdl)
        .bind(&write.version.supergraph_sdl)
        .bind(write.version.tags.as_ref().map(Json))
        .bind(Json(&write.version.schema_composition_errors))
        .bind(Json(&write.version.active_logs))
        .execute(&mut *tx)
        .await
        .map_err(Self::map_sqlx("persist_version:insert_version"))?;

        for change in &write.changes {
            sqlx::query(r#"INSERT INTO schema_version_changes (version_id, change) VALUES ($1, $2)"#)
                .bind(write.version.id.to_string())
                .bind(Json(change))
                .execute(&mut *tx)
                .await
                .map_err(Self::map_sqlx("persist_version:insert_change"))?;
        }

        for svc in &write.version_contracts {
            sqlx::query(
                r#"INSERT INTO schema_version_contracts (
                    id, schema_version_id, contract_id, composite_schema_sdl,
                    supergraph_sdl, is_composable, schema_composition_errors,
                    last_schema_version_contract_id, created_at
                ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)"#,
            )
            .bind(svc.id.to_string())
            .bind(svc.schema_version_id.to_string())
            .bind(svc.contract_id.to_string())
            .bind(&svc.composite_schema_sdl)
            .bind(&svc.supergraph_sdl)
            .bind(svc.is_composable)
            .bind(Json(&svc.schema_composition_errors))
            .bind(svc.last_schema_version_contract_id.map(|v| v.to_string()))
            .bind(svc.created_at)
            .execute(&mut *tx)
            .await
            .map_err(Self::map_sqlx("persist_version:insert_version_contract"))?;
        }

        if write.make_latest || write.make_latest_composable {
            sqlx::query(
                r#"UPDATE targets SET
                    latest_version_id = CASE WHEN $2 THEN $1 ELSE latest_version_id END,
                    latest_composable_version_id = CASE WHEN $3 THEN $1 ELSE latest_composable_version_id END
                   WHERE id = $4"#,
            )
            .bind(write.version.id.to_string())
            .bind(write.make_latest)
            .bind(write.make_latest_composable)
            .bind(write.version.target_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(Self::map_sqlx("persist_version:update_target"))?;
        }

        // Side effects (artifact emission, cache writes) run inside the
        // same transaction boundary: a failure here rolls the row back.
        action().await?;

        tx.commit().await.map_err(Self::map_sqlx("persist_version:commit"))?;

        Ok(write.version)
    }

    async fn latest_version_where(&self, target_id: TargetId, only_composable: bool) -> Result<Option<SchemaVersion>, PortError> {
        let query = if only_composable {
            r#"SELECT * FROM schema_versions WHERE target_id = $1 AND is_composable ORDER BY created_at DESC LIMIT 1"#
        } else {
            r#"SELECT * FROM schema_versions WHERE target_id = $1 ORDER BY created_at DESC LIMIT 1"#
        };
        let row = sqlx::query(query)
            .bind(target_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_sqlx("latest_version_where"))?;
        row.as_ref().map(Self::version_from_row).transpose()
    }

    fn version_from_row(row: &sqlx::postgres::PgRow) -> Result<SchemaVersion, PortError> {
        let map_err = Self::map_sqlx("version_from_row");
        let id: String = row.try_get("id").map_err(map_err.clone())?;
        let target_id: String = row.try_get("target_id").map_err(map_err.clone())?;
        let previous: Option<String> = row.try_get("previous_schema_version_id").map_err(map_err.clone())?;
        let tags: Option<Json<Vec<String>>> = row.try_get("tags").map_err(map_err.clone())?;
        let errors: Json<Vec<String>> = row.try_get("schema_composition_errors").map_err(map_err.clone())?;
        let logs: Json<Vec<SchemaLogEntry>> = row.try_get("active_logs").map_err(map_err.clone())?;

        Ok(SchemaVersion {
            id: SchemaVersionId::from_uuid(parse_uuid(&id)?),
            target_id: TargetId::from_uuid(parse_uuid(&target_id)?),
            created_at: row.try_get("created_at").map_err(map_err.clone())?,
            is_composable: row.try_get("is_composable").map_err(map_err.clone())?,
            previous_schema_version_id: previous.map(|s| parse_uuid(&s)).transpose()?.map(SchemaVersionId::from_uuid),
            base_schema: row.try_get("base_schema").map_err(map_err.clone())?,
            composite_schema_sdl: row.try_get("composite_schema_sdl").map_err(map_err.clone())?,
            supergraph_sdl: row.try_get("supergraph_sdl").map_err(map_err.clone())?,
            tags: tags.map(|t| t.0),
            schema_composition_errors: errors.0,
            active_logs: logs.0,
        })
    }

    fn check_from_row(row: &sqlx::postgres::PgRow) -> Result<SchemaCheck, PortError> {
        let map_err = Self::map_sqlx("check_from_row");
        let id: String = row.try_get("id").map_err(map_err.clone())?;
        let target_id: String = row.try_get("target_id").map_err(map_err.clone())?;
        let schema_version_id: Option<String> = row.try_get("schema_version_id").map_err(map_err.clone())?;
        Ok(SchemaCheck {
            id: SchemaCheckId::from_uuid(parse_uuid(&id)?),
            target_id: TargetId::from_uuid(parse_uuid(&target_id)?),
            schema_sdl: row.try_get("schema_sdl").map_err(map_err.clone())?,
            schema_version_id: schema_version_id.map(|s| parse_uuid(&s)).transpose()?.map(SchemaVersionId::from_uuid),
            is_success: row.try_get("is_success").map_err(map_err.clone())?,
            breaking_changes: row.try_get::<Json<_>, _>("breaking_changes").map_err(map_err.clone())?.0,
            safe_changes: row.try_get::<Json<_>, _>("safe_changes").map_err(map_err.clone())?.0,
            policy_warnings: row.try_get::<Json<_>, _>("policy_warnings").map_err(map_err.clone())?.0,
            policy_errors: row.try_get::<Json<_>, _>("policy_errors").map_err(map_err.clone())?.0,
            composition_errors: row.try_get::<Json<_>, _>("composition_errors").map_err(map_err.clone())?.0,
            contract_checks: row.try_get::<Json<_>, _>("contract_checks").map_err(map_err.clone())?.0,
            composite_schema_sdl: row.try_get("composite_schema_sdl").map_err(map_err.clone())?,
            supergraph_sdl: row.try_get("supergraph_sdl").map_err(map_err.clone())?,
            context_id: row.try_get("context_id").map_err(map_err.clone())?,
            created_at: row.try_get("created_at").map_err(map_err.clone())?,
            expires_at: row.try_get("expires_at").map_err(map_err.clone())?,
            integration_metadata: row.try_get::<Json<_>, _>("integration_metadata").map_err(map_err.clone())?.0,
            is_manually_approved: row.try_get("is_manually_approved").map_err(map_err.clone())?,
            approved_by: row.try_get("approved_by").map_err(map_err)?,
        })
    }

    fn contract_from_row(row: &sqlx::postgres::PgRow) -> Result<Contract, PortError> {
        let map_err = Self::map_sqlx("contract_from_row");
        let id: String = row.try_get("id").map_err(map_err.clone())?;
        let target_id: String = row.try_get("target_id").map_err(map_err.clone())?;
        let include_tags: Option<Json<Vec<String>>> = row.try_get("include_tags").map_err(map_err.clone())?;
        let exclude_tags: Option<Json<Vec<String>>> = row.try_get("exclude_tags").map_err(map_err.clone())?;
        Ok(Contract {
            id: ContractId::from_uuid(parse_uuid(&id)?),
            target_id: TargetId::from_uuid(parse_uuid(&target_id)?),
            contract_name: row.try_get("contract_name").map_err(map_err.clone())?,
            include_tags: include_tags.map(|t| t.0),
            exclude_tags: exclude_tags.map(|t| t.0),
            remove_unreachable_types_from_public_api_schema: row
                .try_get("remove_unreachable_types_from_public_api_schema")
                .map_err(map_err.clone())?,
            created_at: row.try_get("created_at").map_err(map_err)?,
        })
    }

    fn version_contract_from_row(row: &sqlx::postgres::PgRow) -> Result<SchemaVersionContract, PortError> {
        let map_err = Self::map_sqlx("version_contract_from_row");
        let id: String = row.try_get("id").map_err(map_err.clone())?;
        let schema_version_id: String = row.try_get("schema_version_id").map_err(map_err.clone())?;
        let contract_id: String = row.try_get("contract_id").map_err(map_err.clone())?;
        let last: Option<String> = row.try_get("last_schema_version_contract_id").map_err(map_err.clone())?;
        let errors: Json<Vec<String>> = row.try_get("schema_composition_errors").map_err(map_err.clone())?;
        Ok(SchemaVersionContract {
            id: crate::domain::ids::SchemaVersionContractId::from_uuid(parse_uuid(&id)?),
            schema_version_id: SchemaVersionId::from_uuid(parse_uuid(&schema_version_id)?),
            contract_id: ContractId::from_uuid(parse_uuid(&contract_id)?),
            composite_schema_sdl: row.try_get("composite_schema_sdl").map_err(map_err.clone())?,
            supergraph_sdl: row.try_get("supergraph_sdl").map_err(map_err.clone())?,
            is_composable: row.try_get("is_composable").map_err(map_err.clone())?,
            schema_composition_errors: errors.0,
            last_schema_version_contract_id: last
                .map(|s| parse_uuid(&s))
                .transpose()?
                .map(crate::domain::ids::SchemaVersionContractId::from_uuid),
            created_at: row.try_get("created_at").map_err(map_err)?,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<uuid::Uuid, PortError> {
    raw.parse().map_err(|err| PortError::Storage(format!("invalid uuid {raw}: {err}")))
}
