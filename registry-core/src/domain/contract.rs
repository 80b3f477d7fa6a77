// registry-core/src/domain/contract.rs
//
// Contracts are tag-filtered views of a schema version. Per spec.md
// §9 ("cyclic references"): `schema_version_contracts.
// last_schema_version_contract_id` forms a lineage chain per
// contract, modeled here as an arena (a flat, append-only store keyed
// by id) rather than pointers, so the chain is just repeated id
// lookups and never an actual cycle in memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::{ContractId, SchemaVersionContractId, SchemaVersionId, TargetId};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub id: ContractId,
    pub target_id: TargetId,
    pub contract_name: String,
    pub include_tags: Option<Vec<String>>,
    pub exclude_tags: Option<Vec<String>>,
    pub remove_unreachable_types_from_public_api_schema: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchemaVersionContract {
    pub id: SchemaVersionContractId,
    pub schema_version_id: SchemaVersionId,
    pub contract_id: ContractId,
    pub composite_schema_sdl: Option<String>,
    pub supergraph_sdl: Option<String>,
    pub is_composable: bool,
    pub schema_composition_errors: Vec<String>,
    /// Chains to the previous *successful* (composable) version of
    /// this same contract — not necessarily the immediately preceding
    /// schema version.
    pub last_schema_version_contract_id: Option<SchemaVersionContractId>,
    pub created_at: DateTime<Utc>,
}

/// Append-only arena of `SchemaVersionContract` records, indexed by
/// id and additionally by contract for "latest valid for contract X"
/// lookups.
#[derive(Debug, Default)]
pub struct ContractVersionArena {
    records: Vec<SchemaVersionContract>,
}

impl ContractVersionArena {
    pub fn new() -> Self {
        Self { records: Vec::new() }
    }

    pub fn insert(&mut self, record: SchemaVersionContract) {
        self.records.push(record);
    }

    pub fn get(&self, id: SchemaVersionContractId) -> Option<&SchemaVersionContract> {
        self.records.iter().find(|r| r.id == id)
    }

    /// The most recently created composable record for `contract_id`,
    /// i.e. the baseline the next version's diff for that contract
    /// runs against.
    pub fn latest_valid_for_contract(&self, contract_id: ContractId) -> Option<&SchemaVersionContract> {
        self.records
            .iter()
            .filter(|r| r.contract_id == contract_id && r.is_composable)
            .max_by_key(|r| r.created_at)
    }

    /// Walks the `last_schema_version_contract_id` chain from `start`
    /// back to genesis, oldest last.
    pub fn lineage(&self, start: SchemaVersionContractId) -> Vec<&SchemaVersionContract> {
        let mut chain = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            let Some(record) = self.get(id) else { break };
            chain.push(record);
            cursor = record.last_schema_version_contract_id;
        }
        chain
    }
}
