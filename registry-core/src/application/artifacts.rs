// registry-core/src/application/artifacts.rs
//
// Builds the `actionFn` hook invoked inside the storage write
// transaction (spec.md §4.6 step 7e, §6 "Artifact output keys"): a
// failure here rolls the whole publish/delete back, so nothing is
// considered durable until its artifacts are too.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::domain::contract::{Contract, SchemaVersionContract};
use crate::domain::ids::TargetId;
use crate::domain::schema_version::SchemaVersion;
use crate::ports::artifact_store::{artifact_key, ArtifactKind, ArtifactStore};
use crate::ports::storage::ActionFn;
use crate::ports::PortError;

/// Builds the `ActionFn` that republishes `version`'s SDL/supergraph
/// (and, per contract, its filtered SDL/supergraph) to `store`.
pub fn publish_artifacts_action<'a>(
    store: &'a dyn ArtifactStore,
    target_id: TargetId,
    version: &'a SchemaVersion,
    contracts: &'a [Contract],
    version_contracts: &'a [SchemaVersionContract],
) -> ActionFn<'a> {
    Box::new(move || -> BoxFuture<'a, Result<(), PortError>> {
        async move {
            let target_key = target_id.to_string();

            if let Some(sdl) = &version.composite_schema_sdl {
                store.put(&artifact_key(&target_key, None, ArtifactKind::Sdl), sdl.clone()).await?;
            }
            if let Some(supergraph) = &version.supergraph_sdl {
                store.put(&artifact_key(&target_key, None, ArtifactKind::SupergraphSdl), supergraph.clone()).await?;
            }

            for version_contract in version_contracts {
                let Some(contract) = contracts.iter().find(|c| c.id == version_contract.contract_id) else {
                    continue;
                };
                if let Some(sdl) = &version_contract.composite_schema_sdl {
                    store.put(&artifact_key(&target_key, Some(&contract.contract_name), ArtifactKind::Sdl), sdl.clone()).await?;
                }
                if let Some(supergraph) = &version_contract.supergraph_sdl {
                    store
                        .put(&artifact_key(&target_key, Some(&contract.contract_name), ArtifactKind::SupergraphSdl), supergraph.clone())
                        .await?;
                }
            }

            Ok(())
        }
        .boxed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::artifact_store::InMemoryArtifactStore;
    use chrono::Utc;

    fn version(target_id: TargetId) -> SchemaVersion {
        SchemaVersion {
            id: crate::domain::ids::SchemaVersionId::new(),
            target_id,
            created_at: Utc::now(),
            is_composable: true,
            previous_schema_version_id: None,
            base_schema: None,
            composite_schema_sdl: Some("type Query { a: Int }".to_string()),
            supergraph_sdl: Some("type Query { a: Int }".to_string()),
            tags: None,
            schema_composition_errors: Vec::new(),
            active_logs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn publishes_sdl_and_supergraph_keys() {
        let store = InMemoryArtifactStore::new();
        let target_id = TargetId::new();
        let v = version(target_id);
        let action = publish_artifacts_action(&store, target_id, &v, &[], &[]);
        action().await.unwrap();

        assert!(store.get(&artifact_key(&target_id.to_string(), None, ArtifactKind::Sdl)).await.unwrap().is_some());
        assert!(store.get(&artifact_key(&target_id.to_string(), None, ArtifactKind::SupergraphSdl)).await.unwrap().is_some());
    }
}
