// registry-cli/src/commands/approve.rs

use std::path::Path;

use registry_core::domain::ids::SchemaCheckId;
use registry_core::ports::storage::Storage;

use crate::commands::Adapters;
use crate::state::State;

pub async fn execute(state_path: &Path, check_id: String, approved_by: String) -> anyhow::Result<()> {
    let mut state = State::load(state_path)?;
    let check_id = SchemaCheckId::from_uuid(uuid::Uuid::parse_str(&check_id)?);

    let adapters = Adapters::new();
    adapters.storage.seed(state.target.id, state.snapshot.clone()).await;

    let approved = adapters.storage.approve_failed_schema_check(check_id, &approved_by).await?;
    println!("approved {} breaking change(s) on check {}", approved.breaking_changes.len(), approved.id);

    state.snapshot = adapters.storage.snapshot(state.target.id).await;
    state.save(state_path)?;
    Ok(())
}
