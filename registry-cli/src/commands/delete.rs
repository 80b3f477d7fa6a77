// registry-cli/src/commands/delete.rs

use std::path::Path;

use registry_core::application::Publisher;
use registry_core::models::DeleteInput;
use registry_core::models::conclusion::SchemaDeleteConclusion;

use crate::commands::Adapters;
use crate::state::State;

pub async fn execute(state_path: &Path, service_name: String, dry_run: bool) -> anyhow::Result<()> {
    let mut state = State::load(state_path)?;

    let adapters = Adapters::new();
    adapters.storage.seed(state.target.id, state.snapshot.clone()).await;

    let publisher = Publisher {
        storage: &adapters.storage,
        lock: &adapters.lock,
        cache: &adapters.cache,
        artifact_store: &adapters.artifact_store,
        notifier: &adapters.notifier,
        orchestrator: &adapters.orchestrator,
        policy_engine: None,
        usage_oracle: None,
    };

    let input = DeleteInput { service_name, dry_run };
    let conclusion = publisher.delete(state.target.clone(), state.project.clone(), input).await?;

    match &conclusion {
        SchemaDeleteConclusion::Accepted { version } => {
            println!("{}deleted, new version {} (composable={})", if dry_run { "[dry run] would be " } else { "" }, version.id, version.is_composable);
        }
        SchemaDeleteConclusion::Rejected { reason } => {
            println!("rejected: {reason}");
        }
    }

    if !dry_run {
        state.snapshot = adapters.storage.snapshot(state.target.id).await;
        state.save(state_path)?;
    }

    if !conclusion.is_accepted() {
        std::process::exit(1);
    }
    Ok(())
}
