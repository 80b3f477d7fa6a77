// registry-cli/src/commands/publish.rs

use std::path::{Path, PathBuf};

use registry_core::application::Publisher;
use registry_core::models::PublishInput;
use registry_core::models::conclusion::SchemaPublishConclusion;

use crate::commands::Adapters;
use crate::state::State;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    state_path: &Path,
    sdl_file: PathBuf,
    service_name: Option<String>,
    service_url: Option<String>,
    author: Option<String>,
    commit: Option<String>,
    force: bool,
    experimental_accept_breaking_changes: bool,
) -> anyhow::Result<()> {
    let mut state = State::load(state_path)?;
    let sdl = std::fs::read_to_string(&sdl_file)?;

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

    let input = PublishInput { sdl, service_name, service_url, author, commit, force, experimental_accept_breaking_changes, ..Default::default() };
    let conclusion = publisher.publish(state.target.clone(), state.project.clone(), input).await?;

    match &conclusion {
        SchemaPublishConclusion::Accepted { version, changes, .. } => {
            println!("published version {} ({} change(s), composable={})", version.id, changes.len(), version.is_composable);
        }
        SchemaPublishConclusion::Ignored { reason } => {
            println!("ignored: {reason}");
        }
        SchemaPublishConclusion::Rejected { breaking_changes, composition_errors } => {
            println!("rejected: {} breaking change(s), {} composition error(s)", breaking_changes.len(), composition_errors.len());
        }
    }

    state.snapshot = adapters.storage.snapshot(state.target.id).await;
    state.save(state_path)?;

    if !conclusion.is_accepted() {
        std::process::exit(1);
    }
    Ok(())
}
