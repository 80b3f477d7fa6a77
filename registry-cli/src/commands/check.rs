// registry-cli/src/commands/check.rs

use std::path::{Path, PathBuf};

use registry_core::application::Publisher;
use registry_core::models::CheckInput;
use registry_core::models::conclusion::SchemaCheckConclusion;

use crate::commands::{changes_table, Adapters};
use crate::state::State;

pub async fn execute(
    state_path: &Path,
    sdl_file: PathBuf,
    service_name: Option<String>,
    service_url: Option<String>,
    context_id: Option<String>,
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

    let input = CheckInput { sdl, service_name, service_url, context_id, ..Default::default() };
    let conclusion = publisher.check(state.target.clone(), state.project.clone(), input).await?;

    match &conclusion {
        SchemaCheckConclusion::Success { safe_changes, policy_warnings, .. } => {
            println!("check passed ({} safe change(s), {} policy warning(s))", safe_changes.len(), policy_warnings.len());
            if !safe_changes.is_empty() {
                println!("{}", changes_table(safe_changes));
            }
        }
        SchemaCheckConclusion::Failure { breaking_changes, policy_errors, composition_errors, .. } => {
            println!("check failed: {} breaking change(s), {} policy error(s), {} composition error(s)", breaking_changes.len(), policy_errors.len(), composition_errors.len());
            if !breaking_changes.is_empty() {
                println!("{}", changes_table(breaking_changes));
            }
        }
    }

    state.snapshot = adapters.storage.snapshot(state.target.id).await;
    state.save(state_path)?;

    if !conclusion.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
