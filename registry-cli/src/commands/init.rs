// registry-cli/src/commands/init.rs

use std::path::Path;

use registry_core::domain::ids::{OrganizationId, ProjectId};
use registry_core::domain::project::{OrchestratorKind, Project, ProjectType};
use registry_core::domain::target::Target;
use registry_core::infrastructure::memory::TargetSnapshot;

use crate::cli::ProjectTypeArg;
use crate::state::State;

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    state_path: &Path,
    name: String,
    project_type: ProjectTypeArg,
    legacy: bool,
    native_federation: bool,
    supports_contracts: bool,
) -> anyhow::Result<()> {
    let project_type = match project_type {
        ProjectTypeArg::Single => ProjectType::Single,
        ProjectTypeArg::Composite => ProjectType::Composite,
    };
    let orchestrator_kind = match project_type {
        ProjectType::Single => OrchestratorKind::Single,
        ProjectType::Composite => OrchestratorKind::Federation,
    };

    let organization_id = OrganizationId::new();
    let project_id = ProjectId::new();
    let project = Project {
        id: project_id,
        organization_id,
        name: name.clone(),
        project_type,
        orchestrator_kind,
        legacy_registry_model: legacy,
        external_composition: None,
        native_federation,
        compare_to_previous_composable_version: false,
        check_retention_days: 7,
        supports_contracts,
    };
    let target = Target::new(organization_id, project_id, name);

    let state = State { target, project, snapshot: TargetSnapshot::default() };
    state.save(state_path)?;

    println!("initialized {:?} target {} at {}", project_type, state.target.id, state_path.display());
    Ok(())
}
