// registry-cli/src/state.rs
//
// The demo binary has no durable store of its own — `registry-core`
// ships `infrastructure::memory` precisely because the production
// adapter is `infrastructure::sql`, which this binary never wires up.
// `state.json` is how one invocation hands the next invocation what
// `InMemoryStorage` would otherwise forget the moment the process
// exits: the target/project shape plus a `TargetSnapshot` dump of
// everything `InMemoryStorage` held for it.

use std::path::Path;

use registry_core::domain::project::Project;
use registry_core::domain::target::Target;
use registry_core::infrastructure::memory::TargetSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub target: Target,
    pub project: Project,
    #[serde(default)]
    pub snapshot: TargetSnapshot,
}

impl State {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = std::fs::read(path)
            .map_err(|err| anyhow::anyhow!("no registry state at {} ({err}) — run `registry init` first", path.display()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
