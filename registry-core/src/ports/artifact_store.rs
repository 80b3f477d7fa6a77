// registry-core/src/ports/artifact_store.rs
//
// CDN-backed artifact output (spec.md §6 "Artifact output keys").
// Every successful publish/delete republishes the affected target's
// artifacts under a stable key scheme so edge workers can fetch them
// without touching the registry's write path.

use async_trait::async_trait;

use crate::ports::PortError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Sdl,
    SupergraphSdl,
    Metadata,
}

impl ArtifactKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ArtifactKind::Sdl => "sdl",
            ArtifactKind::SupergraphSdl => "supergraph",
            ArtifactKind::Metadata => "metadata",
        }
    }
}

/// Builds `artifact/{target_id}[/contracts/{contract_name}]/{kind}`
/// (spec.md §6).
pub fn artifact_key(target_id: &str, contract_name: Option<&str>, kind: ArtifactKind) -> String {
    match contract_name {
        Some(name) => format!("artifact/{target_id}/contracts/{name}/{}", kind.as_str()),
        None => format!("artifact/{target_id}/{}", kind.as_str()),
    }
}

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn put(&self, key: &str, contents: String) -> Result<(), PortError>;

    async fn get(&self, key: &str) -> Result<Option<String>, PortError>;

    async fn delete(&self, key: &str) -> Result<(), PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_without_contract() {
        assert_eq!(artifact_key("t1", None, ArtifactKind::Sdl), "artifact/t1/sdl");
    }

    #[test]
    fn key_with_contract() {
        assert_eq!(
            artifact_key("t1", Some("public"), ArtifactKind::SupergraphSdl),
            "artifact/t1/contracts/public/supergraph"
        );
    }
}
