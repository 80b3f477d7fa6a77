// registry-core/src/infrastructure/memory/usage.rs
//
// Deterministic stand-in for a usage-analytics backend: coordinates
// explicitly marked "seen" are reported as used, everything else is
// reported unused. Good enough for tests and the CLI demo, which have
// no real traffic to sample.

use async_trait::async_trait;
use dashmap::DashSet;

use crate::ports::usage::{SchemaCoordinate, UsageOracle, UsageSelector};
use crate::ports::PortError;

#[derive(Default)]
pub struct InMemoryUsageOracle {
    seen: DashSet<SchemaCoordinate>,
}

impl InMemoryUsageOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_used(&self, coordinate: SchemaCoordinate) {
        self.seen.insert(coordinate);
    }
}

#[async_trait]
impl UsageOracle for InMemoryUsageOracle {
    async fn is_coordinate_unused(&self, _selector: &UsageSelector, coordinate: &SchemaCoordinate) -> Result<bool, PortError> {
        Ok(!self.seen.contains(coordinate))
    }
}
