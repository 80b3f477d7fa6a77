// registry-cli/src/commands/mod.rs
//
// One module per subcommand, each exposing `execute(...)`. Every
// command wires the same set of in-memory adapters (nothing here
// persists past the process except through `state.json`) into a
// fresh `registry_core::application::Publisher`.

pub mod approve;
pub mod check;
pub mod delete;
pub mod init;
pub mod publish;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use registry_core::domain::schema_change::{SchemaChange, Severity};
use registry_core::infrastructure::memory::{InMemoryArtifactStore, InMemoryCache, InMemoryLock, InMemoryNotifier, InMemoryStorage};

use crate::orchestrator::NaiveOrchestrator;

/// The adapters every subcommand but `init` needs. Grouped behind one
/// struct so `Publisher`'s borrows all come from a single place that
/// outlives the call. No `UsageOracle` here: the demo has no real
/// traffic to sample, and `InMemoryUsageOracle`'s default (everything
/// unseen) would mark every breaking change usage-safe, which defeats
/// the point of a demo meant to show a breaking change get rejected —
/// `Publisher` is wired with `usage_oracle: None` so that consultation
/// is skipped entirely rather than always voting "safe".
pub struct Adapters {
    pub storage: InMemoryStorage,
    pub lock: InMemoryLock,
    pub cache: InMemoryCache,
    pub artifact_store: InMemoryArtifactStore,
    pub notifier: InMemoryNotifier,
    pub orchestrator: NaiveOrchestrator,
}

impl Adapters {
    pub fn new() -> Self {
        Self {
            storage: InMemoryStorage::new(),
            lock: InMemoryLock::new(),
            cache: InMemoryCache::new(),
            artifact_store: InMemoryArtifactStore::new(),
            notifier: InMemoryNotifier::new(),
            orchestrator: NaiveOrchestrator,
        }
    }
}

pub fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Breaking => Cell::new("BREAKING").fg(Color::Red),
        Severity::Dangerous => Cell::new("DANGEROUS").fg(Color::Yellow),
        Severity::Safe => Cell::new("SAFE").fg(Color::Green),
    }
}

pub fn changes_table(changes: &[SchemaChange]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).apply_modifier(UTF8_ROUND_CORNERS).set_header(vec!["severity", "type", "path"]);
    for change in changes {
        table.add_row(vec![severity_cell(change.severity), Cell::new(&change.change_type), Cell::new(change.path.as_deref().unwrap_or("-"))]);
    }
    table
}
