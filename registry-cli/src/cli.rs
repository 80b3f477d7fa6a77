// registry-cli/src/cli.rs

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "registry")]
#[command(about = "Demonstration CLI for the schema registry check/publish/delete pipeline", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Where process state is read from and written back to — the
    /// demo has no database, so this file stands in for one.
    #[arg(long, global = true, default_value = "registry-state.json")]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProjectTypeArg {
    Single,
    Composite,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a fresh target/project and write the initial state file
    Init {
        /// Target name (e.g. "production")
        #[arg(long, default_value = "default")]
        name: String,

        #[arg(long, value_enum, default_value = "single")]
        project_type: ProjectTypeArg,

        /// Use the legacy check/publish model for this project type
        #[arg(long)]
        legacy: bool,

        /// Use the in-process native composer instead of an external one
        #[arg(long)]
        native_federation: bool,

        /// Whether contract views are enabled for this project
        #[arg(long)]
        supports_contracts: bool,
    },

    /// Run a schema check against the latest published version
    Check {
        /// Path to the incoming SDL file
        #[arg(long)]
        sdl_file: PathBuf,

        /// Subgraph name, required for composite projects
        #[arg(long)]
        service_name: Option<String>,

        #[arg(long)]
        service_url: Option<String>,

        /// Groups this check with prior checks sharing the same PR/branch
        #[arg(long)]
        context_id: Option<String>,
    },

    /// Publish a new schema version
    Publish {
        #[arg(long)]
        sdl_file: PathBuf,

        #[arg(long)]
        service_name: Option<String>,

        #[arg(long)]
        service_url: Option<String>,

        #[arg(long)]
        author: Option<String>,

        #[arg(long)]
        commit: Option<String>,

        /// Legacy-model escape hatch: publish despite breaking changes
        #[arg(long)]
        force: bool,

        #[arg(long)]
        experimental_accept_breaking_changes: bool,
    },

    /// Remove a subgraph from a composite project
    Delete {
        #[arg(long)]
        service_name: String,

        /// Preview the resulting composition without persisting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Manually approve a failed check's breaking changes
    Approve {
        /// The schema_check id returned by a prior `check`
        #[arg(long)]
        check_id: String,

        #[arg(long)]
        approved_by: String,
    },
}
