// registry-cli/src/main.rs

mod cli;
mod commands;
mod orchestrator;
mod state;

use clap::Parser;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init { name, project_type, legacy, native_federation, supports_contracts } => {
            commands::init::execute(&cli.state, name, project_type, legacy, native_federation, supports_contracts).await
        }
        Commands::Check { sdl_file, service_name, service_url, context_id } => {
            commands::check::execute(&cli.state, sdl_file, service_name, service_url, context_id).await
        }
        Commands::Publish { sdl_file, service_name, service_url, author, commit, force, experimental_accept_breaking_changes } => {
            commands::publish::execute(&cli.state, sdl_file, service_name, service_url, author, commit, force, experimental_accept_breaking_changes).await
        }
        Commands::Delete { service_name, dry_run } => commands::delete::execute(&cli.state, service_name, dry_run).await,
        Commands::Approve { check_id, approved_by } => commands::approve::execute(&cli.state, check_id, approved_by).await,
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
