//! TraceKeeper - project lifecycle manager
//!
//! CLI entry point wiring the project store to the lifecycle manager.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use projectstore::ProjectStore;
use tracekeeper::cli::{Cli, Command};
use tracekeeper::config::Config;
use tracekeeper::domain::ProjectId;
use tracekeeper::manager::{ManagerConfig, ProjectManager};
use tracekeeper::provider::StoreProvider;

fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tracekeeper")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Setup tracing subscriber - write to log file, not stdout/stderr
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("tracekeeper.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

async fn build_manager(config: &Config) -> Result<Arc<ProjectManager>> {
    let store = Arc::new(ProjectStore::open(config.storage.resolve_root())?);
    let provider = Arc::new(StoreProvider::new(store));
    let manager_config: ManagerConfig = (&config.lifecycle).into();
    let manager = ProjectManager::new(provider, manager_config)
        .await?;
    Ok(manager)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    let manager = build_manager(&config).await?;
    let loaded = manager
        .load_persisted_projects()
        .await?;
    info!(loaded, "Persisted projects loaded");

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            println!("tracekeeper: serving {loaded} project(s), ctrl-c to stop");
            tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
            manager.flush_all().await?;
            info!("Shutdown flush complete");
        }
        Command::List => {
            let mut projects = manager.projects().await;
            projects.sort_by_key(|t| t.id());
            for target in projects {
                println!("{}\t{}\t{:?}", target.id(), target.name(), target.deletion_state());
            }
        }
        Command::Create { name } => {
            let id = manager.create_project().await?;
            if let Some(name) = name {
                if let Some(target) = manager.get_project(id).await {
                    target.set_name(&name);
                }
            }
            manager.flush_all().await?;
            println!("{id}");
        }
        Command::Remove { id } => {
            match manager.remove_project(ProjectId::new(id)).await? {
                Some(target) => println!("removed {} ({})", target.id(), target.name()),
                None => println!("no project with id {id}"),
            }
        }
    }

    Ok(())
}
