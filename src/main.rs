//! Timerdeck - category-grouped countdown timers with progress recovery
//!
//! This is the main entry point for the timerdeck application.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use timerdeck::{cli, config::Config, persist::ProgressStorage, state::ProgressStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timerdeck={}", config.log_level()))
        .init();

    let data_dir = config.resolve_data_dir();
    let export_dir = config.resolve_export_dir();
    debug!(
        "Configuration: data_dir={}, export_dir={}, autosave={}s",
        data_dir.display(),
        export_dir.display(),
        config.autosave
    );

    let storage = ProgressStorage::new(data_dir);
    let store = Arc::new(ProgressStore::new());

    // No subcommand starts a live session, mirroring an app launch.
    let command = config.command.unwrap_or(cli::Command::Run);
    if matches!(command, cli::Command::Run) {
        info!("Starting timerdeck v1.1.0");
    }

    cli::execute(
        command,
        store,
        storage,
        &export_dir,
        Duration::from_secs(config.autosave.max(1)),
    )
    .await
}
