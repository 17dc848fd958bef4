//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

use crate::cli::Command;
use crate::export;
use crate::persist::ProgressStorage;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "timerdeck")]
#[command(about = "A state-managed countdown timer tracker with categories and progress recovery")]
#[command(version = "1.1.0")]
pub struct Config {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Directory holding the persisted progress and timestamp keys
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Directory the timers.json export is written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,

    /// Seconds between autosaves in a live session
    #[arg(short, long, default_value = "30")]
    pub autosave: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the directory backing the progress storage
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(ProgressStorage::default_dir)
    }

    /// Get the directory the export file lands in
    pub fn resolve_export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(export::default_export_dir)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}
