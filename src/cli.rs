//! CLI command handling.
//!
//! Every one-shot command runs the same lifecycle the mobile-style app
//! runs across suspensions: restore the persisted snapshot with the
//! wall-clock correction applied, perform the operation, persist the
//! result. `run` hosts a live session instead, with the countdown engine
//! and autosave tasks alive until a shutdown signal.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Utc};
use clap::Subcommand;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::export;
use crate::notify::Notice;
use crate::persist::{restore_progress, save_progress, ProgressStorage};
use crate::state::{Category, ProgressStore};
use crate::tasks::{autosave_task, countdown_engine_task};
use crate::utils::shutdown_signal;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a timer to a category, creating the category if needed
    Add {
        category: String,
        name: String,
        /// Total duration in seconds
        duration: u64,
    },
    /// Print the current progress with category and timer indices
    Status,
    /// Start or pause a whole category, or a single timer of it
    Toggle {
        category_index: usize,
        timer_index: Option<usize>,
    },
    /// Restore full durations for a whole category, or a single timer
    Reset {
        category_index: usize,
        timer_index: Option<usize>,
    },
    /// Force a timer into its completed state
    Complete {
        category_index: usize,
        timer_index: usize,
    },
    /// Write completed timers to timers.json
    Export,
    /// Run the live countdown session until a shutdown signal
    Run,
}

/// Execute a CLI command against the store and its storage.
pub async fn execute(
    command: Command,
    store: Arc<ProgressStore>,
    storage: ProgressStorage,
    export_dir: &Path,
    autosave_every: Duration,
) -> Result<()> {
    if let Command::Run = command {
        return run_live(store, storage, autosave_every).await;
    }

    // Wall time kept flowing while no process was alive; correct for it
    // before the operation sees the state.
    if let Err(e) = restore_progress(&store, &storage, Utc::now()).await {
        warn!("Failed to restore progress: {}", e);
    }

    match command {
        Command::Add {
            category,
            name,
            duration,
        } => match store.add_timer(&category, &name, duration) {
            Ok(()) => {
                println!(
                    "{}",
                    Notice::TimerAdded {
                        category: category.clone(),
                        name: name.clone(),
                    }
                    .message()
                );
                print_status(&store.snapshot());
            }
            Err(e) => println!("Cannot add timer: {}", e),
        },
        Command::Status => print_status(&store.snapshot()),
        Command::Toggle {
            category_index,
            timer_index,
        } => {
            match timer_index {
                Some(timer_index) => store.toggle_timer_running(category_index, timer_index),
                None => store.toggle_category_running(category_index),
            }
            print_status(&store.snapshot());
        }
        Command::Reset {
            category_index,
            timer_index,
        } => {
            match timer_index {
                Some(timer_index) => store.reset_timer(category_index, timer_index),
                None => store.reset_category(category_index),
            }
            print_status(&store.snapshot());
        }
        Command::Complete {
            category_index,
            timer_index,
        } => {
            store.mark_complete(category_index, timer_index);
            print_status(&store.snapshot());
        }
        Command::Export => {
            let document = export::build_document(&store.snapshot(), Local::now().date_naive());
            let notice = match export::write_export(&document, export_dir).await {
                Ok(path) => Notice::ExportSucceeded { path },
                Err(e) => Notice::ExportFailed {
                    message: e.to_string(),
                },
            };
            store.announce(notice.clone());
            println!("{}", notice.message());
        }
        Command::Run => {} // handled above
    }

    if let Err(e) = save_progress(&store, &storage, Utc::now()).await {
        warn!("Failed to save progress: {}", e);
    }
    Ok(())
}

/// Host the live countdown session until a shutdown signal arrives, then
/// persist the final snapshot.
async fn run_live(
    store: Arc<ProgressStore>,
    storage: ProgressStorage,
    autosave_every: Duration,
) -> Result<()> {
    if let Err(e) = restore_progress(&store, &storage, Utc::now()).await {
        warn!("Failed to restore progress: {}", e);
    }
    print_status(&store.snapshot());

    let engine_store = Arc::clone(&store);
    tokio::spawn(async move {
        countdown_engine_task(engine_store).await;
    });

    let autosave_store = Arc::clone(&store);
    let autosave_storage = storage.clone();
    tokio::spawn(async move {
        autosave_task(autosave_store, autosave_storage, autosave_every).await;
    });

    // Toast analog: render notices as log lines.
    let mut notices = store.subscribe_notices();
    tokio::spawn(async move {
        loop {
            match notices.recv().await {
                Ok(notice) => info!("{}", notice.message()),
                Err(RecvError::Lagged(missed)) => {
                    warn!("Notice stream lagged, {} dropped", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!("Live session running; SIGINT or SIGTERM suspends and saves");
    shutdown_signal().await;

    if let Err(e) = save_progress(&store, &storage, Utc::now()).await {
        warn!("Failed to save progress on shutdown: {}", e);
    }
    info!("Session suspended");
    Ok(())
}

fn print_status(categories: &[Category]) {
    if categories.is_empty() {
        println!("No timers yet. Add one with: timerdeck add <category> <name> <seconds>");
        return;
    }

    for (category_index, category) in categories.iter().enumerate() {
        let state = if category.running { "running" } else { "paused" };
        println!("[{}] {} ({})", category_index, category.name, state);
        for (timer_index, timer) in category.timers.iter().enumerate() {
            let state = if timer.is_completed() {
                "done"
            } else if timer.running {
                "running"
            } else {
                "paused"
            };
            println!(
                "  [{}] {}  {}s / {}s  {}",
                timer_index, timer.name, timer.time_left, timer.duration, state
            );
        }
    }
}
