//! Timerdeck - category-grouped countdown timers with progress recovery
//!
//! This library provides the timer/category progress model: a progress
//! store with start/pause/reset operations, a 1 Hz countdown engine,
//! persistence that recovers wall-clock time lost to suspensions, and a
//! JSON export of completed timers.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod notify;
pub mod persist;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, PersistenceError, ValidationError};
pub use notify::Notice;
pub use state::{Category, ProgressStore, Timer};
pub use utils::signals::shutdown_signal;
