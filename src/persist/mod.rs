//! Persistence module
//!
//! This module contains the durable key-value storage and the
//! suspend/resume recovery logic built on top of it.

pub mod recovery;
pub mod storage;

// Re-export main types and functions
pub use recovery::{apply_elapsed, elapsed_seconds, restore_progress, save_progress};
pub use storage::{ProgressStorage, StoredProgress};
