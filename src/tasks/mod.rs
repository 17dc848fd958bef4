//! Background tasks module
//!
//! This module contains the background tasks that run alongside the live
//! countdown session.

pub mod autosave;
pub mod countdown;

// Re-export main functions
pub use autosave::autosave_task;
pub use countdown::countdown_engine_task;
