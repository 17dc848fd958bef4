//! Utility functions module
//!
//! Small helpers that do not belong to any one subsystem.

pub mod signals;

// Re-export main functions
pub use signals::shutdown_signal;
