//! Fire-and-forget notices for the user-facing acknowledgment layer
//!
//! The store and the export path send these over a broadcast channel; the
//! run mode subscribes and renders them as log lines (the toast analog).
//! Senders never wait on subscribers.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Every user-visible event in the system produces a Notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Notice {
    TimerAdded {
        category: String,
        name: String,
    },
    TimerCompleted {
        category_index: usize,
        timer_index: usize,
        name: String,
    },
    ExportSucceeded {
        path: PathBuf,
    },
    ExportFailed {
        message: String,
    },
}

impl Notice {
    /// Render the toast message shown to the user.
    pub fn message(&self) -> String {
        match self {
            Notice::TimerAdded { category, name } => {
                format!("Timer '{}' added to '{}'", name, category)
            }
            Notice::TimerCompleted { name, .. } => {
                format!("Congratulations, {} has completed 🎉", name)
            }
            Notice::ExportSucceeded { path } => {
                format!("JSON file exported successfully to {} 🎉", path.display())
            }
            Notice::ExportFailed { message } => {
                format!("Failed to export JSON file: {}", message)
            }
        }
    }
}
