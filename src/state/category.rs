//! Category entity - a named group of timers with an aggregate running flag

use serde::{Deserialize, Serialize};

use super::Timer;

/// A named group of timers.
///
/// `running` is derived state: it must equal the OR of the contained
/// timers' running flags. Every mutation path that touches a timer calls
/// [`Category::recompute_running`] afterwards to keep the derivation true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub running: bool,
    pub timers: Vec<Timer>,
}

impl Category {
    /// Create a category containing a single timer, not running.
    pub fn with_timer(name: impl Into<String>, timer: Timer) -> Self {
        Self {
            name: name.into(),
            running: false,
            timers: vec![timer],
        }
    }

    /// Case-insensitive name comparison, the identity rule for categories.
    pub fn matches_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.to_lowercase()
    }

    /// Check if any contained timer is currently counting down.
    pub fn any_running(&self) -> bool {
        self.timers.iter().any(|timer| timer.running)
    }

    /// Re-derive the aggregate running flag from the timers.
    pub fn recompute_running(&mut self) {
        self.running = self.any_running();
    }

    /// Timers that have reached their terminal state.
    pub fn completed_timers(&self) -> impl Iterator<Item = &Timer> {
        self.timers.iter().filter(|timer| timer.is_completed())
    }
}
