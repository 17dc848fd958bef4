//! Timer entity and its countdown transitions

use serde::{Deserialize, Serialize};

/// A named countdown with a fixed duration and mutable remaining time.
///
/// `duration` never changes after creation. `time_left` counts down from
/// `duration` to 0 while `running` is true; once it reaches 0 the timer is
/// completed and stays completed until an explicit reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    pub name: String,
    pub duration: u64,
    #[serde(rename = "timeLeft")]
    pub time_left: u64,
    pub running: bool,
}

impl Timer {
    /// Create a fresh timer with the full duration remaining, not running.
    pub fn new(name: impl Into<String>, duration: u64) -> Self {
        Self {
            name: name.into(),
            duration,
            time_left: duration,
            running: false,
        }
    }

    /// Check if the timer has reached its terminal state.
    pub fn is_completed(&self) -> bool {
        self.time_left == 0
    }

    /// Check if the play/pause toggle can start this timer.
    ///
    /// Completed timers cannot be restarted by toggling; only a reset
    /// reactivates them.
    pub fn can_run(&self) -> bool {
        self.time_left > 0
    }

    /// Take one second off the remaining time, saturating at zero.
    ///
    /// Returns true when this call completed the timer, in which case the
    /// running flag has been cleared.
    pub fn advance_second(&mut self) -> bool {
        if !self.running || self.time_left == 0 {
            return false;
        }
        self.time_left -= 1;
        if self.time_left == 0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Force the terminal state: no time left, not running.
    pub fn complete(&mut self) {
        self.running = false;
        self.time_left = 0;
    }

    /// Restore the full duration and stop the countdown.
    pub fn reset(&mut self) {
        self.running = false;
        self.time_left = self.duration;
    }
}
