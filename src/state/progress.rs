//! Progress store - the authoritative in-memory collection of categories
//!
//! All mutation goes through this store. It owns the category list behind
//! a mutex, fans out notices over a broadcast channel, and publishes
//! snapshots over a watch channel for anything rendering live state.

use std::sync::{Mutex, MutexGuard};

use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use crate::error::ValidationError;
use crate::notify::Notice;

use super::{Category, Timer};

/// A timer that just reached its terminal state, identified by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub category_index: usize,
    pub timer_index: usize,
    pub name: String,
}

/// Authoritative collection of categories plus the channels around it.
#[derive(Debug)]
pub struct ProgressStore {
    categories: Mutex<Vec<Category>>,
    /// Fire-and-forget notices for the acknowledgment layer
    notice_tx: broadcast::Sender<Notice>,
    /// Snapshot updates for live rendering
    update_tx: watch::Sender<Vec<Category>>,
    /// Keep the receiver alive to prevent channel closure
    _update_rx: watch::Receiver<Vec<Category>>,
}

impl ProgressStore {
    /// Create an empty store.
    pub fn new() -> Self {
        let (notice_tx, _) = broadcast::channel(100);
        let (update_tx, update_rx) = watch::channel(Vec::new());

        Self {
            categories: Mutex::new(Vec::new()),
            notice_tx,
            update_tx,
            _update_rx: update_rx,
        }
    }

    /// Subscribe to user-facing notices.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notice_tx.subscribe()
    }

    /// Watch snapshot updates.
    pub fn watch_updates(&self) -> watch::Receiver<Vec<Category>> {
        self.update_tx.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Category>> {
        self.categories.lock().unwrap_or_else(|poisoned| {
            warn!("Progress state lock poisoned, recovering last state");
            poisoned.into_inner()
        })
    }

    fn notify(&self, notice: Notice) {
        // No subscribers is the normal case for one-shot commands.
        if self.notice_tx.send(notice).is_err() {
            debug!("No notice subscribers connected");
        }
    }

    /// Push a notice from outside the store, e.g. export results.
    pub fn announce(&self, notice: Notice) {
        self.notify(notice);
    }

    fn publish(&self, categories: &[Category]) {
        if self.update_tx.send(categories.to_vec()).is_err() {
            debug!("No snapshot watchers connected");
        }
    }

    /// Add a timer to the named category, creating the category if absent.
    ///
    /// Category lookup is case-insensitive; timer names are unique within
    /// their category, also case-insensitively.
    pub fn add_timer(
        &self,
        category_name: &str,
        timer_name: &str,
        duration: u64,
    ) -> Result<(), ValidationError> {
        let category_name = category_name.trim();
        let timer_name = timer_name.trim();

        if category_name.is_empty() {
            return Err(ValidationError::EmptyCategoryName);
        }
        if timer_name.is_empty() {
            return Err(ValidationError::EmptyTimerName);
        }
        if duration == 0 {
            return Err(ValidationError::NonPositiveDuration);
        }

        let mut categories = self.lock();
        let timer = Timer::new(timer_name, duration);

        match categories
            .iter_mut()
            .find(|category| category.matches_name(category_name))
        {
            Some(category) => {
                let duplicate = category
                    .timers
                    .iter()
                    .any(|existing| existing.name.to_lowercase() == timer_name.to_lowercase());
                if duplicate {
                    return Err(ValidationError::DuplicateTimer {
                        category: category.name.clone(),
                        name: timer_name.to_string(),
                    });
                }
                category.timers.push(timer);
            }
            None => categories.push(Category::with_timer(category_name, timer)),
        }

        info!("Added timer '{}' to category '{}'", timer_name, category_name);
        self.publish(&categories);
        drop(categories);

        self.notify(Notice::TimerAdded {
            category: category_name.to_string(),
            name: timer_name.to_string(),
        });
        Ok(())
    }

    /// Flip a category's running flag and propagate it to its timers.
    ///
    /// Timers that are already completed stay stopped regardless of the
    /// direction of the toggle. No-op for an out-of-bounds index.
    pub fn toggle_category_running(&self, category_index: usize) {
        let mut categories = self.lock();
        let Some(category) = categories.get_mut(category_index) else {
            debug!("toggle_category_running: index {} out of bounds", category_index);
            return;
        };

        let target = !category.running;
        for timer in &mut category.timers {
            timer.running = timer.can_run() && target;
        }
        category.recompute_running();

        debug!("Category {} toggled, running={}", category_index, category.running);
        self.publish(&categories);
    }

    /// Stop every timer in a category and restore their full durations.
    pub fn reset_category(&self, category_index: usize) {
        let mut categories = self.lock();
        let Some(category) = categories.get_mut(category_index) else {
            debug!("reset_category: index {} out of bounds", category_index);
            return;
        };

        for timer in &mut category.timers {
            timer.reset();
        }
        category.recompute_running();

        debug!("Category {} reset", category_index);
        self.publish(&categories);
    }

    /// Flip a single timer's running flag.
    ///
    /// A completed timer cannot be started this way; the category flag is
    /// re-derived afterwards.
    pub fn toggle_timer_running(&self, category_index: usize, timer_index: usize) {
        let mut categories = self.lock();
        let Some(category) = categories.get_mut(category_index) else {
            debug!("toggle_timer_running: category {} out of bounds", category_index);
            return;
        };
        let Some(timer) = category.timers.get_mut(timer_index) else {
            debug!("toggle_timer_running: timer {} out of bounds", timer_index);
            return;
        };

        timer.running = timer.can_run() && !timer.running;
        category.recompute_running();

        self.publish(&categories);
    }

    /// Stop a single timer and restore its full duration.
    pub fn reset_timer(&self, category_index: usize, timer_index: usize) {
        let mut categories = self.lock();
        let Some(category) = categories.get_mut(category_index) else {
            debug!("reset_timer: category {} out of bounds", category_index);
            return;
        };
        let Some(timer) = category.timers.get_mut(timer_index) else {
            debug!("reset_timer: timer {} out of bounds", timer_index);
            return;
        };

        timer.reset();
        category.recompute_running();

        self.publish(&categories);
    }

    /// Force a timer into its terminal state.
    ///
    /// Emits the completion notice only on the first transition to zero;
    /// marking an already-completed timer is a silent no-op. Returns
    /// whether the state changed.
    pub fn mark_complete(&self, category_index: usize, timer_index: usize) -> bool {
        let mut categories = self.lock();
        let Some(category) = categories.get_mut(category_index) else {
            debug!("mark_complete: category {} out of bounds", category_index);
            return false;
        };
        let Some(timer) = category.timers.get_mut(timer_index) else {
            debug!("mark_complete: timer {} out of bounds", timer_index);
            return false;
        };

        let was_active = timer.time_left > 0;
        let name = timer.name.clone();
        timer.complete();
        category.recompute_running();

        self.publish(&categories);
        drop(categories);

        if was_active {
            info!("Timer '{}' marked complete", name);
            self.notify(Notice::TimerCompleted {
                category_index,
                timer_index,
                name,
            });
        }
        was_active
    }

    /// Advance every running timer by one second.
    ///
    /// This is the whole countdown tick: one call per second covers all
    /// timers together. Completions emit their notice here, exactly once,
    /// under the same lock that performed the decrement.
    pub fn tick_all(&self) -> Vec<Completion> {
        let mut completions = Vec::new();
        let mut categories = self.lock();

        for (category_index, category) in categories.iter_mut().enumerate() {
            let mut changed = false;
            for (timer_index, timer) in category.timers.iter_mut().enumerate() {
                if timer.running {
                    changed = true;
                    if timer.advance_second() {
                        completions.push(Completion {
                            category_index,
                            timer_index,
                            name: timer.name.clone(),
                        });
                    }
                }
            }
            if changed {
                category.recompute_running();
            }
        }

        if completions.is_empty() && !categories.iter().any(|category| category.running) {
            return completions;
        }

        self.publish(&categories);
        drop(categories);

        for completion in &completions {
            self.notify(Notice::TimerCompleted {
                category_index: completion.category_index,
                timer_index: completion.timer_index,
                name: completion.name.clone(),
            });
        }
        completions
    }

    /// Copy out the current collection.
    pub fn snapshot(&self) -> Vec<Category> {
        self.lock().clone()
    }

    /// Replace the whole collection, e.g. with a restored snapshot.
    pub fn replace(&self, categories: Vec<Category>) {
        let mut current = self.lock();
        *current = categories;
        self.publish(&current);
    }

    /// Merge a canonical category list into the live state.
    ///
    /// For every position where the canonical entry still names the same
    /// category and timer, the live running/time-left state wins; entries
    /// that are new or renamed adopt the canonical state. Used when the
    /// persisted collection changed underneath a live session.
    pub fn reconcile(&self, canonical: &[Category]) {
        let mut categories = self.lock();

        let mut merged = Vec::with_capacity(canonical.len());
        for (category_index, canon_category) in canonical.iter().enumerate() {
            let live_category = categories
                .get(category_index)
                .filter(|live| live.name == canon_category.name);

            match live_category {
                Some(live) => {
                    let timers = canon_category
                        .timers
                        .iter()
                        .enumerate()
                        .map(|(timer_index, canon_timer)| {
                            live.timers
                                .get(timer_index)
                                .filter(|live_timer| live_timer.name == canon_timer.name)
                                .cloned()
                                .unwrap_or_else(|| canon_timer.clone())
                        })
                        .collect();
                    let mut category = live.clone();
                    category.timers = timers;
                    category.recompute_running();
                    merged.push(category);
                }
                None => merged.push(canon_category.clone()),
            }
        }

        *categories = merged;
        self.publish(&categories);
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_invariant(store: &ProgressStore) {
        for category in store.snapshot() {
            for timer in &category.timers {
                assert!(
                    !(timer.running && timer.time_left == 0),
                    "running timer with no time left: {}",
                    timer.name
                );
                assert!(timer.time_left <= timer.duration);
            }
            assert_eq!(category.running, category.any_running());
        }
    }

    fn drain_completions(rx: &mut broadcast::Receiver<Notice>) -> Vec<(usize, usize)> {
        let mut seen = Vec::new();
        while let Ok(notice) = rx.try_recv() {
            if let Notice::TimerCompleted {
                category_index,
                timer_index,
                ..
            } = notice
            {
                seen.push((category_index, timer_index));
            }
        }
        seen
    }

    #[test]
    fn add_creates_and_appends_case_insensitively() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 300).unwrap();
        store.add_timer("work", "Review", 600).unwrap();
        store.add_timer("Home", "Laundry", 900).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].name, "Work");
        assert_eq!(snapshot[0].timers.len(), 2);
        assert_eq!(snapshot[1].name, "Home");
        assert_invariant(&store);
    }

    #[test]
    fn add_rejects_invalid_input() {
        let store = ProgressStore::new();
        assert_eq!(
            store.add_timer("Work", "  ", 10),
            Err(ValidationError::EmptyTimerName)
        );
        assert_eq!(
            store.add_timer("", "Focus", 10),
            Err(ValidationError::EmptyCategoryName)
        );
        assert_eq!(
            store.add_timer("Work", "Focus", 0),
            Err(ValidationError::NonPositiveDuration)
        );

        store.add_timer("Work", "Focus", 10).unwrap();
        assert!(matches!(
            store.add_timer("work", "FOCUS", 20),
            Err(ValidationError::DuplicateTimer { .. })
        ));
        assert_eq!(store.snapshot()[0].timers.len(), 1);
    }

    #[test]
    fn countdown_completes_after_duration_ticks() {
        // Scenario: a 5 second timer toggled on completes on the fifth
        // tick with exactly one completion notice at (0, 0).
        let store = ProgressStore::new();
        let mut notices = store.subscribe_notices();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.toggle_timer_running(0, 0);
        assert!(store.snapshot()[0].running);

        for _ in 0..4 {
            assert!(store.tick_all().is_empty());
            assert_invariant(&store);
        }
        let completions = store.tick_all();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].category_index, 0);
        assert_eq!(completions[0].timer_index, 0);

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].timers[0].time_left, 0);
        assert!(!snapshot[0].timers[0].running);
        assert!(!snapshot[0].running);

        // Exactly one completion crossed the channel, and extra ticks
        // produce nothing further.
        notices.try_recv().ok(); // TimerAdded
        assert_eq!(drain_completions(&mut notices), vec![(0, 0)]);
        assert!(store.tick_all().is_empty());
        assert_eq!(drain_completions(&mut notices), vec![]);
        assert_invariant(&store);
    }

    #[test]
    fn tick_never_increases_time_left() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 10).unwrap();
        store.toggle_timer_running(0, 0);

        let mut previous = store.snapshot()[0].timers[0].time_left;
        for _ in 0..12 {
            store.tick_all();
            let current = store.snapshot()[0].timers[0].time_left;
            assert!(current <= previous);
            previous = current;
        }
    }

    #[test]
    fn category_toggle_propagates_and_skips_completed() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.add_timer("Work", "Review", 10).unwrap();
        store.mark_complete(0, 0);

        store.toggle_category_running(0);
        let snapshot = store.snapshot();
        assert!(snapshot[0].running);
        assert!(!snapshot[0].timers[0].running, "completed timer must stay stopped");
        assert!(snapshot[0].timers[1].running);

        store.toggle_category_running(0);
        let snapshot = store.snapshot();
        assert!(!snapshot[0].running);
        assert!(!snapshot[0].timers[1].running);
        assert_invariant(&store);
    }

    #[test]
    fn category_toggle_with_only_completed_timers_stays_stopped() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.mark_complete(0, 0);

        store.toggle_category_running(0);
        let snapshot = store.snapshot();
        assert!(!snapshot[0].running);
        assert!(!snapshot[0].timers[0].running);
        assert_invariant(&store);
    }

    #[test]
    fn completed_timer_cannot_be_toggled_on() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.mark_complete(0, 0);

        store.toggle_timer_running(0, 0);
        assert!(!store.snapshot()[0].timers[0].running);
        assert_invariant(&store);
    }

    #[test]
    fn reset_restores_a_completed_timer() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.mark_complete(0, 0);

        store.reset_timer(0, 0);
        let timer = &store.snapshot()[0].timers[0];
        assert_eq!(timer.time_left, 5);
        assert!(!timer.running);
        assert_invariant(&store);
    }

    #[test]
    fn reset_category_restores_every_timer() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.add_timer("Work", "Review", 10).unwrap();
        store.toggle_category_running(0);
        store.tick_all();
        store.reset_category(0);

        let snapshot = store.snapshot();
        assert!(!snapshot[0].running);
        assert_eq!(snapshot[0].timers[0].time_left, 5);
        assert_eq!(snapshot[0].timers[1].time_left, 10);
        assert_invariant(&store);
    }

    #[test]
    fn mark_complete_notifies_only_on_first_transition() {
        let store = ProgressStore::new();
        let mut notices = store.subscribe_notices();
        store.add_timer("Work", "Focus", 5).unwrap();
        notices.try_recv().ok(); // TimerAdded

        assert!(store.mark_complete(0, 0));
        assert!(!store.mark_complete(0, 0));
        assert_eq!(drain_completions(&mut notices), vec![(0, 0)]);
        assert_invariant(&store);
    }

    #[test]
    fn mark_complete_recomputes_category_flag() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        store.add_timer("Work", "Review", 10).unwrap();
        store.toggle_category_running(0);

        store.mark_complete(0, 0);
        assert!(store.snapshot()[0].running, "other timer still running");
        store.mark_complete(0, 1);
        assert!(!store.snapshot()[0].running);
        assert_invariant(&store);
    }

    #[test]
    fn out_of_bounds_indices_are_no_ops() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 5).unwrap();
        let before = store.snapshot();

        store.toggle_category_running(7);
        store.reset_category(7);
        store.toggle_timer_running(0, 7);
        store.toggle_timer_running(7, 0);
        store.reset_timer(0, 7);
        assert!(!store.mark_complete(7, 7));

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn reconcile_preserves_live_state_for_matching_entries() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 10).unwrap();
        store.toggle_timer_running(0, 0);
        store.tick_all();
        store.tick_all();
        assert_eq!(store.snapshot()[0].timers[0].time_left, 8);

        // Canonical list gained a timer and a category underneath us.
        let mut canonical = store.snapshot();
        canonical[0].timers[0] = Timer::new("Focus", 10);
        canonical[0].timers.push(Timer::new("Review", 20));
        canonical[0].recompute_running();
        canonical.push(Category::with_timer("Home", Timer::new("Laundry", 30)));

        store.reconcile(&canonical);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].timers[0].time_left, 8, "live countdown preserved");
        assert!(snapshot[0].timers[0].running);
        assert!(snapshot[0].running);
        assert_eq!(snapshot[0].timers[1].name, "Review");
        assert_eq!(snapshot[1].name, "Home");
        assert_invariant(&store);
    }

    #[test]
    fn reconcile_adopts_canonical_entry_when_identity_changes() {
        let store = ProgressStore::new();
        store.add_timer("Work", "Focus", 10).unwrap();
        store.toggle_timer_running(0, 0);
        store.tick_all();

        let canonical = vec![Category::with_timer("Work", Timer::new("Deep Work", 40))];
        store.reconcile(&canonical);

        let snapshot = store.snapshot();
        assert_eq!(snapshot[0].timers[0].name, "Deep Work");
        assert_eq!(snapshot[0].timers[0].time_left, 40);
        assert!(!snapshot[0].running);
        assert_invariant(&store);
    }
}
