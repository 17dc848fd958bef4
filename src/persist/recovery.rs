//! Suspend/resume recovery
//!
//! On resume the stored snapshot is corrected for the wall-clock time that
//! passed while the process was away: running timers lose the elapsed
//! seconds, and any that ran out are completed in place. The correction is
//! idempotent for a near-zero gap and never yields negative time.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::PersistenceError;
use crate::state::{Category, ProgressStore};

use super::storage::ProgressStorage;

/// Whole seconds between the stored save time and now, clamped at zero so
/// a skewed clock cannot run timers backwards.
pub fn elapsed_seconds(saved_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let elapsed = (now - saved_at).num_seconds();
    if elapsed > 0 {
        elapsed as u64
    } else {
        0
    }
}

/// Apply the elapsed-time correction to a restored snapshot in place.
///
/// Timers that were not running are untouched. Completions that happened
/// while suspended are silent; the live countdown is the only path that
/// announces them.
pub fn apply_elapsed(categories: &mut [Category], elapsed: u64) {
    if elapsed == 0 {
        return;
    }
    for category in categories.iter_mut() {
        for timer in &mut category.timers {
            if timer.running {
                let time_left = timer.time_left.saturating_sub(elapsed);
                if time_left > 0 {
                    timer.time_left = time_left;
                } else {
                    timer.complete();
                }
            }
        }
        category.recompute_running();
    }
}

/// Read the stored snapshot, correct it for suspended time, and load it
/// into the store. Returns false on a first run (nothing stored).
pub async fn restore_progress(
    store: &ProgressStore,
    storage: &ProgressStorage,
    now: DateTime<Utc>,
) -> Result<bool, PersistenceError> {
    let Some(mut stored) = storage.load().await? else {
        debug!("No stored progress, starting fresh");
        return Ok(false);
    };

    let elapsed = elapsed_seconds(stored.saved_at, now);
    apply_elapsed(&mut stored.categories, elapsed);
    info!(
        "Restored {} categories ({}s elapsed while away)",
        stored.categories.len(),
        elapsed
    );

    store.replace(stored.categories);
    Ok(true)
}

/// Persist the store's live snapshot together with the current timestamp.
pub async fn save_progress(
    store: &ProgressStore,
    storage: &ProgressStorage,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    storage.save(&store.snapshot(), now).await
}
