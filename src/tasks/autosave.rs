//! Periodic persistence background task

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::interval;
use tracing::{info, warn};

use crate::persist::{save_progress, ProgressStorage};
use crate::state::ProgressStore;

/// Background task that periodically persists the live snapshot.
///
/// Before each save the persisted canonical list is reconciled into the
/// live store, so timers appended by one-shot commands while this session
/// runs show up without clobbering the live countdown state. Storage
/// failures are logged and swallowed; the next cycle retries naturally.
pub async fn autosave_task(store: Arc<ProgressStore>, storage: ProgressStorage, every: Duration) {
    info!("Starting autosave task (every {}s)", every.as_secs());

    let mut ticker = interval(every);
    // The first tick fires immediately; skip straight to the cadence.
    ticker.tick().await;

    loop {
        ticker.tick().await;

        match storage.load().await {
            Ok(Some(stored)) => store.reconcile(&stored.categories),
            Ok(None) => {}
            Err(e) => warn!("Failed to read stored progress for reconcile: {}", e),
        }

        if let Err(e) = save_progress(&store, &storage, Utc::now()).await {
            warn!("Failed to autosave progress: {}", e);
        }
    }
}
