//! Countdown engine background task

use std::{sync::Arc, time::Duration};

use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::state::ProgressStore;

/// Background task that advances all running timers once per second.
///
/// One scheduler tick covers every timer together; there are no per-timer
/// handles to cancel. Pausing takes effect under the store lock, so a
/// paused timer can never be decremented by a tick that was already
/// pending. Missed ticks are delayed rather than bursted - the engine
/// makes no drift correction beyond its one-second granularity.
pub async fn countdown_engine_task(store: Arc<ProgressStore>) {
    info!("Starting countdown engine");

    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let completions = store.tick_all();
        for completion in &completions {
            debug!(
                "Timer '{}' completed at ({}, {})",
                completion.name, completion.category_index, completion.timer_index
            );
        }
    }
}
