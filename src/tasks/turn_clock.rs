//! Turn clock background task

use std::{sync::Arc, time::Duration};
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info};

use crate::state::AppState;

const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Background task that counts the current player's clock down once per second.
///
/// The interval is rebuilt whenever the clock key changes (start, pause or a
/// new current player), so a tick scheduled for an earlier state never lands
/// on the new one.
pub async fn turn_clock_task(state: Arc<AppState>) {
    info!("Starting turn clock task");

    let mut clock_rx = state.subscribe_clock();

    loop {
        let key = *clock_rx.borrow_and_update();

        if !key.running {
            debug!("Clock stopped, waiting for start");
            if clock_rx.changed().await.is_err() {
                info!("Clock channel closed, stopping turn clock task");
                return;
            }
            continue;
        }

        debug!(
            "Scheduling ticks for player {} (epoch {})",
            key.current_index, key.epoch
        );
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = state.tick(key) {
                        error!("Failed to apply clock tick: {}", e);
                    }
                }

                changed = clock_rx.changed() => {
                    if changed.is_err() {
                        info!("Clock channel closed, stopping turn clock task");
                        return;
                    }
                    debug!("Clock key changed, rescheduling");
                    break;
                }
            }
        }
    }
}
