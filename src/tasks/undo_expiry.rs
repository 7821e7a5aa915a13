//! Undo expiry background task

use std::sync::Arc;
use tokio::time::sleep_until;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Background task that withdraws the undo option once its window has passed.
///
/// Re-arming (a new rotation) or using undo replaces the watched mark, which
/// cancels the pending expiry.
pub async fn undo_expiry_task(state: Arc<AppState>) {
    info!("Starting undo expiry task");

    let mut undo_rx = state.subscribe_undo();

    loop {
        let mark = *undo_rx.borrow_and_update();

        // A window too large to express as an instant never expires on its own
        let deadline = mark.and_then(|mark| {
            mark.armed_at
                .checked_add(state.undo_window)
                .map(|deadline| (mark, deadline))
        });

        if let Some((mark, deadline)) = deadline {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    match state.expire_undo(mark) {
                        Ok(true) => debug!("Undo option withdrawn"),
                        Ok(false) => debug!("Undo mark already replaced"),
                        Err(e) => error!("Failed to expire undo: {}", e),
                    }
                }

                changed = undo_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }
        }

        if undo_rx.changed().await.is_err() {
            break;
        }
    }

    info!("Undo channel closed, stopping undo expiry task");
}
