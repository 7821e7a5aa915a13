//! Main application state management

use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::{Duration, Instant as StdInstant},
};
use chrono::{DateTime, Utc};
use tokio::{sync::watch, time::Instant};
use tracing::{debug, info};

use crate::engine::{ClockKey, EngineSettings, EngineSnapshot, EngineState, Intent, UndoMark};

/// Outcome of an intent as seen by the caller
#[derive(Debug, Clone)]
pub struct Applied {
    pub applied: bool,
    pub snapshot: EngineSnapshot,
}

/// Main application state that owns the engine and fans out its changes
#[derive(Debug)]
pub struct AppState {
    /// The single engine instance; every read-modify-write happens under this lock
    engine: Arc<Mutex<EngineState>>,
    /// Reset confirmation dialog is open
    reset_pending: Arc<Mutex<bool>>,
    /// Server metadata
    pub start_time: StdInstant,
    pub port: u16,
    pub host: String,
    /// How long a rotation stays undoable
    pub undo_window: Duration,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Latest snapshot for renderers
    snapshot_tx: watch::Sender<EngineSnapshot>,
    /// Tick scheduling key, only notified when it actually changes
    clock_tx: watch::Sender<ClockKey>,
    /// Undo mark the expiry task should be watching
    undo_tx: watch::Sender<Option<UndoMark>>,
}

impl AppState {
    /// Create a new AppState with a fresh table
    pub fn new(port: u16, host: String, settings: EngineSettings) -> Self {
        let undo_window = settings.undo_window;
        let engine = EngineState::new(settings);
        let (snapshot_tx, _) = watch::channel(engine.snapshot(Instant::now()));
        let (clock_tx, _) = watch::channel(engine.clock_key());
        let (undo_tx, _) = watch::channel(engine.undo_mark());

        Self {
            engine: Arc::new(Mutex::new(engine)),
            reset_pending: Arc::new(Mutex::new(false)),
            start_time: StdInstant::now(),
            port,
            host,
            undo_window,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            snapshot_tx,
            clock_tx,
            undo_tx,
        }
    }

    fn lock_engine(&self) -> Result<MutexGuard<'_, EngineState>, String> {
        self.engine
            .lock()
            .map_err(|e| format!("Failed to lock engine state: {}", e))
    }

    /// Push the engine's current state to every watcher.
    /// Called with the engine lock held so published snapshots never go back in time.
    fn publish(&self, engine: &EngineState, now: Instant) -> EngineSnapshot {
        let snapshot = engine.snapshot(now);
        self.snapshot_tx.send_replace(snapshot.clone());

        let key = engine.clock_key();
        self.clock_tx.send_if_modified(|current| {
            if *current == key {
                return false;
            }
            *current = key;
            true
        });

        let mark = engine.undo_mark();
        self.undo_tx.send_if_modified(|current| {
            if *current == mark {
                return false;
            }
            *current = mark;
            true
        });

        snapshot
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Apply a user intent to the engine
    pub fn dispatch(&self, intent: Intent) -> Result<Applied, String> {
        let mut engine = self.lock_engine()?;
        let now = Instant::now();

        let applied = engine.apply(&intent, now);
        let snapshot = if applied {
            self.publish(&engine, now)
        } else {
            engine.snapshot(now)
        };
        drop(engine);

        if applied {
            info!(
                "Applied {}: current={}, running={}",
                intent.label(),
                snapshot.current_index,
                snapshot.is_running
            );
            self.record_action(intent.label());
        } else {
            debug!("Ignored {} in current state", intent.label());
        }

        Ok(Applied { applied, snapshot })
    }

    /// One second elapsed for the clock scheduled under `key`
    pub fn tick(&self, key: ClockKey) -> Result<bool, String> {
        let mut engine = self.lock_engine()?;
        let ticked = engine.tick(key.epoch);
        if ticked {
            let now = Instant::now();
            self.publish(&engine, now);
            debug!(
                "Tick: player {} has {}s left",
                key.current_index,
                engine.current_player().time
            );
        }
        Ok(ticked)
    }

    /// Undo window for `mark` ran out
    pub fn expire_undo(&self, mark: UndoMark) -> Result<bool, String> {
        let mut engine = self.lock_engine()?;
        let expired = engine.expire_undo(mark.armed_at);
        if expired {
            self.publish(&engine, Instant::now());
            debug!("Undo window expired for turn from player {}", mark.previous_index);
        }
        Ok(expired)
    }

    /// Open the reset confirmation step. Nothing on the table changes yet.
    pub fn request_reset(&self) -> Result<Applied, String> {
        let mut pending = self.reset_pending.lock()
            .map_err(|e| format!("Failed to lock reset confirmation: {}", e))?;
        let applied = !*pending;
        *pending = true;
        drop(pending);

        info!("Reset requested, awaiting confirmation");
        Ok(Applied { applied, snapshot: self.get_snapshot()? })
    }

    /// Confirm a pending reset; a no-op when no confirmation is open
    pub fn confirm_reset(&self) -> Result<Applied, String> {
        let mut pending = self.reset_pending.lock()
            .map_err(|e| format!("Failed to lock reset confirmation: {}", e))?;
        if !*pending {
            drop(pending);
            debug!("Reset confirmation without a pending request ignored");
            return Ok(Applied { applied: false, snapshot: self.get_snapshot()? });
        }
        *pending = false;
        drop(pending);

        self.dispatch(Intent::ResetAll)
    }

    /// Close the reset confirmation without touching the table
    pub fn cancel_reset(&self) -> Result<Applied, String> {
        let mut pending = self.reset_pending.lock()
            .map_err(|e| format!("Failed to lock reset confirmation: {}", e))?;
        let applied = *pending;
        *pending = false;
        drop(pending);

        if applied {
            info!("Reset cancelled");
        }
        Ok(Applied { applied, snapshot: self.get_snapshot()? })
    }

    pub fn is_reset_pending(&self) -> Result<bool, String> {
        self.reset_pending.lock()
            .map(|pending| *pending)
            .map_err(|e| format!("Failed to lock reset confirmation: {}", e))
    }

    /// Current snapshot with undo validity evaluated against now
    pub fn get_snapshot(&self) -> Result<EngineSnapshot, String> {
        self.lock_engine().map(|engine| engine.snapshot(Instant::now()))
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<EngineSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn subscribe_clock(&self) -> watch::Receiver<ClockKey> {
        self.clock_tx.subscribe()
    }

    pub fn subscribe_undo(&self) -> watch::Receiver<Option<UndoMark>> {
        self.undo_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Phase;

    fn state() -> AppState {
        AppState::new(0, "127.0.0.1".to_string(), EngineSettings::default())
    }

    #[test]
    fn dispatch_reports_applied_and_records_action() {
        let state = state();
        let result = state.dispatch(Intent::ToggleRunning).unwrap();
        assert!(result.applied);
        assert_eq!(result.snapshot.phase, Phase::Running);

        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("toggle"));
        assert!(time.is_some());
    }

    #[test]
    fn rejected_intent_is_silent_and_unrecorded() {
        let state = state();
        let result = state.dispatch(Intent::SkipTurn).unwrap();
        assert!(!result.applied);
        assert_eq!(result.snapshot.current_index, 0);
        assert_eq!(state.get_last_action().0, None);
    }

    #[test]
    fn applied_intent_publishes_snapshot() {
        let state = state();
        let mut rx = state.subscribe_snapshots();
        state.dispatch(Intent::AddPlayer).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().players.len(), 3);
    }

    #[test]
    fn clock_key_only_notifies_on_change() {
        let state = state();
        let mut rx = state.subscribe_clock();
        state
            .dispatch(Intent::RenamePlayer { index: 0, name: "Ana".to_string() })
            .unwrap();
        assert!(!rx.has_changed().unwrap());

        state.dispatch(Intent::ToggleRunning).unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().running);
    }

    #[test]
    fn tick_with_stale_key_is_ignored() {
        let state = state();
        state.dispatch(Intent::ToggleRunning).unwrap();
        let stale = *state.subscribe_clock().borrow();
        state.dispatch(Intent::AdvanceTurn).unwrap();

        assert!(!state.tick(stale).unwrap());
        let fresh = *state.subscribe_clock().borrow();
        assert!(state.tick(fresh).unwrap());
        assert_eq!(state.get_snapshot().unwrap().players[1].time, 59);
    }

    #[test]
    fn advance_arms_undo_watch() {
        let state = state();
        let rx = state.subscribe_undo();
        state.dispatch(Intent::AdvanceTurn).unwrap();
        let mark = (*rx.borrow()).expect("undo armed");
        assert_eq!(mark.previous_index, 0);

        assert!(state.expire_undo(mark).unwrap());
        assert!(!state.get_snapshot().unwrap().undo_available);
        assert!(!state.dispatch(Intent::UndoTurn).unwrap().applied);
    }

    #[test]
    fn reset_requires_confirmation() {
        let state = state();
        state.dispatch(Intent::ToggleRunning).unwrap();
        state.dispatch(Intent::AdvanceTurn).unwrap();

        assert!(!state.confirm_reset().unwrap().applied);
        assert_eq!(state.get_snapshot().unwrap().current_index, 1);

        assert!(state.request_reset().unwrap().applied);
        assert!(state.is_reset_pending().unwrap());
        let result = state.confirm_reset().unwrap();
        assert!(result.applied);
        assert_eq!(result.snapshot.current_index, 0);
        assert_eq!(result.snapshot.phase, Phase::Editing);
        assert!(!state.is_reset_pending().unwrap());
    }

    #[test]
    fn cancelled_reset_leaves_table_alone() {
        let state = state();
        state.dispatch(Intent::AdvanceTurn).unwrap();
        state.request_reset().unwrap();
        assert!(state.cancel_reset().unwrap().applied);
        assert!(!state.confirm_reset().unwrap().applied);
        assert_eq!(state.get_snapshot().unwrap().current_index, 1);
    }

    #[test]
    fn uptime_formats_seconds() {
        let state = state();
        assert!(state.get_uptime().ends_with('s'));
    }
}
