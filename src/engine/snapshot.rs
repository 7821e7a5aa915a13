//! Read-only view model handed to renderers

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::{Direction, EngineState, Phase, PlayerColor, ResetPolicy, MIN_PLAYERS};

/// Format seconds as `m:ss`. There is no hours component.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One player card as a view would draw it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub name: String,
    pub time: u32,
    pub initial_time: u32,
    pub formatted_time: String,
    pub color: PlayerColor,
    pub color_hex: String,
    pub is_current: bool,
    pub is_out_of_time: bool,
}

/// Which controls a view should enable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub can_edit: bool,
    pub can_tap: bool,
    pub can_skip: bool,
    pub can_reverse: bool,
    pub can_undo: bool,
    pub can_add_player: bool,
    pub can_remove_player: bool,
}

/// Snapshot of the whole table after the latest mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub is_running: bool,
    pub is_editing: bool,
    pub started: bool,
    pub tutorial_visible: bool,
    pub current_index: usize,
    pub direction: Direction,
    pub reverse_enabled: bool,
    pub skip_enabled: bool,
    pub reset_policy: ResetPolicy,
    pub undo_available: bool,
    pub undo_remaining_ms: Option<u64>,
    pub players: Vec<PlayerView>,
    pub controls: Controls,
}

impl EngineState {
    pub fn snapshot(&self, now: Instant) -> EngineSnapshot {
        let undo_remaining = self.undo_remaining(now);
        let running = self.is_running();
        let editing = self.is_editing();

        let players = self
            .players
            .iter()
            .enumerate()
            .map(|(index, player)| PlayerView {
                name: player.name.clone(),
                time: player.time,
                initial_time: player.initial_time,
                formatted_time: format_time(player.time),
                color: player.color,
                color_hex: player.color.hex().to_string(),
                is_current: index == self.current_index,
                is_out_of_time: player.is_out_of_time(),
            })
            .collect();

        EngineSnapshot {
            phase: self.phase,
            is_running: running,
            is_editing: editing,
            started: self.started,
            tutorial_visible: !self.started,
            current_index: self.current_index,
            direction: self.direction,
            reverse_enabled: self.reverse_enabled,
            skip_enabled: self.skip_enabled,
            reset_policy: self.reset_policy,
            undo_available: undo_remaining.is_some(),
            undo_remaining_ms: undo_remaining.map(|d| d.as_millis() as u64),
            players,
            controls: Controls {
                can_edit: editing,
                can_tap: running,
                can_skip: running && self.skip_enabled,
                can_reverse: running && self.reverse_enabled,
                can_undo: undo_remaining.is_some(),
                can_add_player: editing,
                can_remove_player: editing && self.players.len() > MIN_PLAYERS,
            },
        }
    }
}
