//! User intents accepted by the engine

use serde::{Deserialize, Serialize};

use super::PlayerColor;

/// Every action a presentation layer can forward into the engine.
///
/// Serialized as `{"type": "advance_turn"}`, `{"type": "rename_player", "index": 0, "name": "Ana"}`, etc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    ToggleRunning,
    AdvanceTurn,
    /// Area-click on the board; only advances while the clock runs
    Tap,
    SkipTurn,
    ReverseDirection,
    UndoTurn,
    ResetAll,
    AddPlayer,
    RemovePlayer,
    RenamePlayer { index: usize, name: String },
    /// `seconds` is raw input text, see [`super::parse_time_input`]
    SetPlayerTime { index: usize, seconds: String },
    SetPlayerColor { index: usize, color: PlayerColor },
    SetToggles {
        #[serde(default)]
        reverse_enabled: Option<bool>,
        #[serde(default)]
        skip_enabled: Option<bool>,
    },
}

impl Intent {
    /// Short action label used for logging and last-action tracking
    pub fn label(&self) -> &'static str {
        match self {
            Intent::ToggleRunning => "toggle",
            Intent::AdvanceTurn => "next",
            Intent::Tap => "tap",
            Intent::SkipTurn => "skip",
            Intent::ReverseDirection => "reverse",
            Intent::UndoTurn => "undo",
            Intent::ResetAll => "reset",
            Intent::AddPlayer => "add-player",
            Intent::RemovePlayer => "remove-player",
            Intent::RenamePlayer { .. } => "rename-player",
            Intent::SetPlayerTime { .. } => "set-player-time",
            Intent::SetPlayerColor { .. } => "set-player-color",
            Intent::SetToggles { .. } => "set-toggles",
        }
    }
}
