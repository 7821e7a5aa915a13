//! Turn timer engine
//!
//! Pure state machine for the table: roster, whose clock runs, rotation and
//! edit gating. Nothing in here schedules work or touches I/O.

pub mod intent;
pub mod palette;
pub mod player;
pub mod snapshot;
pub mod turn_engine;

// Re-export main types
pub use intent::Intent;
pub use palette::PlayerColor;
pub use player::{parse_time_input, Player, DEFAULT_PLAYER_SECONDS};
pub use snapshot::{format_time, Controls, EngineSnapshot, PlayerView};
pub use turn_engine::{
    ClockKey, Direction, EngineSettings, EngineState, Phase, ResetPolicy, UndoMark,
    DEFAULT_UNDO_WINDOW, MIN_PLAYERS,
};
