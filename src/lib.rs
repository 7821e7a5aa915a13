//! Turn Timer - A turn-based multiplayer countdown timer for tabletop games
//!
//! Each player has a configurable time bank and exactly one clock runs at a
//! time. The engine is served over HTTP so any renderer can show the table
//! and forward player actions back as intents.

pub mod config;
pub mod engine;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::{EngineSnapshot, EngineState, Intent};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
