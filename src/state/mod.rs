//! State management module
//!
//! Shared, lock-guarded ownership of the engine plus the channels that tell
//! background tasks and renderers when it changed.

pub mod app_state;

// Re-export main types
pub use app_state::{AppState, Applied};
