//! Background tasks module
//!
//! This module contains the timers that run alongside the HTTP server.

pub mod turn_clock;
pub mod undo_expiry;

// Re-export main functions
pub use turn_clock::turn_clock_task;
pub use undo_expiry::undo_expiry_task;
