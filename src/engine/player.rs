//! Player record and time-entry parsing

use serde::{Deserialize, Serialize};

use super::PlayerColor;

/// Time bank a player starts with when no other value is configured
pub const DEFAULT_PLAYER_SECONDS: u32 = 60;

/// One seat at the table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    /// Configured time bank in seconds; the value `time` is re-armed to
    pub initial_time: u32,
    /// Remaining seconds for the current turn
    pub time: u32,
    pub color: PlayerColor,
}

impl Player {
    pub fn new(name: impl Into<String>, seconds: u32, color: PlayerColor) -> Self {
        Self {
            name: name.into(),
            initial_time: seconds,
            time: seconds,
            color,
        }
    }

    /// Name given to the player occupying `position` (zero-based)
    pub fn default_name(position: usize) -> String {
        format!("Player {}", position + 1)
    }

    /// Decrement remaining time by one second, stopping at zero.
    /// Returns false when the clock was already empty.
    pub fn tick(&mut self) -> bool {
        if self.time == 0 {
            return false;
        }
        self.time -= 1;
        true
    }

    pub fn rearm(&mut self) {
        self.time = self.initial_time;
    }

    pub fn set_time_bank(&mut self, seconds: u32) {
        self.initial_time = seconds;
        self.time = seconds;
    }

    pub fn is_out_of_time(&self) -> bool {
        self.time == 0
    }
}

/// Parse raw time-entry text the way a numeric input field is read.
///
/// Leading whitespace and a sign are accepted, then the leading run of
/// decimal digits is used and anything after it is ignored. Input without
/// digits, and negative values, give 0. Values past `u32::MAX` saturate.
pub fn parse_time_input(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };

    if digits.is_empty() || negative {
        return 0;
    }

    digits.bytes().fold(0u32, |acc, b| {
        acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
    })
}
