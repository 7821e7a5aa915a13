//! Configuration and CLI argument handling

use std::time::Duration;

use clap::{ArgAction, Parser};

use crate::engine::{EngineSettings, ResetPolicy};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "turn-timer")]
#[command(about = "A turn-based multiplayer countdown timer for tabletop games")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Number of players at the table on startup (minimum 2)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u16).range(2..))]
    pub players: u16,

    /// Time bank per player in seconds
    #[arg(short, long, default_value = "60")]
    pub time: u32,

    /// Seconds a turn change stays undoable
    #[arg(long, default_value = "5")]
    pub undo_window: u64,

    /// Whose clock is refilled when the turn moves on
    #[arg(long, value_enum, default_value = "arriving")]
    pub reset_on: ResetPolicy,

    /// Allow reversing the rotation while the clock runs
    #[arg(long, default_value = "true", action = ArgAction::Set)]
    pub reverse_enabled: bool,

    /// Allow skipping a player while the clock runs
    #[arg(long, default_value = "true", action = ArgAction::Set)]
    pub skip_enabled: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Settings for the table created at startup
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            player_count: usize::from(self.players),
            default_seconds: self.time,
            undo_window: Duration::from_secs(self.undo_window),
            reset_policy: self.reset_on,
            reverse_enabled: self.reverse_enabled,
            skip_enabled: self.skip_enabled,
        }
    }
}
