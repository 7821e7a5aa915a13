//! Turn and clock state machine
//!
//! `EngineState` owns the roster and decides whose clock runs. It is purely
//! synchronous: callers pass the current instant where undo bookkeeping needs
//! it, and background scheduling is driven from [`ClockKey`] and [`UndoMark`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::debug;

use super::{parse_time_input, Intent, Player, PlayerColor, DEFAULT_PLAYER_SECONDS};

/// Roster floor enforced by player removal
pub const MIN_PLAYERS: usize = 2;

/// How long the most recent rotation stays undoable
pub const DEFAULT_UNDO_WINDOW: Duration = Duration::from_secs(5);

/// Run state of the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Clock stopped, player fields editable
    Editing,
    /// Current player's clock counting down, fields locked
    Running,
}

/// Rotation direction around the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    pub fn step(&self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => -1,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Direction::Forward => Direction::Reverse,
            Direction::Reverse => Direction::Forward,
        }
    }
}

/// Which player's time bank is re-armed when a plain advance moves the turn.
/// Skip and reverse always re-arm the player they land on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ResetPolicy {
    /// The player becoming current starts from a full bank
    Arriving,
    /// The player handing over gets a full bank for their next turn
    Departing,
}

/// Record of the last rotation, kept so it can be rewound
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoMark {
    pub previous_index: usize,
    pub armed_at: Instant,
}

/// Dependency set of the one-second tick.
///
/// The tick task reschedules whenever this changes, and a tick is only
/// applied if it carries the epoch that is current when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockKey {
    pub running: bool,
    pub current_index: usize,
    pub epoch: u64,
}

/// Startup parameters for a fresh table
#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub player_count: usize,
    pub default_seconds: u32,
    pub undo_window: Duration,
    pub reset_policy: ResetPolicy,
    pub reverse_enabled: bool,
    pub skip_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            player_count: MIN_PLAYERS,
            default_seconds: DEFAULT_PLAYER_SECONDS,
            undo_window: DEFAULT_UNDO_WINDOW,
            reset_policy: ResetPolicy::Arriving,
            reverse_enabled: true,
            skip_enabled: true,
        }
    }
}

/// Complete table state, mutated only through intents
#[derive(Debug, Clone)]
pub struct EngineState {
    pub(crate) players: Vec<Player>,
    pub(crate) current_index: usize,
    pub(crate) direction: Direction,
    pub(crate) phase: Phase,
    /// One-way latch set on the first start; cleared only by reset
    pub(crate) started: bool,
    pub(crate) undo: Option<UndoMark>,
    pub(crate) reverse_enabled: bool,
    pub(crate) skip_enabled: bool,
    pub(crate) reset_policy: ResetPolicy,
    pub(crate) undo_window: Duration,
    pub(crate) default_seconds: u32,
    pub(crate) clock_epoch: u64,
}

impl EngineState {
    pub fn new(settings: EngineSettings) -> Self {
        let mut players: Vec<Player> = Vec::new();
        for position in 0..settings.player_count.max(MIN_PLAYERS) {
            let color = PlayerColor::first_unused(players.iter().map(|p| &p.color));
            players.push(Player::new(
                Player::default_name(position),
                settings.default_seconds,
                color,
            ));
        }

        Self {
            players,
            current_index: 0,
            direction: Direction::Forward,
            phase: Phase::Editing,
            started: false,
            undo: None,
            reverse_enabled: settings.reverse_enabled,
            skip_enabled: settings.skip_enabled,
            reset_policy: settings.reset_policy,
            undo_window: settings.undo_window,
            default_seconds: settings.default_seconds,
            clock_epoch: 0,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_index]
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_editing(&self) -> bool {
        self.phase == Phase::Editing
    }

    pub fn has_started(&self) -> bool {
        self.started
    }

    pub fn reverse_enabled(&self) -> bool {
        self.reverse_enabled
    }

    pub fn skip_enabled(&self) -> bool {
        self.skip_enabled
    }

    pub fn reset_policy(&self) -> ResetPolicy {
        self.reset_policy
    }

    pub fn clock_key(&self) -> ClockKey {
        ClockKey {
            running: self.is_running(),
            current_index: self.current_index,
            epoch: self.clock_epoch,
        }
    }

    pub fn undo_mark(&self) -> Option<UndoMark> {
        self.undo
    }

    pub fn undo_window(&self) -> Duration {
        self.undo_window
    }

    /// Time left before the undo option lapses, if it is still valid at `now`
    pub fn undo_remaining(&self, now: Instant) -> Option<Duration> {
        let mark = self.undo?;
        let elapsed = now.saturating_duration_since(mark.armed_at);
        if elapsed < self.undo_window {
            Some(self.undo_window - elapsed)
        } else {
            None
        }
    }

    pub fn undo_available(&self, now: Instant) -> bool {
        self.undo_remaining(now).is_some()
    }

    /// Apply an intent. Returns whether anything changed; intents issued
    /// in a state that does not permit them are silently ignored.
    pub fn apply(&mut self, intent: &Intent, now: Instant) -> bool {
        let changed = match intent {
            Intent::ToggleRunning => self.toggle_running(),
            Intent::AdvanceTurn => self.advance_turn(now),
            Intent::Tap => self.tap(now),
            Intent::SkipTurn => self.skip_turn(now),
            Intent::ReverseDirection => self.reverse_direction(now),
            Intent::UndoTurn => self.undo_turn(now),
            Intent::ResetAll => self.reset_all(),
            Intent::AddPlayer => self.add_player(),
            Intent::RemovePlayer => self.remove_player(),
            Intent::RenamePlayer { index, name } => self.rename_player(*index, name),
            Intent::SetPlayerTime { index, seconds } => self.set_player_time(*index, seconds),
            Intent::SetPlayerColor { index, color } => self.set_player_color(*index, *color),
            Intent::SetToggles {
                reverse_enabled,
                skip_enabled,
            } => self.set_toggles(*reverse_enabled, *skip_enabled),
        };

        if !changed {
            debug!("Intent {} ignored in phase {:?}", intent.label(), self.phase);
        }
        changed
    }

    /// Start or pause the clock. Starting locks editing and sets the started latch.
    pub fn toggle_running(&mut self) -> bool {
        self.phase = match self.phase {
            Phase::Editing => {
                self.started = true;
                Phase::Running
            }
            Phase::Running => Phase::Editing,
        };
        self.clock_epoch += 1;
        true
    }

    /// One second elapsed on the clock scheduled for `epoch`
    pub fn tick(&mut self, epoch: u64) -> bool {
        if !self.is_running() || epoch != self.clock_epoch {
            return false;
        }
        let index = self.current_index;
        self.players[index].tick()
    }

    pub fn advance_turn(&mut self, now: Instant) -> bool {
        self.rotate(1, self.reset_policy, now);
        true
    }

    pub fn tap(&mut self, now: Instant) -> bool {
        if !self.is_running() {
            return false;
        }
        self.advance_turn(now)
    }

    /// Pass over the next player in the current direction
    pub fn skip_turn(&mut self, now: Instant) -> bool {
        if !self.is_running() || !self.skip_enabled {
            return false;
        }
        self.rotate(2, ResetPolicy::Arriving, now);
        true
    }

    /// Flip direction and immediately hand the turn to the neighbour on the other side
    pub fn reverse_direction(&mut self, now: Instant) -> bool {
        if !self.is_running() || !self.reverse_enabled {
            return false;
        }
        self.direction = self.direction.flipped();
        self.rotate(1, ResetPolicy::Arriving, now);
        true
    }

    /// Rewind whose turn it is. Clock values are left as they are.
    pub fn undo_turn(&mut self, now: Instant) -> bool {
        if !self.undo_available(now) {
            return false;
        }
        let Some(mark) = self.undo.take() else {
            return false;
        };
        if mark.previous_index >= self.players.len() {
            return false;
        }
        self.current_index = mark.previous_index;
        self.clock_epoch += 1;
        true
    }

    /// Drop the undo mark armed at `armed_at`, unless a newer one replaced it
    pub fn expire_undo(&mut self, armed_at: Instant) -> bool {
        match self.undo {
            Some(mark) if mark.armed_at == armed_at => {
                self.undo = None;
                true
            }
            _ => false,
        }
    }

    /// Refill every clock, stop, return to the first player and re-enter editing.
    /// Direction and feature toggles are kept.
    pub fn reset_all(&mut self) -> bool {
        for player in &mut self.players {
            player.rearm();
        }
        self.phase = Phase::Editing;
        self.current_index = 0;
        self.started = false;
        self.undo = None;
        self.clock_epoch += 1;
        true
    }

    pub fn add_player(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        let color = PlayerColor::first_unused(self.players.iter().map(|p| &p.color));
        let name = Player::default_name(self.players.len());
        self.players
            .push(Player::new(name, self.default_seconds, color));
        self.undo = None;
        true
    }

    /// Remove the last player in rotation order, never going below [`MIN_PLAYERS`]
    pub fn remove_player(&mut self) -> bool {
        if !self.is_editing() || self.players.len() <= MIN_PLAYERS {
            return false;
        }
        self.players.pop();
        if self.current_index >= self.players.len() {
            self.current_index = 0;
            self.clock_epoch += 1;
        }
        self.undo = None;
        true
    }

    pub fn rename_player(&mut self, index: usize, name: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        match self.players.get_mut(index) {
            Some(player) => {
                player.name = name.to_string();
                true
            }
            None => false,
        }
    }

    /// Set both the time bank and remaining time from raw input text
    pub fn set_player_time(&mut self, index: usize, raw: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        let seconds = parse_time_input(raw);
        match self.players.get_mut(index) {
            Some(player) => {
                player.set_time_bank(seconds);
                true
            }
            None => false,
        }
    }

    pub fn set_player_color(&mut self, index: usize, color: PlayerColor) -> bool {
        if !self.is_editing() {
            return false;
        }
        match self.players.get_mut(index) {
            Some(player) => {
                player.color = color;
                true
            }
            None => false,
        }
    }

    pub fn set_toggles(&mut self, reverse_enabled: Option<bool>, skip_enabled: Option<bool>) -> bool {
        let before = (self.reverse_enabled, self.skip_enabled);
        if let Some(enabled) = reverse_enabled {
            self.reverse_enabled = enabled;
        }
        if let Some(enabled) = skip_enabled {
            self.skip_enabled = enabled;
        }
        before != (self.reverse_enabled, self.skip_enabled)
    }

    fn step_from(&self, from: usize, steps: isize) -> usize {
        let count = self.players.len() as isize;
        (from as isize + self.direction.step() * steps).rem_euclid(count) as usize
    }

    /// Move the turn `steps` seats and re-arm the player `rearm` selects.
    /// Skip and reverse always re-arm the landing player; only a plain
    /// advance follows the configured policy.
    fn rotate(&mut self, steps: isize, rearm: ResetPolicy, now: Instant) {
        let from = self.current_index;
        let to = self.step_from(from, steps);

        match rearm {
            ResetPolicy::Arriving => self.players[to].rearm(),
            ResetPolicy::Departing => self.players[from].rearm(),
        }

        self.current_index = to;
        self.undo = Some(UndoMark {
            previous_index: from,
            armed_at: now,
        });
        self.clock_epoch += 1;
    }
}

impl Default for EngineState {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running_table(count: usize) -> EngineState {
        let mut engine = EngineState::new(EngineSettings {
            player_count: count,
            ..EngineSettings::default()
        });
        engine.toggle_running();
        engine
    }

    fn tick_n(engine: &mut EngineState, n: u32) {
        for _ in 0..n {
            let epoch = engine.clock_key().epoch;
            engine.tick(epoch);
        }
    }

    #[test]
    fn new_table_has_two_default_players_in_editing() {
        let engine = EngineState::default();
        assert_eq!(engine.players().len(), 2);
        assert!(engine.is_editing());
        assert!(!engine.has_started());
        assert_eq!(engine.players()[0].color, PlayerColor::Sage);
        assert_eq!(engine.players()[1].color, PlayerColor::Lavender);
        assert!(engine.players().iter().all(|p| p.time == 60 && p.initial_time == 60));
    }

    #[test]
    fn settings_never_go_below_the_floor() {
        let engine = EngineState::new(EngineSettings {
            player_count: 0,
            ..EngineSettings::default()
        });
        assert_eq!(engine.players().len(), MIN_PLAYERS);
    }

    #[test]
    fn toggle_switches_phase_and_latches_started() {
        let mut engine = EngineState::default();
        engine.toggle_running();
        assert!(engine.is_running());
        assert!(!engine.is_editing());
        assert!(engine.has_started());

        engine.toggle_running();
        assert!(engine.is_editing());
        assert!(engine.has_started());
    }

    #[test]
    fn pausing_keeps_time_values() {
        let mut engine = running_table(2);
        tick_n(&mut engine, 7);
        engine.toggle_running();
        assert_eq!(engine.players()[0].time, 53);
    }

    #[test]
    fn tick_only_counts_down_current_player() {
        let mut engine = running_table(3);
        tick_n(&mut engine, 5);
        assert_eq!(engine.players()[0].time, 55);
        assert_eq!(engine.players()[1].time, 60);
        assert_eq!(engine.players()[2].time, 60);
    }

    #[test]
    fn tick_at_zero_stays_at_zero_without_advancing() {
        let mut engine = EngineState::default();
        engine.set_player_time(0, "1");
        engine.toggle_running();
        tick_n(&mut engine, 3);
        assert_eq!(engine.players()[0].time, 0);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn tick_is_ignored_while_editing() {
        let mut engine = EngineState::default();
        let epoch = engine.clock_key().epoch;
        assert!(!engine.tick(epoch));
        assert_eq!(engine.players()[0].time, 60);
    }

    #[test]
    fn stale_tick_does_not_touch_new_current_player() {
        let mut engine = running_table(2);
        let stale = engine.clock_key().epoch;
        engine.advance_turn(Instant::now());
        assert!(!engine.tick(stale));
        assert_eq!(engine.players()[1].time, 60);
    }

    #[test]
    fn advance_rearms_arriving_player_by_default() {
        let mut engine = EngineState::default();
        engine.set_player_time(0, "30");
        engine.set_player_time(1, "45");
        engine.toggle_running();
        tick_n(&mut engine, 10);
        assert_eq!(engine.players()[0].time, 20);

        let now = Instant::now();
        engine.advance_turn(now);
        assert_eq!(engine.current_index(), 1);
        assert_eq!(engine.players()[1].time, 45);
        assert_eq!(engine.players()[0].time, 20);

        assert!(engine.undo_turn(now));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.players()[0].time, 20);
    }

    #[test]
    fn departing_policy_rearms_outgoing_player() {
        let mut engine = EngineState::new(EngineSettings {
            reset_policy: ResetPolicy::Departing,
            ..EngineSettings::default()
        });
        engine.set_player_time(0, "30");
        engine.toggle_running();
        tick_n(&mut engine, 10);
        engine.advance_turn(Instant::now());
        assert_eq!(engine.players()[0].time, 30);
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn skip_rearms_landing_player_under_departing_policy() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 3,
            reset_policy: ResetPolicy::Departing,
            ..EngineSettings::default()
        });
        engine.set_player_time(2, "40");
        engine.toggle_running();
        engine.players[0].time = 12;
        engine.players[2].time = 3;

        engine.skip_turn(Instant::now());
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.players()[2].time, 40);
        assert_eq!(engine.players()[0].time, 12);
    }

    #[test]
    fn reverse_rearms_new_current_player_under_departing_policy() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 3,
            reset_policy: ResetPolicy::Departing,
            ..EngineSettings::default()
        });
        engine.set_player_time(2, "40");
        engine.toggle_running();
        engine.players[0].time = 12;
        engine.players[2].time = 3;

        engine.reverse_direction(Instant::now());
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.players()[2].time, 40);
        assert_eq!(engine.players()[0].time, 12);
    }

    #[test]
    fn advance_is_allowed_while_editing() {
        let mut engine = EngineState::default();
        assert!(engine.advance_turn(Instant::now()));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn tap_only_advances_while_running() {
        let mut engine = EngineState::default();
        assert!(!engine.tap(Instant::now()));
        assert_eq!(engine.current_index(), 0);

        engine.toggle_running();
        assert!(engine.tap(Instant::now()));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn skip_moves_two_seats() {
        let mut engine = running_table(4);
        assert!(engine.skip_turn(Instant::now()));
        assert_eq!(engine.current_index(), 2);
        assert!(engine.skip_turn(Instant::now()));
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn skip_rearms_landing_player() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 3,
            ..EngineSettings::default()
        });
        engine.set_player_time(2, "40");
        engine.toggle_running();
        engine.players[2].time = 3;
        engine.skip_turn(Instant::now());
        assert_eq!(engine.current_index(), 2);
        assert_eq!(engine.players()[2].time, 40);
    }

    #[test]
    fn skip_requires_running_and_toggle() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 4,
            ..EngineSettings::default()
        });
        assert!(!engine.skip_turn(Instant::now()));

        engine.toggle_running();
        engine.set_toggles(None, Some(false));
        assert!(!engine.skip_turn(Instant::now()));
        assert_eq!(engine.current_index(), 0);
        assert!(engine.undo_mark().is_none());
    }

    #[test]
    fn skip_records_undo() {
        let mut engine = running_table(4);
        let now = Instant::now();
        engine.skip_turn(now);
        assert!(engine.undo_turn(now));
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn reverse_flips_direction_and_steps_back() {
        let mut engine = running_table(4);
        let now = Instant::now();
        engine.advance_turn(now);
        assert_eq!(engine.current_index(), 1);

        assert!(engine.reverse_direction(now));
        assert_eq!(engine.direction(), Direction::Reverse);
        assert_eq!(engine.current_index(), 0);

        engine.advance_turn(now);
        assert_eq!(engine.current_index(), 3);
    }

    #[test]
    fn reverse_is_noop_when_disabled() {
        let mut engine = running_table(3);
        engine.set_toggles(Some(false), None);
        assert!(!engine.reverse_direction(Instant::now()));
        assert_eq!(engine.direction(), Direction::Forward);
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn reverse_is_noop_while_editing() {
        let mut engine = EngineState::default();
        assert!(!engine.reverse_direction(Instant::now()));
        assert_eq!(engine.direction(), Direction::Forward);
    }

    #[test]
    fn reverse_arms_undo_without_restoring_direction() {
        let mut engine = running_table(3);
        let now = Instant::now();
        engine.reverse_direction(now);
        assert_eq!(engine.current_index(), 2);
        assert!(engine.undo_turn(now));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.direction(), Direction::Reverse);
    }

    #[test]
    fn undo_without_advance_is_noop() {
        let mut engine = running_table(3);
        assert!(!engine.undo_turn(Instant::now()));
        assert_eq!(engine.current_index(), 0);
    }

    #[test]
    fn undo_is_single_level() {
        let mut engine = running_table(3);
        let now = Instant::now();
        engine.advance_turn(now);
        engine.advance_turn(now);
        assert!(engine.undo_turn(now));
        assert_eq!(engine.current_index(), 1);
        assert!(!engine.undo_turn(now));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn undo_lapses_after_window() {
        let mut engine = running_table(3);
        let armed = Instant::now();
        engine.advance_turn(armed);

        let almost = armed + DEFAULT_UNDO_WINDOW - Duration::from_millis(1);
        assert!(engine.undo_available(almost));
        assert_eq!(engine.undo_remaining(almost), Some(Duration::from_millis(1)));

        let late = armed + DEFAULT_UNDO_WINDOW;
        assert!(!engine.undo_available(late));
        assert!(!engine.undo_turn(late));
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn expire_undo_only_clears_matching_mark() {
        let mut engine = running_table(3);
        let first = Instant::now();
        engine.advance_turn(first);
        let second = first + Duration::from_secs(1);
        engine.advance_turn(second);

        assert!(!engine.expire_undo(first));
        assert!(engine.undo_mark().is_some());
        assert!(engine.expire_undo(second));
        assert!(engine.undo_mark().is_none());
    }

    #[test]
    fn reset_restores_banks_and_reenters_editing() {
        let mut engine = running_table(3);
        engine.set_toggles(None, Some(true));
        let now = Instant::now();
        engine.reverse_direction(now);
        tick_n(&mut engine, 12);

        assert!(engine.reset_all());
        assert!(engine.is_editing());
        assert!(!engine.has_started());
        assert_eq!(engine.current_index(), 0);
        assert!(engine.undo_mark().is_none());
        assert!(engine.players().iter().all(|p| p.time == p.initial_time));
        assert_eq!(engine.direction(), Direction::Reverse);
        assert!(engine.skip_enabled());
    }

    #[test]
    fn add_player_names_by_position_and_picks_free_color() {
        let mut engine = EngineState::default();
        engine.set_player_color(1, PlayerColor::Peach);
        assert!(engine.add_player());
        let added = &engine.players()[2];
        assert_eq!(added.name, "Player 3");
        assert_eq!(added.time, 60);
        assert_eq!(added.initial_time, 60);
        assert_eq!(added.color, PlayerColor::Lavender);
    }

    #[test]
    fn add_player_reuses_first_color_when_palette_exhausted() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 6,
            ..EngineSettings::default()
        });
        engine.add_player();
        assert_eq!(engine.players()[6].color, PlayerColor::Sage);
    }

    #[test]
    fn roster_changes_are_locked_while_running() {
        let mut engine = running_table(3);
        assert!(!engine.add_player());
        assert!(!engine.remove_player());
        assert_eq!(engine.players().len(), 3);
    }

    #[test]
    fn remove_player_keeps_current_index_in_range() {
        let mut engine = EngineState::new(EngineSettings {
            player_count: 3,
            ..EngineSettings::default()
        });
        engine.advance_turn(Instant::now());
        engine.advance_turn(Instant::now());
        assert_eq!(engine.current_index(), 2);

        assert!(engine.remove_player());
        assert_eq!(engine.current_index(), 0);
        assert!(engine.undo_mark().is_none());
    }

    #[test]
    fn field_edits_are_locked_while_running() {
        let mut engine = running_table(2);
        assert!(!engine.rename_player(0, "Ana"));
        assert!(!engine.set_player_time(0, "10"));
        assert!(!engine.set_player_color(0, PlayerColor::Coral));
        assert_eq!(engine.players()[0].name, "Player 1");
        assert_eq!(engine.players()[0].time, 60);
        assert_eq!(engine.players()[0].color, PlayerColor::Sage);
    }

    #[test]
    fn field_edits_out_of_range_are_ignored() {
        let mut engine = EngineState::default();
        assert!(!engine.rename_player(5, "Ghost"));
        assert!(!engine.set_player_time(5, "10"));
        assert!(!engine.set_player_color(5, PlayerColor::Mint));
    }

    #[test]
    fn set_player_time_with_garbage_zeroes_both_fields() {
        let mut engine = EngineState::default();
        assert!(engine.set_player_time(1, "abc"));
        assert_eq!(engine.players()[1].time, 0);
        assert_eq!(engine.players()[1].initial_time, 0);
    }

    #[test]
    fn apply_routes_intents() {
        let mut engine = EngineState::default();
        let now = Instant::now();
        assert!(engine.apply(
            &Intent::RenamePlayer { index: 0, name: "Ana".to_string() },
            now
        ));
        assert!(engine.apply(&Intent::ToggleRunning, now));
        assert!(!engine.apply(&Intent::AddPlayer, now));
        assert!(engine.apply(&Intent::Tap, now));
        assert_eq!(engine.players()[0].name, "Ana");
        assert_eq!(engine.current_index(), 1);
    }

    #[test]
    fn clock_key_changes_on_every_turn_change() {
        let mut engine = running_table(2);
        let before = engine.clock_key();
        engine.skip_turn(Instant::now());
        // two seats on a two-player table lands on the same player
        assert_eq!(engine.current_index(), before.current_index);
        assert_ne!(engine.clock_key(), before);
    }

    proptest! {
        #[test]
        fn removal_floor_holds(count in 2usize..12) {
            let mut engine = EngineState::new(EngineSettings {
                player_count: count,
                ..EngineSettings::default()
            });
            for _ in 0..count - 2 {
                prop_assert!(engine.remove_player());
            }
            prop_assert!(!engine.remove_player());
            prop_assert_eq!(engine.players().len(), 2);
        }

        #[test]
        fn full_rotation_returns_to_start(count in 2usize..12, start in 0usize..12, reverse in any::<bool>()) {
            let mut engine = EngineState::new(EngineSettings {
                player_count: count,
                ..EngineSettings::default()
            });
            engine.current_index = start % count;
            if reverse {
                engine.direction = Direction::Reverse;
            }
            let origin = engine.current_index();
            let now = Instant::now();
            for _ in 0..count {
                engine.advance_turn(now);
            }
            prop_assert_eq!(engine.current_index(), origin);
        }

        #[test]
        fn skip_moves_by_two_mod_n(count in 2usize..12, start in 0usize..12) {
            let mut engine = EngineState::new(EngineSettings {
                player_count: count,
                ..EngineSettings::default()
            });
            engine.current_index = start % count;
            engine.toggle_running();
            let origin = engine.current_index();
            engine.skip_turn(Instant::now());
            prop_assert_eq!(engine.current_index(), (origin + 2) % count);
        }

        #[test]
        fn reset_restores_every_bank(count in 2usize..8, ticks in 0u32..200, advances in 0usize..10) {
            let mut engine = EngineState::new(EngineSettings {
                player_count: count,
                ..EngineSettings::default()
            });
            engine.toggle_running();
            let now = Instant::now();
            for _ in 0..advances {
                engine.advance_turn(now);
                tick_n(&mut engine, ticks / 10);
            }
            engine.reset_all();
            prop_assert_eq!(engine.current_index(), 0);
            prop_assert!(engine.players().iter().all(|p| p.time == p.initial_time));
        }
    }
}
