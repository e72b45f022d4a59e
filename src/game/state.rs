//! Game State Definitions
//!
//! The mutable record the dispatcher rewrites every tick, plus the per-tick
//! sensor input. Everything here is plain data: cloneable, serializable, and
//! free of references to the clock or the event hooks.

use serde::{Deserialize, Serialize};

use crate::core::clock::Millis;
use crate::game::config::{GameMode, SensorSide};

// =============================================================================
// TEAM
// =============================================================================

/// A side, or one of the "no single side" sentinels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum Team {
    /// Red team (defender in AttackDefend)
    Red,
    /// Blu team (attacker in AttackDefend)
    Blu,
    /// No side
    #[default]
    Nobody,
    /// Both sides
    All,
    /// Drawn result (terminal only)
    Tie,
}

impl Team {
    /// The other side. Sentinels have no opposite.
    pub fn opposite(self) -> Team {
        match self {
            Team::Red => Team::Blu,
            Team::Blu => Team::Red,
            _ => Team::Nobody,
        }
    }

    /// Is this Red or Blu?
    #[inline]
    pub fn is_side(self) -> bool {
        matches!(self, Team::Red | Team::Blu)
    }
}

// =============================================================================
// STATUS / RESULT
// =============================================================================

/// Lifecycle of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum GameStatus {
    /// Countdown before the scored clock starts
    #[default]
    Pregame,
    /// Regulation play
    Running,
    /// Extension period
    Overtime,
    /// Finished (absorbing)
    Ended,
}

/// Final outcome, written once when the game ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Winning side, `Tie`, or `Nobody`
    pub winner: Team,
}

// =============================================================================
// TIME
// =============================================================================

/// Game clock as seen by the rules.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameTime {
    /// When `start` was called
    pub start_time_millis: Millis,
    /// Timestamp of the previous tick
    pub last_update_millis: Millis,
    /// Seconds since the countdown finished (negative during countdown)
    pub elapsed_secs: i64,
    /// Countdown seconds in Pregame, regulation seconds left afterwards
    pub remaining_secs: i64,
    /// Regulation is over
    pub time_expired: bool,
    /// Regulation plus overtime is over
    pub overtime_expired: bool,
}

// =============================================================================
// HIT TRACKING
// =============================================================================

/// Raw hit count for one side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitTracker {
    /// Hits landed (only TargetTest decay lowers this)
    pub hits: u32,
    /// Time of the latest hit
    pub last_hit_millis: Millis,
    /// Time of the latest TargetTest decay step
    pub last_decay_millis: Millis,
    /// Energy of the latest hit, diagnostic only
    pub last_hit_energy: f64,
}

impl HitTracker {
    /// Tracker with all timestamps at `now`.
    pub fn starting_at(now: Millis) -> Self {
        Self {
            hits: 0,
            last_hit_millis: now,
            last_decay_millis: now,
            last_hit_energy: 0.0,
        }
    }

    /// Record `count` hits.
    pub fn record(&mut self, count: u32, energy: f64, now: Millis) {
        self.hits = self.hits.saturating_add(count);
        self.last_hit_millis = now;
        self.last_hit_energy = energy;
    }
}

// =============================================================================
// OWNERSHIP
// =============================================================================

/// Point control record for the capture modes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownership {
    /// Side holding the point
    pub owner: Team,
    /// Side currently accruing capture progress
    pub capturing: Team,
    /// Capture progress, 0 to `hits_to_capture`
    pub capture_hits: u32,
    /// Total time Blu has held the point
    pub blu_millis: Millis,
    /// Total time Red has held the point
    pub red_millis: Millis,
    /// Set by a capture-triggered overtime; counts down by tick deltas
    pub overtime_remaining_millis: Millis,
    /// Time of the latest capture hit
    pub last_hit_millis: Millis,
    /// Time of the latest capture decay step
    pub last_decay_millis: Millis,
}

impl Ownership {
    /// Accumulated ownership time for a side.
    pub fn millis_for(&self, team: Team) -> Millis {
        match team {
            Team::Red => self.red_millis,
            Team::Blu => self.blu_millis,
            _ => 0,
        }
    }

    /// Is a capture attempt currently underway?
    #[inline]
    pub fn is_capture_active(&self) -> bool {
        self.capturing.is_side()
    }
}

// =============================================================================
// SENSOR INPUT
// =============================================================================

/// One sensor's classification result for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HitObservation {
    /// A hit was classified this tick
    pub was_hit: bool,
    /// Number of hits classified
    pub hit_count: u32,
    /// Classifier energy, diagnostic only
    pub energy: f64,
}

impl HitObservation {
    /// A single hit with the given energy.
    pub fn hit(energy: f64) -> Self {
        Self {
            was_hit: true,
            hit_count: 1,
            energy,
        }
    }

    /// Hits this observation scores. A flagged hit with a zero count is one hit.
    #[inline]
    pub fn scored_hits(&self) -> u32 {
        if self.was_hit {
            self.hit_count.max(1)
        } else {
            0
        }
    }
}

/// Both sensors' results for a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorState {
    /// Left target plate
    pub left_hit: HitObservation,
    /// Right target plate
    pub right_hit: HitObservation,
}

impl SensorState {
    /// No hits on either side.
    pub const IDLE: SensorState = SensorState {
        left_hit: HitObservation {
            was_hit: false,
            hit_count: 0,
            energy: 0.0,
        },
        right_hit: HitObservation {
            was_hit: false,
            hit_count: 0,
            energy: 0.0,
        },
    };

    /// Build a sensor reading from per-team observations.
    pub fn from_teams(red: HitObservation, blu: HitObservation, red_sensor: SensorSide) -> Self {
        match red_sensor {
            SensorSide::Left => Self {
                left_hit: red,
                right_hit: blu,
            },
            SensorSide::Right => Self {
                left_hit: blu,
                right_hit: red,
            },
        }
    }

    /// Observation for a side under the given mapping.
    pub fn for_team(&self, team: Team, red_sensor: SensorSide) -> HitObservation {
        let red_is_left = red_sensor == SensorSide::Left;
        match team {
            Team::Red if red_is_left => self.left_hit,
            Team::Red => self.right_hit,
            Team::Blu if red_is_left => self.right_hit,
            Team::Blu => self.left_hit,
            _ => HitObservation::default(),
        }
    }

    /// Did either sensor report a hit?
    pub fn any_hit(&self) -> bool {
        self.left_hit.was_hit || self.right_hit.was_hit
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete mutable state of a game.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Mode chosen at `start` (None until then)
    pub mode: Option<GameMode>,
    /// Lifecycle status
    pub status: GameStatus,
    /// Outcome, set once when status becomes Ended
    pub result: Option<GameResult>,
    /// Clock state
    pub time: GameTime,
    /// Red raw hits
    pub red_hits: HitTracker,
    /// Blu raw hits
    pub blu_hits: HitTracker,
    /// Point control
    pub ownership: Ownership,
    /// Latest sensor reading that contained a hit
    pub last_observed_hit: SensorState,
}

impl GameState {
    /// Fresh, unstarted state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard everything and go back to the unstarted state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Hit tracker for a side.
    pub fn hits(&self, team: Team) -> Option<&HitTracker> {
        match team {
            Team::Red => Some(&self.red_hits),
            Team::Blu => Some(&self.blu_hits),
            _ => None,
        }
    }

    /// Mutable hit tracker for a side.
    pub fn hits_mut(&mut self, team: Team) -> Option<&mut HitTracker> {
        match team {
            Team::Red => Some(&mut self.red_hits),
            Team::Blu => Some(&mut self.blu_hits),
            _ => None,
        }
    }

    /// Has the game finished?
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.status == GameStatus::Ended
    }

    /// Winner, once the game has ended.
    pub fn winner(&self) -> Option<Team> {
        self.result.map(|r| r.winner)
    }
}

// =============================================================================
// TESTS
// =============================================================================
