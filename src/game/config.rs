//! Game Configuration
//!
//! One immutable [`GameSettings`] record per game, selected by [`GameMode`].
//! The engine checks the record's shape when a game starts; semantic sanity
//! (e.g. `victory_margin < to_win`) is left to the menu/config layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// GAME MODE
// =============================================================================

/// Game variant. Fixed for the lifetime of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum GameMode {
    /// First side to `to_win` hits with a lead of `victory_margin`.
    FirstToHits = 0,
    /// Most hits when the clock runs out.
    MostHitsInTime = 1,
    /// First side to hold the point for `ownership_time_seconds`.
    FirstToOwnTime = 2,
    /// Blu attacks a Red-held point before time runs out.
    AttackDefend = 3,
    /// Longest ownership when the clock runs out. Not implemented.
    MostOwnInTime = 4,
    /// Free-running target tuning mode.
    TargetTest = 5,
}

impl GameMode {
    /// Number of modes (and settings slots).
    pub const COUNT: usize = 6;

    /// All modes in slot order.
    pub const ALL: [GameMode; Self::COUNT] = [
        GameMode::FirstToHits,
        GameMode::MostHitsInTime,
        GameMode::FirstToOwnTime,
        GameMode::AttackDefend,
        GameMode::MostOwnInTime,
        GameMode::TargetTest,
    ];

    /// Settings slot index for this mode.
    #[inline]
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Does this mode use the capture/ownership state machine?
    pub fn uses_capture(self) -> bool {
        matches!(self, GameMode::FirstToOwnTime | GameMode::AttackDefend)
    }

    /// Does this mode run against the game clock?
    pub fn is_timed(self) -> bool {
        !matches!(self, GameMode::TargetTest | GameMode::MostOwnInTime)
    }
}

// =============================================================================
// SETTINGS RECORDS
// =============================================================================

/// Timing windows, all in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedSettings {
    /// Regulation length of the game
    pub max_duration_seconds: u32,
    /// Extra time allowed after regulation
    pub max_overtime_seconds: u32,
    /// Ownership needed to win FirstToOwnTime
    pub ownership_time_seconds: u32,
    /// Pregame countdown length
    pub countdown_start_seconds: u32,
}

/// Hit-count thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitSettings {
    /// Hits needed before a side can win
    pub to_win: u32,
    /// Required lead over the other side
    pub victory_margin: u32,
}

/// Capture thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Capture progress needed to take the point
    pub hits_to_capture: u32,
    /// Seconds per decayed capture hit (<= 0 disables decay)
    pub capture_decay_rate_secs_per_hit: i32,
    /// Overtime granted by a capture
    pub capture_overtime_seconds: u32,
    /// Reserved, unused by the rules
    pub capture_cooldown_seconds: u32,
}

impl CaptureSettings {
    /// Decay interval in millis, or `None` when decay is disabled.
    pub fn decay_interval_ms(&self) -> Option<u64> {
        if self.capture_decay_rate_secs_per_hit <= 0 {
            None
        } else {
            Some(self.capture_decay_rate_secs_per_hit as u64 * 1000)
        }
    }
}

/// Physical sensor feeding a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorSide {
    /// Left target plate
    Left,
    /// Right target plate
    Right,
}

/// Sensor tuning, owned by the sensing collaborator.
///
/// The engine only reads `red_sensor`; the thresholds ride along so the whole
/// per-mode record is stored in one slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSettings {
    /// Which sensor reports Red's hits (the other reports Blu's)
    pub red_sensor: SensorSide,
    /// Raw trigger level for a candidate hit
    pub trigger_threshold: u32,
    /// Minimum classified energy for a hit
    pub hit_energy_threshold: u32,
}

impl Default for TargetSettings {
    fn default() -> Self {
        Self {
            red_sensor: SensorSide::Left,
            trigger_threshold: 400,
            hit_energy_threshold: 1200,
        }
    }
}

/// Complete configuration for one game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Game variant
    pub mode: GameMode,
    /// Timing windows
    pub timed: TimedSettings,
    /// Hit thresholds
    pub hits: HitSettings,
    /// Capture thresholds
    pub capture: CaptureSettings,
    /// Sensor tuning
    pub target: TargetSettings,
}

impl GameSettings {
    /// Factory defaults for a mode.
    pub fn for_mode(mode: GameMode) -> Self {
        let timed = TimedSettings {
            max_duration_seconds: 300,
            max_overtime_seconds: 60,
            ownership_time_seconds: 120,
            countdown_start_seconds: 5,
        };
        let hits = HitSettings {
            to_win: 20,
            victory_margin: 2,
        };
        let capture = CaptureSettings {
            hits_to_capture: 10,
            capture_decay_rate_secs_per_hit: 3,
            capture_overtime_seconds: 20,
            capture_cooldown_seconds: 0,
        };

        let (timed, hits) = match mode {
            GameMode::FirstToHits => (timed, HitSettings { to_win: 10, ..hits }),
            GameMode::MostHitsInTime => (
                TimedSettings {
                    max_duration_seconds: 120,
                    ..timed
                },
                HitSettings { to_win: 0, ..hits },
            ),
            GameMode::AttackDefend => (
                TimedSettings {
                    max_duration_seconds: 180,
                    ..timed
                },
                hits,
            ),
            GameMode::TargetTest => (
                TimedSettings {
                    countdown_start_seconds: 0,
                    ..timed
                },
                HitSettings {
                    to_win: 0,
                    victory_margin: 50,
                },
            ),
            GameMode::FirstToOwnTime | GameMode::MostOwnInTime => (timed, hits),
        };

        Self {
            mode,
            timed,
            hits,
            capture,
            target: TargetSettings::default(),
        }
    }

    /// Check that the record has the shape its mode needs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mode.is_timed() && self.timed.max_duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration(self.mode));
        }
        if self.mode == GameMode::FirstToHits && self.hits.to_win == 0 {
            return Err(ConfigError::ZeroHitsToWin);
        }
        if self.mode.uses_capture() && self.capture.hits_to_capture == 0 {
            return Err(ConfigError::ZeroHitsToCapture(self.mode));
        }
        if self.mode == GameMode::FirstToOwnTime && self.timed.ownership_time_seconds == 0 {
            return Err(ConfigError::ZeroOwnershipTime);
        }
        Ok(())
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self::for_mode(GameMode::FirstToHits)
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Settings rejected at game start, or a mode mix-up mid-game.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Timed mode without a game length
    #[error("{0:?} needs max_duration_seconds > 0")]
    ZeroDuration(GameMode),

    /// FirstToHits can never be won
    #[error("FirstToHits needs hits.to_win > 0")]
    ZeroHitsToWin,

    /// Capture mode that captures instantly
    #[error("{0:?} needs capture.hits_to_capture > 0")]
    ZeroHitsToCapture(GameMode),

    /// FirstToOwnTime that is won instantly
    #[error("FirstToOwnTime needs timed.ownership_time_seconds > 0")]
    ZeroOwnershipTime,

    /// `update` called before `start`
    #[error("no game mode selected")]
    NoModeSelected,

    /// Settings swapped mid-game
    #[error("game started as {started:?} but settings say {given:?}")]
    ModeMismatch {
        /// Mode recorded at start
        started: GameMode,
        /// Mode in the settings passed to update
        given: GameMode,
    },
}
