//! Game Session
//!
//! Convenience driver for a control loop: owns the state and settings,
//! borrows a [`Clock`], and stamps every tick with the clock's time.

use crate::core::clock::Clock;
use crate::game::config::{ConfigError, GameSettings};
use crate::game::events::EventHooks;
use crate::game::state::{GameState, SensorState};
use crate::game::tick::{start, update, TickResult};

/// One game on one apparatus.
pub struct GameSession<'c, C: Clock + ?Sized> {
    clock: &'c C,
    settings: GameSettings,
    state: GameState,
}

impl<'c, C: Clock + ?Sized> GameSession<'c, C> {
    /// Create an unstarted session.
    pub fn new(clock: &'c C, settings: GameSettings) -> Self {
        Self {
            clock,
            settings,
            state: GameState::new(),
        }
    }

    /// Start (or restart) the game at the clock's current time.
    pub fn start(&mut self, hooks: &mut dyn EventHooks) -> Result<(), ConfigError> {
        start(&mut self.state, &self.settings, self.clock.now_ms(), hooks)
    }

    /// Run one tick with this tick's sensor reading.
    pub fn tick(&mut self, sensor: &SensorState, hooks: &mut dyn EventHooks) -> TickResult {
        update(&mut self.state, &self.settings, self.clock.now_ms(), sensor, hooks)
    }

    /// Swap settings for the next game and clear the current one.
    pub fn reconfigure(&mut self, settings: GameSettings) {
        self.settings = settings;
        self.state.reset();
    }

    /// Clear the game without starting a new one.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Read-only state for rendering.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Settings in effect.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }
}
