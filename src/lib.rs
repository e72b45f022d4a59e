//! # Capture Point Engine
//!
//! Rules engine for an arena capture-point target game.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CAPTURE POINT ENGINE                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Primitives                                │
//! │  └── clock.rs    - Clock trait, system and fake clocks       │
//! │                                                              │
//! │  game/           - Rules (pure, tick-driven)                 │
//! │  ├── config.rs   - Game modes and settings                   │
//! │  ├── state.rs    - Game state and sensor input               │
//! │  ├── events.rs   - Notification hooks                        │
//! │  ├── victory.rs  - Win/threshold arithmetic                  │
//! │  ├── decay.rs    - Capture and hit decay                     │
//! │  ├── ownership.rs- Capture state machine                     │
//! │  ├── modes.rs    - Per-mode policies                         │
//! │  ├── tick.rs     - Start and per-tick dispatch               │
//! │  └── session.rs  - Clock-driven driver                       │
//! │                                                              │
//! │  settings/       - Stored settings record shape              │
//! │  └── store.rs    - Versioned, checksummed slots              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tick Contract
//!
//! The caller owns [`GameState`] and [`GameSettings`] and calls
//! [`update`](game::tick::update) once per control-loop tick with the
//! current time and sensor reading. Hooks run inline and must not block.
//! `update` never panics: configuration problems and calls on a finished
//! game are logged and leave the state untouched.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod settings;

// Re-export commonly used types
pub use core::clock::{Clock, FakeClock, Millis, SystemClock};
pub use game::config::{ConfigError, GameMode, GameSettings};
pub use game::events::{EventHooks, EventLog, GameEvent, NoopHooks};
pub use game::session::GameSession;
pub use game::state::{GameState, GameStatus, HitObservation, SensorState, Team};
pub use game::tick::{start, update, TickResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nominal control-loop period in milliseconds
pub const TICK_PERIOD_MS: u64 = 50;
