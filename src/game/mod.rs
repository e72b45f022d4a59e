//! Game Logic Module
//!
//! The rules engine. No clock reads, no I/O: every function takes the time
//! it should act at.
//!
//! ## Module Structure
//!
//! - `config`: Game modes and per-game settings
//! - `state`: Teams, status, hit trackers, ownership, sensor input
//! - `events`: Notification hooks and the event log
//! - `victory`: Win/threshold comparisons
//! - `decay`: Capture-progress and raw-hit decay
//! - `ownership`: Capture state machine
//! - `modes`: Per-mode policies
//! - `tick`: Start and per-tick dispatch
//! - `session`: Clock-driven game driver

pub mod config;
pub mod state;
pub mod events;
pub mod victory;
pub mod decay;
pub mod ownership;
pub mod modes;
pub mod tick;
pub mod session;

// Re-export key types
pub use config::{ConfigError, GameMode, GameSettings};
pub use events::{EventHooks, EventLog, GameEvent, NoopHooks};
pub use session::GameSession;
pub use state::{GameState, GameStatus, HitObservation, SensorState, Team};
pub use tick::{start, update, TickResult};
