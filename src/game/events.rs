//! Game Events
//!
//! Notification hooks called synchronously during `start`/`update`.
//! Sound, LED and display layers implement [`EventHooks`]; anything that
//! prefers to drain a queue after the tick can use [`EventLog`].
//!
//! Hooks must be cheap and must never block: they run inside the control
//! loop's tick.

use serde::{Deserialize, Serialize};

use crate::game::state::{GameStatus, Team};

/// Callbacks for game transitions. Every method defaults to a no-op.
pub trait EventHooks {
    /// Game entered Pregame (at start) or Running (countdown finished).
    fn started(&mut self, _status: GameStatus) {}

    /// Game ended with the given winner.
    fn ended(&mut self, _winner: Team) {}

    /// Game entered overtime.
    fn overtime(&mut self) {}

    /// A side took the point.
    fn captured(&mut self, _team: Team) {}

    /// The owner hit the point during an enemy capture attempt.
    fn contested(&mut self) {}

    /// Called every tick with the clock readout.
    fn remaining_secs(&mut self, _secs: i64, _status: GameStatus) {}
}

/// Hooks that ignore everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHooks;

impl EventHooks for NoopHooks {}

// =============================================================================
// EVENT LOG
// =============================================================================

/// One hook invocation as data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// `started` hook
    Started {
        /// Status the game started into
        status: GameStatus,
    },
    /// `ended` hook
    Ended {
        /// Final winner
        winner: Team,
    },
    /// `overtime` hook
    Overtime,
    /// `captured` hook
    Captured {
        /// New owner of the point
        team: Team,
    },
    /// `contested` hook
    Contested,
    /// `remaining_secs` hook
    RemainingSecs {
        /// Seconds left in the current phase
        secs: i64,
        /// Status at the readout
        status: GameStatus,
    },
}

impl GameEvent {
    /// Is this the per-tick clock readout?
    #[inline]
    pub fn is_clock(&self) -> bool {
        matches!(self, GameEvent::RemainingSecs { .. })
    }
}

/// Hooks that record every call as a [`GameEvent`].
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<GameEvent>,
    skip_clock: bool,
}

impl EventLog {
    /// Record every hook call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record everything except the per-tick `remaining_secs` readout.
    pub fn without_clock() -> Self {
        Self {
            events: Vec::new(),
            skip_clock: true,
        }
    }

    /// Events recorded so far.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take recorded events (consumes them).
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Count recorded events matching a predicate.
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

impl EventHooks for EventLog {
    fn started(&mut self, status: GameStatus) {
        self.push(GameEvent::Started { status });
    }

    fn ended(&mut self, winner: Team) {
        self.push(GameEvent::Ended { winner });
    }

    fn overtime(&mut self) {
        self.push(GameEvent::Overtime);
    }

    fn captured(&mut self, team: Team) {
        self.push(GameEvent::Captured { team });
    }

    fn contested(&mut self) {
        self.push(GameEvent::Contested);
    }

    fn remaining_secs(&mut self, secs: i64, status: GameStatus) {
        if !self.skip_clock {
            self.push(GameEvent::RemainingSecs { secs, status });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_records_in_order() {
        let mut log = EventLog::new();
        let hooks: &mut dyn EventHooks = &mut log;

        hooks.started(GameStatus::Running);
        hooks.remaining_secs(30, GameStatus::Running);
        hooks.captured(Team::Red);
        hooks.ended(Team::Red);

        assert_eq!(
            log.events(),
            &[
                GameEvent::Started { status: GameStatus::Running },
                GameEvent::RemainingSecs { secs: 30, status: GameStatus::Running },
                GameEvent::Captured { team: Team::Red },
                GameEvent::Ended { winner: Team::Red },
            ]
        );
    }

    #[test]
    fn test_event_log_without_clock() {
        let mut log = EventLog::without_clock();
        log.remaining_secs(12, GameStatus::Pregame);
        log.overtime();
        log.contested();

        assert_eq!(log.events(), &[GameEvent::Overtime, GameEvent::Contested]);
        assert_eq!(log.count(GameEvent::is_clock), 0);

        let taken = log.take_events();
        assert_eq!(taken.len(), 2);
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_noop_hooks_accept_everything() {
        let mut hooks = NoopHooks;
        hooks.started(GameStatus::Pregame);
        hooks.ended(Team::Tie);
        hooks.remaining_secs(-1, GameStatus::Ended);
    }

    #[test]
    fn test_event_serde_tagged() {
        let event = GameEvent::Captured { team: Team::Blu };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"captured","team":"Blu"}"#);

        let back: GameEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
