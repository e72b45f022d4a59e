//! Authoritative Game Tick
//!
//! `start` arms a game; `update` advances it by one tick. Per tick:
//!
//! 1. Advance the game clock (`update_time`), firing `remaining_secs`.
//! 2. Run the mode policy (skipped during the countdown).
//! 3. Store `now` as `last_update_millis`.
//!
//! Step 3 must come last: the policies measure ownership and decay deltas
//! against the previous tick's timestamp.

use tracing::{debug, info, warn};

use crate::core::clock::Millis;
use crate::game::config::{ConfigError, GameMode, GameSettings};
use crate::game::events::EventHooks;
use crate::game::modes::{
    update_attack_defend, update_first_to_hits, update_first_to_own_time,
    update_most_hits_in_time, update_most_own_in_time, update_target_test,
};
use crate::game::state::{GameResult, GameState, GameStatus, HitTracker, SensorState, Team};

/// Result of a tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickResult {
    /// Whether the game ended this tick
    pub game_ended: bool,
    /// Winner (if the game ended this tick)
    pub winner: Option<Team>,
}

/// Arm a fresh game at `now`.
///
/// Rejects settings with the wrong shape for their mode, leaving `state`
/// untouched. On success the game is in Pregame and `started(Pregame)` has
/// fired.
pub fn start(
    state: &mut GameState,
    settings: &GameSettings,
    now: Millis,
    hooks: &mut dyn EventHooks,
) -> Result<(), ConfigError> {
    settings.validate()?;

    state.reset();
    state.mode = Some(settings.mode);
    state.status = GameStatus::Pregame;

    let countdown = settings.timed.countdown_start_seconds as i64;
    state.time.start_time_millis = now;
    state.time.last_update_millis = now;
    state.time.elapsed_secs = -countdown;
    state.time.remaining_secs = countdown;

    state.red_hits = HitTracker::starting_at(now);
    state.blu_hits = HitTracker::starting_at(now);
    state.ownership.last_hit_millis = now;
    state.ownership.last_decay_millis = now;

    if settings.mode == GameMode::AttackDefend {
        state.ownership.owner = Team::Red;
        state.ownership.capturing = Team::Blu;
    }

    info!(
        "Starting {:?}: {}s countdown, {}s regulation",
        settings.mode, settings.timed.countdown_start_seconds, settings.timed.max_duration_seconds
    );
    hooks.started(GameStatus::Pregame);
    Ok(())
}

/// Advance the game by one tick.
///
/// Never panics. A game that has ended, was never started, or is being fed
/// settings for a different mode is left untouched.
pub fn update(
    state: &mut GameState,
    settings: &GameSettings,
    now: Millis,
    sensor: &SensorState,
    hooks: &mut dyn EventHooks,
) -> TickResult {
    let mut result = TickResult::default();

    if state.is_ended() {
        debug!("Update on ended game ignored");
        return result;
    }

    let mode = match selected_mode(state, settings) {
        Ok(mode) => mode,
        Err(err) => {
            warn!("Tick skipped: {}", err);
            return result;
        }
    };

    update_time(state, settings, now, hooks);

    if sensor.any_hit() {
        state.last_observed_hit = *sensor;
    }

    #[cfg(feature = "debug-tracing")]
    tracing::trace!(
        "tick {} status={:?} red={} blu={} owner={:?} capture={}",
        now,
        state.status,
        state.red_hits.hits,
        state.blu_hits.hits,
        state.ownership.owner,
        state.ownership.capture_hits
    );

    if state.status != GameStatus::Pregame {
        match mode {
            GameMode::FirstToHits => update_first_to_hits(state, settings, sensor, now, hooks),
            GameMode::MostHitsInTime => {
                update_most_hits_in_time(state, settings, sensor, now, hooks)
            }
            GameMode::FirstToOwnTime => {
                update_first_to_own_time(state, settings, sensor, now, hooks)
            }
            GameMode::AttackDefend => update_attack_defend(state, settings, sensor, now, hooks),
            GameMode::MostOwnInTime => update_most_own_in_time(state, hooks),
            GameMode::TargetTest => update_target_test(state, settings, sensor, now, hooks),
        }
    }

    state.time.last_update_millis = now;

    if state.is_ended() {
        result.game_ended = true;
        result.winner = state.winner();
    }
    result
}

/// Mode this tick should run, or why it cannot run.
fn selected_mode(state: &GameState, settings: &GameSettings) -> Result<GameMode, ConfigError> {
    let started = state.mode.ok_or(ConfigError::NoModeSelected)?;
    if started != settings.mode {
        return Err(ConfigError::ModeMismatch {
            started,
            given: settings.mode,
        });
    }
    Ok(started)
}

/// Advance the game clock and handle the countdown → running transition.
pub fn update_time(
    state: &mut GameState,
    settings: &GameSettings,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    let timed = &settings.timed;
    let since_start = (now.saturating_sub(state.time.start_time_millis) / 1000) as i64;
    let elapsed = since_start - timed.countdown_start_seconds as i64;
    state.time.elapsed_secs = elapsed;

    if elapsed < 0 && state.status == GameStatus::Pregame {
        state.time.remaining_secs = -elapsed;
    } else {
        if state.status == GameStatus::Pregame {
            state.status = GameStatus::Running;
            info!("Countdown finished, game running");
            hooks.started(GameStatus::Running);
        }

        let elapsed = elapsed.max(0);
        let duration = timed.max_duration_seconds as i64;
        let overtime = timed.max_overtime_seconds as i64;
        state.time.remaining_secs = (duration - elapsed).max(0);
        state.time.time_expired = elapsed > duration;
        state.time.overtime_expired = elapsed > duration + overtime;
    }

    hooks.remaining_secs(state.time.remaining_secs, state.status);
}

/// Finish the game. The result is written once; later calls are ignored.
pub fn end_game(state: &mut GameState, winner: Team, hooks: &mut dyn EventHooks) {
    if state.is_ended() {
        return;
    }
    state.status = GameStatus::Ended;
    state.result = Some(GameResult { winner });

    info!("Game ended, winner: {:?}", winner);
    hooks.ended(winner);
}

/// Move into overtime, notifying only on entry.
pub fn enter_overtime(state: &mut GameState, hooks: &mut dyn EventHooks) {
    if state.status == GameStatus::Overtime {
        return;
    }
    state.status = GameStatus::Overtime;

    info!("Overtime");
    hooks.overtime();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::events::{EventLog, GameEvent, NoopHooks};
    use crate::game::state::HitObservation;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const T0: Millis = 1_000;

    fn first_to_hits() -> GameSettings {
        let mut settings = GameSettings::for_mode(GameMode::FirstToHits);
        settings.hits.to_win = 10;
        settings.hits.victory_margin = 2;
        settings.timed.max_duration_seconds = 60;
        settings.timed.max_overtime_seconds = 30;
        settings.timed.countdown_start_seconds = 0;
        settings
    }

    fn attack_defend() -> GameSettings {
        let mut settings = GameSettings::for_mode(GameMode::AttackDefend);
        settings.capture.hits_to_capture = 10;
        settings.timed.max_duration_seconds = 60;
        settings.timed.max_overtime_seconds = 30;
        settings.timed.countdown_start_seconds = 0;
        settings
    }

    fn started(settings: &GameSettings) -> GameState {
        let mut state = GameState::new();
        start(&mut state, settings, T0, &mut NoopHooks).unwrap();
        state
    }

    fn idle_tick(state: &mut GameState, settings: &GameSettings, now: Millis) -> TickResult {
        update(state, settings, now, &SensorState::IDLE, &mut NoopHooks)
    }

    fn blu_hit(settings: &GameSettings) -> SensorState {
        SensorState::from_teams(
            HitObservation::default(),
            HitObservation::hit(3.0),
            settings.target.red_sensor,
        )
    }

    // =========================================================================
    // FirstToHits scenarios
    // =========================================================================

    #[test]
    fn test_first_to_hits_margin_win() {
        let settings = first_to_hits();
        let mut state = started(&settings);
        state.red_hits.hits = 10;
        state.blu_hits.hits = 8;

        let result = idle_tick(&mut state, &settings, T0 + 5_000);

        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winner(), Some(Team::Red));
        assert_eq!(result, TickResult { game_ended: true, winner: Some(Team::Red) });
    }

    #[test]
    fn test_first_to_hits_overtime_then_blu_wins() {
        let settings = first_to_hits();
        let mut state = started(&settings);
        state.red_hits.hits = 10;
        state.blu_hits.hits = 10;
        let mut log = EventLog::without_clock();

        // Blu reaches 11: past to_win but only one clear.
        update(&mut state, &settings, T0 + 5_000, &blu_hit(&settings), &mut log);
        assert_eq!(state.blu_hits.hits, 11);
        assert_eq!(state.status, GameStatus::Overtime);
        assert!(state.result.is_none());

        update(&mut state, &settings, T0 + 5_100, &blu_hit(&settings), &mut log);
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winner(), Some(Team::Blu));

        assert_eq!(
            log.events(),
            &[
                GameEvent::Started { status: GameStatus::Running },
                GameEvent::Overtime,
                GameEvent::Ended { winner: Team::Blu },
            ]
        );
    }

    #[test]
    fn test_first_to_hits_tie_after_overtime() {
        let settings = first_to_hits();
        let mut state = started(&settings);
        state.red_hits.hits = 11;
        state.blu_hits.hits = 11;

        idle_tick(&mut state, &settings, T0 + 91_000);

        assert!(state.time.time_expired);
        assert!(state.time.overtime_expired);
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winner(), Some(Team::Tie));
    }

    // =========================================================================
    // AttackDefend scenarios
    // =========================================================================

    #[test]
    fn test_attack_defend_full_capture_wins_for_blu() {
        let mut settings = attack_defend();
        settings.capture.capture_decay_rate_secs_per_hit = 0;

        for now in [T0 + 5_000, T0 + 61_000, T0 + 95_000] {
            let mut state = started(&settings);
            state.ownership.capture_hits = 10;

            idle_tick(&mut state, &settings, now);
            assert_eq!(state.winner(), Some(Team::Blu), "at {now}");
        }
    }

    #[test]
    fn test_attack_defend_decay_runs_before_capture_check() {
        let settings = attack_defend();
        assert_eq!(settings.capture.capture_decay_rate_secs_per_hit, 3);

        // Inside the decay window the finishing hit wins at once.
        let mut state = started(&settings);
        state.ownership.capture_hits = 9;
        update(&mut state, &settings, T0 + 2_000, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.winner(), Some(Team::Blu));

        // A due decay step lands first, so the same hit falls one short.
        let mut state = started(&settings);
        state.ownership.capture_hits = 9;
        update(&mut state, &settings, T0 + 5_000, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.ownership.capture_hits, 9);
        assert_eq!(state.status, GameStatus::Running);

        update(&mut state, &settings, T0 + 5_050, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.winner(), Some(Team::Blu));
    }

    #[test]
    fn test_attack_defend_restarted_attempt_keeps_first_hit() {
        let settings = attack_defend();
        let mut state = started(&settings);

        update(&mut state, &settings, T0 + 1_000, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.ownership.capture_hits, 1);

        // Idle past the decay window: the attempt decays away.
        idle_tick(&mut state, &settings, T0 + 4_050);
        assert_eq!(state.ownership.capture_hits, 0);
        assert_eq!(state.ownership.capturing, Team::Nobody);

        update(&mut state, &settings, T0 + 20_000, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.ownership.capturing, Team::Blu);
        assert_eq!(state.ownership.capture_hits, 1);

        idle_tick(&mut state, &settings, T0 + 20_050);
        assert_eq!(state.ownership.capturing, Team::Blu);
        assert_eq!(state.ownership.capture_hits, 1);
    }

    #[test]
    fn test_attack_defend_timeout_goes_to_red() {
        let settings = attack_defend();
        let mut state = started(&settings);
        state.ownership.capture_hits = 9;

        idle_tick(&mut state, &settings, T0 + 95_000);

        assert!(state.time.time_expired);
        assert!(state.time.overtime_expired);
        assert_eq!(state.status, GameStatus::Ended);
        assert_eq!(state.winner(), Some(Team::Red));
    }

    #[test]
    fn test_attack_defend_start_assigns_roles() {
        let settings = attack_defend();
        let state = started(&settings);
        assert_eq!(state.ownership.owner, Team::Red);
        assert_eq!(state.ownership.capturing, Team::Blu);
    }

    // =========================================================================
    // Clock and lifecycle
    // =========================================================================

    #[test]
    fn test_started_running_fires_once() {
        let mut settings = first_to_hits();
        settings.timed.countdown_start_seconds = 3;
        let mut state = GameState::new();
        let mut log = EventLog::new();
        start(&mut state, &settings, T0, &mut log).unwrap();

        for step in 1..=100 {
            update(&mut state, &settings, T0 + step * 100, &SensorState::IDLE, &mut log);
        }

        let running = log.count(|e| *e == GameEvent::Started { status: GameStatus::Running });
        let pregame = log.count(|e| *e == GameEvent::Started { status: GameStatus::Pregame });
        assert_eq!(running, 1);
        assert_eq!(pregame, 1);
        assert_eq!(log.count(GameEvent::is_clock), 100);
        assert_eq!(state.status, GameStatus::Running);
    }

    #[test]
    fn test_countdown_readout() {
        let mut settings = first_to_hits();
        settings.timed.countdown_start_seconds = 5;
        let mut state = started(&settings);
        assert_eq!(state.time.remaining_secs, 5);

        idle_tick(&mut state, &settings, T0 + 1_500);
        assert_eq!(state.status, GameStatus::Pregame);
        assert_eq!(state.time.elapsed_secs, -4);
        assert_eq!(state.time.remaining_secs, 4);

        idle_tick(&mut state, &settings, T0 + 5_000);
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.time.elapsed_secs, 0);
        assert_eq!(state.time.remaining_secs, 60);

        idle_tick(&mut state, &settings, T0 + 25_000);
        assert_eq!(state.time.remaining_secs, 40);
    }

    #[test]
    fn test_expiry_flags_are_strict() {
        let settings = first_to_hits();
        let mut state = started(&settings);

        idle_tick(&mut state, &settings, T0 + 60_999);
        assert!(!state.time.time_expired);
        assert_eq!(state.time.remaining_secs, 0);

        state.red_hits.hits = 10;
        state.blu_hits.hits = 9;
        idle_tick(&mut state, &settings, T0 + 61_000);
        assert!(state.time.time_expired);
        assert!(!state.time.overtime_expired);
        assert_eq!(state.status, GameStatus::Overtime);

        idle_tick(&mut state, &settings, T0 + 90_999);
        assert!(!state.time.overtime_expired);

        idle_tick(&mut state, &settings, T0 + 91_000);
        assert!(state.time.overtime_expired);
        assert_eq!(state.winner(), Some(Team::Red));
    }

    #[test]
    fn test_pregame_ignores_hits() {
        let mut settings = first_to_hits();
        settings.timed.countdown_start_seconds = 5;
        let mut state = started(&settings);

        update(&mut state, &settings, T0 + 1_000, &blu_hit(&settings), &mut NoopHooks);
        assert_eq!(state.blu_hits.hits, 0);
        assert!(state.last_observed_hit.any_hit());
        assert_eq!(state.time.last_update_millis, T0 + 1_000);
    }

    #[test]
    fn test_ended_is_absorbing() {
        let settings = first_to_hits();
        let mut state = started(&settings);
        state.red_hits.hits = 12;
        idle_tick(&mut state, &settings, T0 + 1_000);
        assert_eq!(state.winner(), Some(Team::Red));

        let frozen = state.clone();
        let mut log = EventLog::new();
        let result = update(&mut state, &settings, T0 + 200_000, &blu_hit(&settings), &mut log);

        assert_eq!(state, frozen);
        assert!(log.events().is_empty());
        assert!(!result.game_ended);
    }

    #[test]
    fn test_update_before_start_is_ignored() {
        let settings = first_to_hits();
        let mut state = GameState::new();
        let mut log = EventLog::new();

        update(&mut state, &settings, T0, &blu_hit(&settings), &mut log);
        assert_eq!(state, GameState::new());
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_mode_mismatch_is_ignored() {
        let settings = first_to_hits();
        let mut state = started(&settings);
        let before = state.clone();

        let other = GameSettings::for_mode(GameMode::TargetTest);
        idle_tick(&mut state, &other, T0 + 1_000);
        assert_eq!(state, before);
    }

    #[test]
    fn test_start_rejects_bad_settings() {
        let mut settings = attack_defend();
        settings.capture.hits_to_capture = 0;
        let mut state = GameState::new();
        let mut log = EventLog::new();

        let err = start(&mut state, &settings, T0, &mut log).unwrap_err();
        assert_eq!(err, ConfigError::ZeroHitsToCapture(GameMode::AttackDefend));
        assert_eq!(state, GameState::new());
        assert!(log.events().is_empty());
    }

    #[test]
    fn test_clock_regression_does_not_wrap() {
        let settings = GameSettings::for_mode(GameMode::FirstToOwnTime);
        let mut state = started(&settings);
        state.ownership.owner = Team::Red;
        state.ownership.capturing = Team::Blu;

        idle_tick(&mut state, &settings, T0 + 10_000);
        let banked = state.ownership.red_millis;

        idle_tick(&mut state, &settings, T0 + 2_000);
        assert_eq!(state.ownership.red_millis, banked);
        assert!(state.time.remaining_secs <= settings.timed.max_duration_seconds as i64);
    }

    #[test]
    fn test_most_own_in_time_ends_on_first_running_tick() {
        let mut settings = GameSettings::for_mode(GameMode::MostOwnInTime);
        settings.timed.countdown_start_seconds = 1;
        let mut state = started(&settings);

        idle_tick(&mut state, &settings, T0 + 500);
        assert_eq!(state.status, GameStatus::Pregame);

        let result = idle_tick(&mut state, &settings, T0 + 1_000);
        assert_eq!(result.winner, Some(Team::Nobody));
    }

    // =========================================================================
    // FirstToOwnTime capture regression
    // =========================================================================

    #[test]
    fn test_recapture_forces_one_tick_of_overtime() {
        let mut settings = GameSettings::for_mode(GameMode::FirstToOwnTime);
        settings.timed.countdown_start_seconds = 0;
        settings.capture.hits_to_capture = 2;
        settings.capture.capture_overtime_seconds = 20;
        let red_sensor = settings.target.red_sensor;
        let mut state = started(&settings);
        let mut log = EventLog::without_clock();

        let red_hit = SensorState::from_teams(HitObservation::hit(1.0), HitObservation::default(), red_sensor);
        update(&mut state, &settings, T0 + 100, &red_hit, &mut log);
        assert_eq!(state.ownership.owner, Team::Nobody);
        update(&mut state, &settings, T0 + 200, &red_hit, &mut log);
        assert_eq!(state.ownership.owner, Team::Red);
        assert_eq!(state.status, GameStatus::Running, "first capture is not overtime");

        update(&mut state, &settings, T0 + 300, &blu_hit(&settings), &mut log);
        assert_eq!(state.ownership.capture_hits, 1);
        update(&mut state, &settings, T0 + 400, &blu_hit(&settings), &mut log);

        assert_eq!(state.ownership.owner, Team::Blu);
        assert_eq!(state.status, GameStatus::Overtime);
        assert_eq!(state.ownership.overtime_remaining_millis, 20);
        assert_eq!(state.ownership.red_millis, 200);

        update(&mut state, &settings, T0 + 500, &SensorState::IDLE, &mut log);
        assert_eq!(state.status, GameStatus::Running);
        assert_eq!(state.ownership.blu_millis, 100);

        assert_eq!(
            log.events(),
            &[
                GameEvent::Started { status: GameStatus::Running },
                GameEvent::Captured { team: Team::Red },
                GameEvent::Overtime,
                GameEvent::Captured { team: Team::Blu },
            ]
        );
    }

    // =========================================================================
    // Randomized soak
    // =========================================================================

    #[test]
    fn test_random_games_hold_invariants() {
        let modes = [
            GameMode::FirstToHits,
            GameMode::MostHitsInTime,
            GameMode::FirstToOwnTime,
            GameMode::AttackDefend,
            GameMode::TargetTest,
        ];
        let mut rng = StdRng::seed_from_u64(0x5EED);

        for game in 0..40 {
            let mode = modes[game % modes.len()];
            let mut settings = GameSettings::for_mode(mode);
            settings.timed.max_duration_seconds = 30;
            settings.timed.max_overtime_seconds = 10;
            settings.timed.countdown_start_seconds = 2;

            let mut state = GameState::new();
            let mut log = EventLog::without_clock();
            start(&mut state, &settings, 0, &mut log).unwrap();

            let mut ended_with: Option<Team> = None;
            for step in 1..=500u64 {
                let obs = |hit: bool| HitObservation {
                    was_hit: hit,
                    hit_count: 1,
                    energy: 1.0,
                };
                let sensor = SensorState {
                    left_hit: obs(rng.gen_bool(0.15)),
                    right_hit: obs(rng.gen_bool(0.15)),
                };
                update(&mut state, &settings, step * 100, &sensor, &mut log);

                assert!(state.ownership.capture_hits <= settings.capture.hits_to_capture);
                assert_eq!(state.result.is_some(), state.is_ended());
                if let Some(winner) = ended_with {
                    assert_eq!(state.winner(), Some(winner), "result is written once");
                }
                ended_with = state.winner();
            }

            if mode != GameMode::TargetTest {
                assert!(state.is_ended(), "{mode:?} must finish once overtime runs out");
            }
            assert!(log.count(|e| matches!(e, GameEvent::Ended { .. })) <= 1);
        }
    }
}
