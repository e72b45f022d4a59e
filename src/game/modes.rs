//! Mode Policies
//!
//! One update function per [`GameMode`](crate::game::config::GameMode). Each
//! runs after the clock has been advanced for the tick and before
//! `last_update_millis` is stored, so every delta computed here is measured
//! from the previous tick.

use tracing::warn;

use crate::core::clock::Millis;
use crate::game::config::GameSettings;
use crate::game::decay::{decay_capture, decay_hits};
use crate::game::events::EventHooks;
use crate::game::ownership::{accrue_ownership, apply_capture_hits, update_ownership};
use crate::game::state::{GameState, GameStatus, SensorState, Team};
use crate::game::tick::{end_game, enter_overtime};
use crate::game::victory::{
    winner_by_margin, winner_by_most, winner_by_threshold, within_margin,
};

/// Score raw hits for the hit-count modes.
pub fn apply_hits(state: &mut GameState, settings: &GameSettings, sensor: &SensorState, now: Millis) {
    for team in [Team::Red, Team::Blu] {
        let observation = sensor.for_team(team, settings.target.red_sensor);
        let count = observation.scored_hits();
        if count == 0 {
            continue;
        }
        if let Some(tracker) = state.hits_mut(team) {
            tracker.record(count, observation.energy, now);
        }
    }
}

/// First to `to_win` with a `victory_margin` lead.
///
/// Reaching `to_win` without the lead sends the game to overtime. Running out
/// of time (or overtime) ends it on most hits.
pub fn update_first_to_hits(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    apply_hits(state, settings, sensor, now);

    let red = state.red_hits.hits;
    let blu = state.blu_hits.hits;
    let to_win = settings.hits.to_win;

    let winner = winner_by_margin(red, blu, to_win, settings.hits.victory_margin);
    if winner != Team::Nobody {
        end_game(state, winner, hooks);
        return;
    }

    let reached = red.max(blu) >= to_win;
    if state.time.overtime_expired || (state.time.time_expired && !reached) {
        end_game(state, winner_by_most(red, blu), hooks);
        return;
    }

    if reached {
        enter_overtime(state, hooks);
    }
}

/// Most hits when regulation ends, needing a `victory_margin` lead.
///
/// Without the lead the game goes to sudden-death overtime; if overtime runs
/// out it ends on most hits.
pub fn update_most_hits_in_time(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    apply_hits(state, settings, sensor, now);

    if !state.time.time_expired {
        return;
    }

    let red = state.red_hits.hits;
    let blu = state.blu_hits.hits;

    let winner = winner_by_margin(red, blu, settings.hits.to_win, settings.hits.victory_margin);
    if winner != Team::Nobody {
        end_game(state, winner, hooks);
    } else if state.time.overtime_expired {
        end_game(state, winner_by_most(red, blu), hooks);
    } else {
        enter_overtime(state, hooks);
    }
}

/// First side to bank `ownership_time_seconds` of ownership.
///
/// A win is held back while a capture-triggered overtime is still counting
/// down. At timeout the cascade is most ownership, then most hits, then Tie.
pub fn update_first_to_own_time(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    decay_capture(&mut state.ownership, &settings.capture, now);
    apply_capture_hits(state, settings, sensor, now, hooks);
    update_ownership(state, settings, now, hooks);

    // Banked time must exceed the target; reaching it exactly is not a win.
    let target = (settings.timed.ownership_time_seconds as Millis * 1000).saturating_add(1);
    let ownership = &state.ownership;
    let contested = ownership.overtime_remaining_millis > 0;
    let winner = winner_by_threshold(ownership.red_millis, ownership.blu_millis, target);

    if winner != Team::Nobody {
        if contested {
            enter_overtime(state, hooks);
        } else {
            end_game(state, winner, hooks);
        }
        return;
    }

    if state.time.time_expired {
        if contested && !state.time.overtime_expired {
            enter_overtime(state, hooks);
        } else {
            let by_ownership = winner_by_most(ownership.red_millis, ownership.blu_millis);
            let winner = if by_ownership == Team::Tie {
                winner_by_most(state.red_hits.hits, state.blu_hits.hits)
            } else {
                by_ownership
            };
            end_game(state, winner, hooks);
        }
        return;
    }

    if !contested && state.status == GameStatus::Overtime {
        state.status = GameStatus::Running;
    }
}

/// Blu attacks a Red-held point.
///
/// Blu wins the moment capture progress fills. At timeout, Blu gets overtime
/// while within `victory_margin` of a capture; otherwise Red wins.
pub fn update_attack_defend(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    decay_capture(&mut state.ownership, &settings.capture, now);
    apply_capture_hits(state, settings, sensor, now, hooks);
    accrue_ownership(state, now);

    let progress = state.ownership.capture_hits;
    let needed = settings.capture.hits_to_capture;

    if progress >= needed {
        end_game(state, Team::Blu, hooks);
        return;
    }

    if state.time.time_expired {
        let close = within_margin(progress, needed, settings.hits.victory_margin);
        if close && !state.time.overtime_expired {
            enter_overtime(state, hooks);
        } else {
            end_game(state, Team::Red, hooks);
        }
    }
}

/// Longest ownership at timeout. Not implemented: ends at once with no winner.
pub fn update_most_own_in_time(state: &mut GameState, hooks: &mut dyn EventHooks) {
    warn!("MostOwnInTime is not implemented; ending game with no winner");
    end_game(state, Team::Nobody, hooks);
}

/// Free-running tuning mode.
///
/// Idle sides decay back toward zero. The game only ends if one side pulls
/// more than `victory_margin` hits clear.
pub fn update_target_test(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    decay_hits(&mut state.red_hits, &settings.capture, now);
    decay_hits(&mut state.blu_hits, &settings.capture, now);
    apply_hits(state, settings, sensor, now);

    let red = state.red_hits.hits;
    let blu = state.blu_hits.hits;
    if red.abs_diff(blu) > settings.hits.victory_margin {
        end_game(state, winner_by_most(red, blu), hooks);
    }
}
