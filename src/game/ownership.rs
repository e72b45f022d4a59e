//! Point Ownership
//!
//! Capture and ownership mechanics for FirstToOwnTime and AttackDefend.
//!
//! Before anyone owns the point the two sides play tug-of-war on raw hit
//! counts. Once it is owned, the owner banks time every tick and the other
//! side builds capture progress; full progress flips the point.

use tracing::info;

use crate::core::clock::Millis;
use crate::game::config::GameSettings;
use crate::game::events::EventHooks;
use crate::game::state::{GameState, GameStatus, SensorState, Team};

/// Score this tick's sensor hits into the raw trackers and capture progress.
pub fn apply_capture_hits(
    state: &mut GameState,
    settings: &GameSettings,
    sensor: &SensorState,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    for team in [Team::Red, Team::Blu] {
        let observation = sensor.for_team(team, settings.target.red_sensor);
        let count = observation.scored_hits();
        if count == 0 {
            continue;
        }
        if let Some(tracker) = state.hits_mut(team) {
            tracker.record(count, observation.energy, now);
        }

        let ownership = &mut state.ownership;
        if ownership.owner == Team::Nobody {
            // Tug-of-war phase: raw trackers only
            continue;
        }

        if ownership.capturing == Team::Nobody && team != ownership.owner {
            ownership.capturing = team;
        }

        if team == ownership.capturing {
            // Progress from zero restarts the decay window.
            if ownership.capture_hits == 0 {
                ownership.last_decay_millis = now;
            }
            ownership.capture_hits = ownership
                .capture_hits
                .saturating_add(count)
                .min(settings.capture.hits_to_capture);
            ownership.last_hit_millis = now;
        } else if team == ownership.owner && ownership.capture_hits > 0 {
            hooks.contested();
        }
    }
}

/// Credit the owner with the time since the previous tick.
///
/// Also runs down any capture-triggered overtime by the same delta.
pub fn accrue_ownership(state: &mut GameState, now: Millis) {
    let delta = now.saturating_sub(state.time.last_update_millis);
    let ownership = &mut state.ownership;
    match ownership.owner {
        Team::Red => ownership.red_millis = ownership.red_millis.saturating_add(delta),
        Team::Blu => ownership.blu_millis = ownership.blu_millis.saturating_add(delta),
        _ => {}
    }
    ownership.overtime_remaining_millis = ownership.overtime_remaining_millis.saturating_sub(delta);
}

/// Resolve the tug-of-war, bank ownership time, and complete captures.
///
/// A completed re-capture always triggers overtime first and then flips the
/// point, in that order, within the same tick.
pub fn update_ownership(
    state: &mut GameState,
    settings: &GameSettings,
    now: Millis,
    hooks: &mut dyn EventHooks,
) {
    let hits_to_capture = settings.capture.hits_to_capture;

    if state.ownership.owner == Team::Nobody {
        let red = state.red_hits.hits;
        let blu = state.blu_hits.hits;
        if red.abs_diff(blu) >= hits_to_capture {
            if red > blu {
                capture(state, Team::Red, hooks);
            } else if blu > red {
                capture(state, Team::Blu, hooks);
            }
        }
        return;
    }

    accrue_ownership(state, now);

    if state.ownership.capture_hits >= hits_to_capture {
        trigger_overtime(state, settings, hooks);
        let capturing = state.ownership.capturing;
        capture(state, capturing, hooks);
    }
}

/// Hand the point to `team` and restart the contest against it.
pub fn capture(state: &mut GameState, team: Team, hooks: &mut dyn EventHooks) {
    let ownership = &mut state.ownership;
    ownership.owner = team;
    ownership.capturing = team.opposite();
    ownership.capture_hits = 0;

    info!("{:?} captured the point", team);
    hooks.captured(team);
}

/// Put the game into overtime for the configured capture overtime.
///
/// `overtime_remaining_millis` receives the raw `capture_overtime_seconds`
/// value, unscaled.
pub fn trigger_overtime(state: &mut GameState, settings: &GameSettings, hooks: &mut dyn EventHooks) {
    state.status = GameStatus::Overtime;
    state.ownership.overtime_remaining_millis = settings.capture.capture_overtime_seconds as Millis;

    info!("Capture overtime triggered");
    hooks.overtime();
}
