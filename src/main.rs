//! Capture Point Demo
//!
//! Plays one scripted game per mode on a fake clock and logs what the
//! sound/LED layers would be told.
//!
//! Usage: `capture-point [settings.json]`. A settings file replaces the
//! defaults for the mode it names.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use capture_point::{
    settings::store::{encode_record, SettingsBank},
    Clock, EventHooks, FakeClock, GameMode, GameSession, GameSettings, GameStatus, HitObservation,
    SensorState, Team, TICK_PERIOD_MS, VERSION,
};

/// Hard stop for a demo game (10 minutes of ticks).
const MAX_DEMO_TICKS: u64 = 12_000;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Capture Point Engine v{}", VERSION);
    info!("Tick period: {} ms", TICK_PERIOD_MS);

    let mut bank = SettingsBank::new();
    if let Some(path) = std::env::args().nth(1) {
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading settings file {path}"))?;
        let settings: GameSettings = serde_json::from_str(&text)
            .with_context(|| format!("parsing settings file {path}"))?;
        settings
            .validate()
            .with_context(|| format!("validating settings file {path}"))?;
        info!("Loaded {:?} settings from {}", settings.mode, path);
        bank.set(settings);
    }

    let image = bank.to_bytes().context("encoding settings bank")?;
    info!("Settings bank: {} bytes, {} slots", image.len(), GameMode::COUNT);

    for mode in GameMode::ALL {
        let settings = *bank.get(mode);
        let record = encode_record(&settings).context("encoding settings record")?;
        info!(
            "=== {:?} (record tail {}) ===",
            mode,
            hex::encode(&record[record.len() - 4..])
        );
        demo_game(settings)?;
    }

    Ok(())
}

/// Hooks that narrate events into the log.
struct LogHooks {
    last_announced: Option<i64>,
}

impl EventHooks for LogHooks {
    fn started(&mut self, status: GameStatus) {
        info!("[sound] started ({:?})", status);
    }

    fn ended(&mut self, winner: Team) {
        info!("[sound] game over, winner {:?}", winner);
    }

    fn overtime(&mut self) {
        info!("[sound] overtime!");
    }

    fn captured(&mut self, team: Team) {
        info!("[sound] {:?} has the point", team);
    }

    fn contested(&mut self) {
        info!("[sound] point contested");
    }

    fn remaining_secs(&mut self, secs: i64, status: GameStatus) {
        // Announce every 30 seconds and the final countdown.
        let announce = secs % 30 == 0 || secs <= 3;
        if announce && self.last_announced != Some(secs) {
            info!("[display] {}s ({:?})", secs, status);
            self.last_announced = Some(secs);
        }
    }
}

/// Deterministic fake sensor: each side lands hits on its own rhythm.
fn scripted_sensor(tick: u64, settings: &GameSettings) -> SensorState {
    let red = tick % 23 == 0;
    let blu = (tick * 5 + 3) % 29 == 0 || (tick > 2_000 && tick % 13 == 0);
    let observe = |hit: bool, energy: f64| HitObservation {
        was_hit: hit,
        hit_count: u32::from(hit),
        energy,
    };
    SensorState::from_teams(
        observe(red, 1800.0),
        observe(blu, 1650.0),
        settings.target.red_sensor,
    )
}

/// Play one game to completion (or the demo time limit).
fn demo_game(settings: GameSettings) -> Result<()> {
    let clock = FakeClock::new();
    let mut session = GameSession::new(&clock, settings);
    let mut hooks = LogHooks { last_announced: None };

    session
        .start(&mut hooks)
        .with_context(|| format!("starting {:?}", settings.mode))?;

    for tick in 1..=MAX_DEMO_TICKS {
        clock.advance(TICK_PERIOD_MS);
        let sensor = scripted_sensor(tick, &settings);
        let result = session.tick(&sensor, &mut hooks);

        if result.game_ended {
            info!("Game ended at {} ms", clock.now_ms());
            break;
        }
    }

    let state = session.state();
    info!("Final: status={:?} winner={:?}", state.status, state.winner());
    for team in [Team::Red, Team::Blu] {
        let hits = state.hits(team).map_or(0, |tracker| tracker.hits);
        info!(
            "  {:?}: {} hits, owned {} ms",
            team,
            hits,
            state.ownership.millis_for(team)
        );
    }
    Ok(())
}
