//! # ASTEROIDS Rewind Demo
//!
//! Headless run of the simulation: plays a few seconds, shoots, rewinds
//! while holding the button, resumes, and reports pool and rewind counters.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin rewind_demo
//! RUST_LOG=info cargo run --bin rewind_demo -- data/simulation.toml data/catalog.toml
//! ```

use asteroids::{FlyweightCatalog, GameResult, ProjectileShot, Simulation, SimulationConfig};
use asteroids_shared::{Vec2, FIXED_TIMESTEP, TICK_RATE};
use tracing_subscriber::EnvFilter;

const DEFAULT_SETTINGS: &str = include_str!("../../data/simulation.toml");
const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Seconds played before rewinding.
const PLAY_SECONDS: u32 = 8;
/// Seconds the rewind button is held.
const HOLD_SECONDS: u32 = 3;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = run() {
        tracing::error!("Demo failed: {}", err);
        std::process::exit(1);
    }
}

fn run() -> GameResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimulationConfig::from_toml_file(path)?,
        None => SimulationConfig::from_toml_str(DEFAULT_SETTINGS)?,
    };
    let catalog = match args.next() {
        Some(path) => FlyweightCatalog::from_toml_file(path)?,
        None => FlyweightCatalog::from_toml_str(DEFAULT_CATALOG)?,
    };

    let mut simulation = Simulation::new(config, catalog)?;

    // Play, shooting in a slow circle
    for tick in 0..PLAY_SECONDS * TICK_RATE {
        if tick % 10 == 0 {
            let heading = Vec2::from_angle_degrees(tick as f32 * 7.0);
            simulation.fire("bullet", ProjectileShot { position: Vec2::ZERO, direction: heading })?;
        }
        if tick % TICK_RATE == 0 {
            simulation.fire_laser();
        }
        simulation.step(FIXED_TIMESTEP)?;
    }
    report(&mut simulation, "before rewind");

    // Hold the rewind button
    simulation.begin_rewind();
    for _ in 0..HOLD_SECONDS * TICK_RATE {
        simulation.step_rewind(FIXED_TIMESTEP);
        simulation.step(FIXED_TIMESTEP)?;
    }
    simulation.end_rewind();
    report(&mut simulation, "after rewind");

    // Play on from the rewound instant
    for _ in 0..2 * TICK_RATE {
        simulation.step(FIXED_TIMESTEP)?;
    }
    report(&mut simulation, "resumed");

    let saved = simulation.save();
    tracing::info!("Saved {} actors", saved.len());

    simulation.finish_level(true);
    Ok(())
}

fn report(simulation: &mut Simulation, label: &str) {
    let events = simulation.drain_events();
    tracing::info!(
        "[{}] t={:.2}s enemies={} projectiles={} score={} events={}",
        label,
        simulation.clock(),
        simulation.active_enemies(),
        simulation.active_projectiles(),
        simulation.score(),
        events.len()
    );
    for name in ["rock_large", "rock_small", "bomber", "bullet", "bomb"] {
        if let Some(stats) = simulation.pool_stats(name) {
            tracing::info!(
                "  {:<11} constructed={} active={} stored={} reused={} extracted={}",
                name,
                stats.constructed,
                stats.active,
                stats.stored,
                stats.reused,
                stats.extracted
            );
        }
    }
    let rewind = simulation.rewind_stats();
    tracing::info!(
        "  rewind      passes={} samples={} applied={} absent={} skipped={}",
        rewind.capture_passes,
        rewind.samples,
        rewind.applied,
        rewind.absent,
        rewind.skipped
    );
}
