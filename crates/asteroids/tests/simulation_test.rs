//! Integration tests for the simulation: kills, splits, rewind across
//! deaths and births, save/load.

use asteroids::{
    EnemySpawn, FlyweightCatalog, ProjectileShot, Simulation, SimulationConfig,
};
use asteroids::core::{EntityHandle, UnderrunPolicy};
use asteroids_shared::{GameEvent, Vec2, FIXED_TIMESTEP};

const CATALOG: &str = include_str!("../data/catalog.toml");

fn simulation(underrun: UnderrunPolicy) -> Simulation {
    let defaults = SimulationConfig::default();
    let config = SimulationConfig {
        spawn_interval: 0.0,
        rewind: asteroids::core::RewindConfig {
            underrun,
            ..defaults.rewind
        },
        ..defaults
    };
    Simulation::new(config, FlyweightCatalog::from_toml_str(CATALOG).unwrap()).unwrap()
}

fn run(simulation: &mut Simulation, seconds: f32) {
    let steps = (seconds / FIXED_TIMESTEP).round() as usize;
    for _ in 0..steps {
        simulation.step(FIXED_TIMESTEP).unwrap();
    }
}

/// A large rock at x = 3 and a bullet fired at it from the origin.
fn shoot_rock(simulation: &mut Simulation) {
    simulation
        .spawn_enemy(
            "rock_large",
            EnemySpawn {
                position: Vec2::new(3.0, 0.0),
                velocity: Vec2::ZERO,
            },
        )
        .unwrap();
    simulation
        .fire(
            "bullet",
            ProjectileShot {
                position: Vec2::ZERO,
                direction: Vec2::new(1.0, 0.0),
            },
        )
        .unwrap();
}

#[test]
fn test_kill_scores_and_splits() {
    let mut simulation = simulation(UnderrunPolicy::Clamp);
    shoot_rock(&mut simulation);
    run(&mut simulation, 0.5);

    assert_eq!(
        simulation.drain_events(),
        vec![
            GameEvent::EnemyDestroyed { score: 20 },
            GameEvent::EnemySplit { amount: 3 },
        ]
    );
    assert_eq!(simulation.score(), 20);
    assert_eq!(simulation.enemies_of("rock_large").len(), 0);
    assert_eq!(simulation.enemies_of("rock_small").len(), 3);
    assert_eq!(simulation.active_projectiles(), 0);
    assert_eq!(simulation.pool_stats("rock_large").unwrap().stored, 1);
}

#[test]
fn test_rewind_before_kill_resurrects_and_absorbs() {
    let mut simulation = simulation(UnderrunPolicy::ReportAbsent);
    shoot_rock(&mut simulation);
    run(&mut simulation, 1.0);
    assert_eq!(simulation.enemies_of("rock_small").len(), 3);

    // Back to t = 0.2, before the bullet landed
    simulation.set_rewind_target(0.8);
    run(&mut simulation, FIXED_TIMESTEP);

    assert_eq!(simulation.enemies_of("rock_large").len(), 1);
    assert_eq!(simulation.enemies_of("rock_small").len(), 0);
    assert_eq!(simulation.active_projectiles(), 1);

    let large = simulation.pool_stats("rock_large").unwrap();
    assert_eq!((large.active, large.stored, large.extracted), (1, 0, 1));
    let small = simulation.pool_stats("rock_small").unwrap();
    assert_eq!((small.active, small.stored), (0, 3));

    // Replaying the same shot reuses the stored pieces
    simulation.end_rewind();
    run(&mut simulation, 0.5);

    let small = simulation.pool_stats("rock_small").unwrap();
    assert_eq!(small.constructed, 3);
    assert_eq!(small.reused, 3);
    assert_eq!(small.active, 3);
}

#[test]
fn test_rewind_freezes_gameplay() {
    let mut simulation = simulation(UnderrunPolicy::Clamp);
    let rock = simulation
        .spawn_enemy(
            "rock_small",
            EnemySpawn {
                position: Vec2::new(-2.0, 1.0),
                velocity: Vec2::new(1.0, 0.0),
            },
        )
        .unwrap();
    run(&mut simulation, 2.0);
    assert!((rock.position().x - 0.0).abs() < 1e-2);

    simulation.set_rewind_target(1.0);
    run(&mut simulation, 1.0);
    assert!((rock.position().x + 1.0).abs() < 1e-2);
    assert!(!simulation.fire_laser());
    assert!((simulation.clock() - 2.0).abs() < 1e-3);
}

#[test]
fn test_save_then_load_into_new_session() {
    let mut simulation = simulation(UnderrunPolicy::Clamp);
    for x in [-3.0, 3.0] {
        simulation
            .spawn_enemy(
                "bomber",
                EnemySpawn {
                    position: Vec2::new(x, 2.0),
                    velocity: Vec2::new(0.0, -0.5),
                },
            )
            .unwrap();
    }
    let saved = simulation.save();
    assert_eq!(saved.len(), 2);
    assert!(saved.iter().all(|s| s.kind == "enemy/bomber"));

    let mut restored = self::simulation(UnderrunPolicy::Clamp);
    assert_eq!(restored.load(&saved).unwrap(), 2);

    let bombers = restored.enemies_of("bomber");
    assert_eq!(bombers.len(), 2);
    assert!(bombers.iter().any(|b| b.position() == Vec2::new(-3.0, 2.0)));
    assert!((bombers[0].rotation() + 90.0).abs() < 1e-4);

    // Loaded actors are tracked like any other
    run(&mut restored, 0.5);
    restored.set_rewind_target(0.4);
    run(&mut restored, FIXED_TIMESTEP);
    assert_eq!(restored.enemies_of("bomber").len(), 2);
}

#[test]
fn test_pause_stops_the_clock() {
    let mut simulation = simulation(UnderrunPolicy::Clamp);
    simulation.set_paused(true);
    run(&mut simulation, 1.0);

    assert_eq!(simulation.clock(), 0.0);
    assert_eq!(simulation.drain_events(), vec![GameEvent::Paused { paused: true }]);

    simulation.set_paused(false);
    run(&mut simulation, 0.1);
    assert!(simulation.clock() > 0.0);
}

/// A blob that splits into two more blobs.
const SELF_SPLITTING: &str = r#"
[[enemies]]
name = "blob"
sprites = ["sprites/blob"]
score = 10
split = { into = "blob", amount = 2, speed = 0.5 }

[[projectiles]]
name = "bullet"
scale = 0.25
sprites = ["sprites/bullet"]
speed = 9.0
lifetime = 1.2
"#;

#[test]
fn test_two_hits_on_self_splitting_enemy_kill_once() {
    let config = SimulationConfig {
        spawn_interval: 0.0,
        ..SimulationConfig::default()
    };
    let catalog = FlyweightCatalog::from_toml_str(SELF_SPLITTING).unwrap();
    let mut simulation = Simulation::new(config, catalog).unwrap();

    simulation
        .spawn_enemy(
            "blob",
            EnemySpawn {
                position: Vec2::new(3.0, 0.0),
                velocity: Vec2::ZERO,
            },
        )
        .unwrap();
    for _ in 0..2 {
        simulation
            .fire(
                "bullet",
                ProjectileShot {
                    position: Vec2::ZERO,
                    direction: Vec2::new(1.0, 0.0),
                },
            )
            .unwrap();
    }

    // Both bullets overlap the blob on the same step. The first kill stores
    // the blob and its split reuses that body.
    let mut events = Vec::new();
    for _ in 0..30 {
        simulation.step(FIXED_TIMESTEP).unwrap();
        events = simulation.drain_events();
        if !events.is_empty() {
            break;
        }
    }

    assert_eq!(
        events,
        vec![
            GameEvent::EnemyDestroyed { score: 10 },
            GameEvent::EnemySplit { amount: 2 },
        ]
    );
    assert_eq!(simulation.score(), 10);
    assert_eq!(simulation.enemies_of("blob").len(), 2);
    assert_eq!(simulation.active_projectiles(), 1);
}
