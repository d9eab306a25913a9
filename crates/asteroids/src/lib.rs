//! # ASTEROIDS
//!
//! The game crate: concrete actor types on top of the lifecycle core.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        Simulation                            │
//! │                                                              │
//! │  FlyweightCatalog ──► ActorBuilder<EnemyLifecycle>   ──┐     │
//! │   (TOML)          └─► ActorBuilder<ProjectileLifecycle> ┤     │
//! │                                                        │     │
//! │  LaserWeapon ─────────────────────────────┐            │     │
//! │                                           ▼            ▼     │
//! │                              RewindCoordinator   PersistenceHub
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `flyweight`: per-type configuration loaded from TOML
//! - `enemy`, `projectile`: pool hooks of each actor family
//! - `builder`: pools enrolled with rewind and persistence
//! - `laser`: the non-pooled rewindable weapon
//! - `simulation`: fixed-step loop, play field, save/load

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod builder;
pub mod enemy;
pub mod error;
pub mod flyweight;
pub mod laser;
pub mod projectile;
pub mod simulation;

// Re-export the engine
pub use asteroids_core as core;
pub use asteroids_shared as shared;

pub use builder::ActorBuilder;
pub use enemy::{EnemyLifecycle, EnemySpawn};
pub use error::{GameError, GameResult};
pub use flyweight::{
    BomberParams, EnemyFlyweight, EnemyKind, FlyweightCatalog, ProjectileFlyweight, SplitParams,
};
pub use laser::{LaserMemento, LaserWeapon};
pub use projectile::{ProjectileLifecycle, ProjectileShot};
pub use simulation::{PlayField, Simulation, SimulationConfig};
