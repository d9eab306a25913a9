//! # Simulation
//!
//! Headless fixed-step loop over every pooled actor.
//!
//! ```text
//! step(dt):
//! ┌──────────────────────────────────────────────────────────┐
//! │ not rewinding:                                           │
//! │   integrate ─► wrap enemies ─► expire projectiles        │
//! │   ─► bombers drop bombs ─► hits ─► laser ─► spawn wave   │
//! ├──────────────────────────────────────────────────────────┤
//! │ always: rewind.tick(dt)                                  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Rewinding suspends every gameplay rule; only the coordinator runs, and it
//! moves actors in and out of their pools on its own.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use asteroids_core::{
    Body, ConfigError, DiscontinuityConfig, EntityHandle, HandleId, PersistenceHub, PoolStats,
    RewindConfig, RewindCoordinator, RewindStats, SavedActor, Snapshot,
};
use asteroids_shared::{GameEvent, Vec2, DISCONTINUITY_FRACTION, ORTHOGRAPHIC_SIZE, VIEW_ASPECT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::builder::ActorBuilder;
use crate::enemy::{EnemyLifecycle, EnemySpawn};
use crate::error::{GameError, GameResult};
use crate::flyweight::{EnemyKind, FlyweightCatalog};
use crate::laser::LaserWeapon;
use crate::projectile::{ProjectileLifecycle, ProjectileShot};

/// Visible area, centered on the origin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayField {
    /// Half the view height in world units.
    pub orthographic_size: f32,
    /// View width over height.
    pub aspect: f32,
}

impl Default for PlayField {
    fn default() -> Self {
        Self {
            orthographic_size: ORTHOGRAPHIC_SIZE,
            aspect: VIEW_ASPECT,
        }
    }
}

impl PlayField {
    /// Half the view width.
    #[inline]
    #[must_use]
    pub fn half_width(&self) -> f32 {
        self.orthographic_size * self.aspect
    }

    /// Half the view height.
    #[inline]
    #[must_use]
    pub const fn half_height(&self) -> f32 {
        self.orthographic_size
    }

    /// Returns true when `position` is inside the view.
    #[must_use]
    pub fn contains(&self, position: Vec2) -> bool {
        position.x.abs() <= self.half_width() && position.y.abs() <= self.half_height()
    }

    /// Moves a body that left the view to the opposite edge.
    ///
    /// Returns true when the body was moved.
    pub fn wrap(&self, body: &Body) -> bool {
        let position = body.position();
        let wrapped = Vec2::new(
            wrap_axis(position.x, self.half_width()),
            wrap_axis(position.y, self.half_height()),
        );
        if wrapped == position {
            return false;
        }
        body.set_position(wrapped);
        true
    }

    /// Teleport thresholds matching this view.
    #[must_use]
    pub fn discontinuity(&self) -> DiscontinuityConfig {
        DiscontinuityConfig::View {
            orthographic_size: self.orthographic_size,
            aspect: self.aspect,
            fraction: DISCONTINUITY_FRACTION,
        }
    }

    /// Checks that the view has a positive, finite extent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the bad dimension.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [("orthographic_size", self.orthographic_size), ("aspect", self.aspect)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "field.{name} must be positive, got {value}"
                )));
            }
        }
        Ok(())
    }
}

fn wrap_axis(value: f32, half: f32) -> f32 {
    if value > half {
        value - 2.0 * half
    } else if value < -half {
        value + 2.0 * half
    } else {
        value
    }
}

/// Settings of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed of every random choice.
    pub seed: u64,
    /// Capture cadence and window.
    pub rewind: RewindConfig,
    /// Visible area.
    pub field: PlayField,
    /// Seconds between two spawned enemies; zero disables spawning.
    pub spawn_interval: f32,
    /// No spawns while this many enemies are alive.
    pub max_enemies: usize,
    /// Speed of spawned enemies.
    pub spawn_speed: f32,
    /// Seconds the laser beam stays on.
    pub laser_duration: f32,
    /// Seconds between two laser shots.
    pub laser_cooldown: f32,
    /// Half width of the laser beam.
    pub laser_half_width: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let field = PlayField::default();
        Self {
            seed: 0,
            rewind: RewindConfig {
                discontinuity: field.discontinuity(),
                ..RewindConfig::default()
            },
            field,
            spawn_interval: 1.5,
            max_enemies: 12,
            spawn_speed: 1.2,
            laser_duration: 0.6,
            laser_cooldown: 1.0,
            laser_half_width: 0.2,
        }
    }
}

impl SimulationConfig {
    /// Parses and validates a TOML document.
    ///
    /// Unless `[rewind.discontinuity]` is given, teleport thresholds follow
    /// the `[field]` section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let parse = |e: toml::de::Error| ConfigError::Parse(e.to_string());
        let mut config: Self = toml::from_str(source).map_err(parse)?;
        let table: toml::Table = toml::from_str(source).map_err(parse)?;

        let explicit = table
            .get("rewind")
            .and_then(|rewind| rewind.get("discontinuity"))
            .is_some();
        if !explicit {
            config.rewind.discontinuity = config.field.discontinuity();
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the play field and the rewind settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for the first unusable value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.field.validate()?;
        self.rewind.validate()
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }
}

/// The running game: pools, rewind, persistence and the player's laser.
pub struct Simulation {
    config: SimulationConfig,
    catalog: FlyweightCatalog,
    rewind: RewindCoordinator,
    persistence: PersistenceHub,
    enemies: BTreeMap<String, ActorBuilder<EnemyLifecycle>>,
    projectiles: BTreeMap<String, ActorBuilder<ProjectileLifecycle>>,
    /// Clock value when each projectile was launched.
    launched: HashMap<HandleId, f64>,
    /// Seconds until each bomber drops its next bomb.
    bomb_timers: HashMap<HandleId, f32>,
    laser: LaserWeapon,
    rng: ChaCha8Rng,
    spawn_timer: f32,
    events: Vec<GameEvent>,
    score: u64,
    paused: bool,
}

impl Simulation {
    /// Builds one pool per catalog entry and starts recording.
    ///
    /// # Errors
    ///
    /// Rejects an invalid play field or rewind configuration.
    pub fn new(config: SimulationConfig, catalog: FlyweightCatalog) -> GameResult<Self> {
        config.validate()?;
        let mut rewind = RewindCoordinator::new(config.rewind)?;
        let mut persistence = PersistenceHub::new();

        let mut enemies = BTreeMap::new();
        for (index, flyweight) in catalog.enemies.iter().enumerate() {
            let lifecycle = EnemyLifecycle::new(config.seed.wrapping_add(index as u64 + 1));
            let builder = ActorBuilder::new(
                format!("enemy/{}", flyweight.name),
                Arc::new(flyweight.clone()),
                lifecycle,
            );
            builder.register_loader(&mut persistence, |s: &Snapshot| EnemySpawn {
                position: s.position,
                velocity: s.velocity,
            });
            enemies.insert(flyweight.name.clone(), builder);
        }

        let mut projectiles = BTreeMap::new();
        for flyweight in &catalog.projectiles {
            let builder = ActorBuilder::new(
                format!("projectile/{}", flyweight.name),
                Arc::new(flyweight.clone()),
                ProjectileLifecycle,
            );
            builder.register_loader(&mut persistence, |s: &Snapshot| ProjectileShot {
                position: s.position,
                direction: s.velocity,
            });
            projectiles.insert(flyweight.name.clone(), builder);
        }

        let laser = LaserWeapon::new(config.laser_duration, config.laser_cooldown);
        laser.track(&mut rewind);

        tracing::info!(
            "Simulation ready: {} enemy types, {} projectile types",
            enemies.len(),
            projectiles.len()
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            catalog,
            rewind,
            persistence,
            enemies,
            projectiles,
            launched: HashMap::new(),
            bomb_timers: HashMap::new(),
            laser,
            spawn_timer: 0.0,
            events: Vec::new(),
            score: 0,
            paused: false,
        })
    }

    // =========================================================================
    // FIXED STEP
    // =========================================================================

    /// Advances one fixed step.
    ///
    /// # Errors
    ///
    /// Propagates pool failures from spawning or killing actors.
    pub fn step(&mut self, dt: f32) -> GameResult<()> {
        if self.paused {
            return Ok(());
        }
        if !self.rewind.is_rewinding() {
            self.integrate(dt);
            self.expire_projectiles()?;
            self.drop_bombs(dt)?;
            self.resolve_hits()?;
            self.laser.update(dt, false);
            self.resolve_laser()?;
            self.spawn_wave(dt)?;
        }
        self.rewind.tick(dt);
        Ok(())
    }

    fn integrate(&mut self, dt: f32) {
        let field = self.config.field;
        for builder in self.enemies.values() {
            for enemy in builder.active() {
                advance(enemy, dt);
                field.wrap(enemy);
            }
        }
        for builder in self.projectiles.values() {
            for projectile in builder.active() {
                advance(projectile, dt);
            }
        }
    }

    fn expire_projectiles(&mut self) -> GameResult<()> {
        let clock = self.rewind.clock();
        for (name, builder) in &self.projectiles {
            let lifetime = self
                .catalog
                .projectile(name)
                .map_or(0.0, |p| f64::from(p.lifetime));
            let expired: Vec<Body> = builder
                .active()
                .filter(|p| {
                    let launched = *self.launched.entry(p.id()).or_insert(clock);
                    clock - launched >= lifetime || !self.config.field.contains(p.position())
                })
                .cloned()
                .collect();
            for projectile in &expired {
                builder.store(projectile)?;
            }
        }
        Ok(())
    }

    fn drop_bombs(&mut self, dt: f32) -> GameResult<()> {
        let mut drops = Vec::new();
        for (name, builder) in &self.enemies {
            let Some(bomber) = self.catalog.enemy(name).and_then(|e| e.bomber.as_ref()) else {
                continue;
            };
            for enemy in builder.active() {
                let timer = self.bomb_timers.entry(enemy.id()).or_insert(bomber.fire_interval);
                *timer -= dt;
                if *timer <= 0.0 {
                    *timer += bomber.fire_interval;
                    drops.push((bomber.projectile.clone(), enemy.position(), enemy.velocity()));
                }
            }
        }
        for (projectile, position, heading) in drops {
            self.fire(
                &projectile,
                ProjectileShot {
                    position,
                    direction: -heading,
                },
            )?;
        }
        Ok(())
    }

    fn resolve_hits(&mut self) -> GameResult<()> {
        let mut hits = Vec::new();
        for (name, builder) in &self.projectiles {
            if !self.catalog.projectile(name).is_some_and(|p| p.hits_enemies) {
                continue;
            }
            for projectile in builder.active() {
                let reach = projectile.state().scale * 0.5;
                let target = self.enemies.iter().find_map(|(kind, enemies)| {
                    enemies
                        .active()
                        .find(|e| e.position().distance(projectile.position()) < reach + e.state().scale * 0.5)
                        .map(|e| (kind.clone(), e.clone()))
                });
                if let Some((kind, enemy)) = target {
                    hits.push((name.clone(), projectile.clone(), kind, enemy));
                }
            }
        }
        // A killed handle may be reused by a split in the same pass
        let mut killed = HashSet::new();
        for (name, projectile, kind, enemy) in hits {
            if !killed.insert(enemy.id()) || !enemy.enabled() {
                continue;
            }
            if let Some(builder) = self.projectiles.get(&name) {
                builder.store(&projectile)?;
            }
            self.kill(&kind, &enemy)?;
        }
        Ok(())
    }

    fn resolve_laser(&mut self) -> GameResult<()> {
        if !self.laser.is_firing() {
            return Ok(());
        }
        // The beam points up from the origin
        let half_width = self.config.laser_half_width;
        let burned: Vec<(String, Body)> = self
            .enemies
            .iter()
            .flat_map(|(kind, builder)| {
                builder
                    .active()
                    .filter(|e| {
                        let p = e.position();
                        p.y >= 0.0 && p.x.abs() <= half_width + e.state().scale * 0.5
                    })
                    .map(|e| (kind.clone(), e.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        for (kind, enemy) in burned {
            self.kill(&kind, &enemy)?;
        }
        Ok(())
    }

    fn spawn_wave(&mut self, dt: f32) -> GameResult<()> {
        if self.config.spawn_interval <= 0.0 || self.catalog.enemies.is_empty() {
            return Ok(());
        }
        self.spawn_timer += dt;
        if self.spawn_timer < self.config.spawn_interval || self.active_enemies() >= self.config.max_enemies {
            return Ok(());
        }
        self.spawn_timer = 0.0;

        let index = self.rng.gen_range(0..self.catalog.enemies.len());
        let kind = self.catalog.enemies[index].name.clone();
        let (hw, hh) = (self.config.field.half_width(), self.config.field.half_height());
        let position = if self.rng.gen_bool(0.5) {
            Vec2::new(if self.rng.gen_bool(0.5) { hw } else { -hw }, self.rng.gen_range(-hh..hh))
        } else {
            Vec2::new(self.rng.gen_range(-hw..hw), if self.rng.gen_bool(0.5) { hh } else { -hh })
        };
        let aim = Vec2::new(self.rng.gen_range(-hw..hw), self.rng.gen_range(-hh..hh)) * 0.5;
        let velocity = (aim - position).normalized() * self.config.spawn_speed;

        self.spawn_enemy(&kind, EnemySpawn { position, velocity })?;
        Ok(())
    }

    // =========================================================================
    // ACTORS
    // =========================================================================

    /// Spawns an enemy of a catalog type.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownActor`] for a type missing from the catalog.
    pub fn spawn_enemy(&mut self, kind: &str, spawn: EnemySpawn) -> GameResult<Body> {
        let builder = self
            .enemies
            .get_mut(kind)
            .ok_or_else(|| GameError::UnknownActor(kind.to_string()))?;
        let enemy = builder.create(&mut self.rewind, &mut self.persistence, spawn)?;
        if let Some(bomber) = self.catalog.enemy(kind).and_then(|e| e.bomber.as_ref()) {
            self.bomb_timers.insert(enemy.id(), bomber.fire_interval);
        }
        Ok(enemy)
    }

    /// Launches a projectile of a catalog type.
    ///
    /// # Errors
    ///
    /// [`GameError::UnknownActor`] for a type missing from the catalog.
    pub fn fire(&mut self, projectile: &str, shot: ProjectileShot) -> GameResult<Body> {
        let builder = self
            .projectiles
            .get_mut(projectile)
            .ok_or_else(|| GameError::UnknownActor(projectile.to_string()))?;
        let handle = builder.create(&mut self.rewind, &mut self.persistence, shot)?;
        self.launched.insert(handle.id(), self.rewind.clock());
        Ok(handle)
    }

    /// Turns the laser on. Returns false while rewinding or cooling down.
    pub fn fire_laser(&mut self) -> bool {
        self.laser.fire(self.rewind.is_rewinding())
    }

    /// Kills an active enemy: returns it to its pool, scores it and spawns
    /// its pieces.
    ///
    /// # Errors
    ///
    /// Fails when the enemy is not active in the pool of `kind`.
    pub fn kill(&mut self, kind: &str, enemy: &Body) -> GameResult<()> {
        let flyweight = self
            .catalog
            .enemy(kind)
            .ok_or_else(|| GameError::UnknownActor(kind.to_string()))?;
        let (score, split) = (flyweight.score, flyweight.split.clone());
        if let Some(builder) = self.enemies.get(kind) {
            builder.store(enemy)?;
        }

        self.score += u64::from(score);
        self.events.push(GameEvent::EnemyDestroyed { score });

        if let Some(split) = split {
            let origin = enemy.position();
            let offset = self.rng.gen_range(0.0..360.0_f32);
            for piece in 0..split.amount {
                let angle = offset + 360.0 * piece as f32 / split.amount as f32;
                self.spawn_enemy(
                    &split.into,
                    EnemySpawn {
                        position: origin,
                        velocity: Vec2::from_angle_degrees(angle) * split.speed,
                    },
                )?;
            }
            self.events.push(GameEvent::EnemySplit { amount: split.amount });
        }
        Ok(())
    }

    // =========================================================================
    // REWIND
    // =========================================================================

    /// Starts rewinding from the present.
    pub fn begin_rewind(&mut self) {
        self.rewind.begin_rewind();
    }

    /// Targets the instant `offset` seconds back.
    pub fn set_rewind_target(&mut self, offset: f32) {
        self.rewind.set_rewind_target(offset);
    }

    /// Moves the rewind target further back (hold-to-rewind).
    pub fn step_rewind(&mut self, dt: f32) {
        self.rewind.step_rewind(dt);
    }

    /// Resumes play from the rewound instant.
    pub fn end_rewind(&mut self) {
        self.rewind.end_rewind();
        let clock = self.rewind.clock();
        // A launch time after the rewound instant belongs to a reused handle
        for launched in self.launched.values_mut() {
            if *launched > clock {
                *launched = clock;
            }
        }
    }

    /// Whether gameplay is suspended for a rewind.
    #[inline]
    #[must_use]
    pub fn is_rewinding(&self) -> bool {
        self.rewind.is_rewinding()
    }

    // =========================================================================
    // SAVE / LOAD
    // =========================================================================

    /// Saves every active pooled actor.
    pub fn save(&mut self) -> Vec<SavedActor> {
        self.persistence.collect()
    }

    /// Recreates saved actors on top of the current ones.
    ///
    /// # Errors
    ///
    /// Propagates the first loader failure.
    pub fn load(&mut self, records: &[SavedActor]) -> GameResult<usize> {
        let restored = self.persistence.restore(records)?;
        for builder in self.enemies.values_mut() {
            builder.enroll_restored(&mut self.rewind, &mut self.persistence);
        }
        for builder in self.projectiles.values_mut() {
            builder.enroll_restored(&mut self.rewind, &mut self.persistence);
        }
        tracing::info!("Loaded {} actors", restored);
        Ok(restored)
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Pauses or resumes the simulation.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            self.events.push(GameEvent::Paused { paused });
        }
    }

    /// Ends the level and closes the rewind session.
    pub fn finish_level(&mut self, won: bool) {
        self.events.push(GameEvent::LevelTerminated { won });
        self.rewind.shutdown();
        tracing::info!("Level finished (won: {}, score: {})", won, self.score);
    }

    /// Takes every event raised since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Enemies currently alive.
    #[must_use]
    pub fn active_enemies(&self) -> usize {
        self.enemies.values().map(|b| b.active().count()).sum()
    }

    /// Active enemies of one type.
    #[must_use]
    pub fn enemies_of(&self, kind: &str) -> Vec<Body> {
        self.enemies
            .get(kind)
            .map(|b| b.active().cloned().collect())
            .unwrap_or_default()
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn active_projectiles(&self) -> usize {
        self.projectiles.values().map(|b| b.active().count()).sum()
    }

    /// Counters of the pool of one actor type.
    #[must_use]
    pub fn pool_stats(&self, name: &str) -> Option<PoolStats> {
        self.enemies
            .get(name)
            .map(ActorBuilder::stats)
            .or_else(|| self.projectiles.get(name).map(ActorBuilder::stats))
    }

    /// Rewind counters.
    #[must_use]
    pub fn rewind_stats(&self) -> RewindStats {
        self.rewind.stats()
    }

    /// Simulation time in seconds.
    #[must_use]
    pub fn clock(&self) -> f64 {
        self.rewind.clock()
    }

    /// Points scored so far.
    #[inline]
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// The player's laser.
    #[inline]
    #[must_use]
    pub const fn laser(&self) -> &LaserWeapon {
        &self.laser
    }

    /// Visible area.
    #[inline]
    #[must_use]
    pub const fn field(&self) -> &PlayField {
        &self.config.field
    }

    /// Enemy types that face their heading.
    #[must_use]
    pub fn bomber_types(&self) -> Vec<&str> {
        self.catalog
            .enemies
            .iter()
            .filter(|e| e.kind == EnemyKind::Bomber)
            .map(|e| e.name.as_str())
            .collect()
    }
}

fn advance(body: &Body, dt: f32) {
    body.with_state(|state| {
        state.position = state.position + state.velocity * dt;
        state.rotation += state.angular_velocity * dt;
    });
}
