//! # Enemy Lifecycle
//!
//! Pool hooks shared by every enemy type. The flyweight's [`EnemyKind`]
//! selects the extra bomber behaviour.

use asteroids_core::{Body, BodyState, EntityHandle, Lifecycle, PoolResult, VariantId};
use asteroids_shared::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::flyweight::{EnemyFlyweight, EnemyKind};

/// Where and how fast a new enemy starts.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EnemySpawn {
    /// Spawn position.
    pub position: Vec2,
    /// Initial velocity.
    pub velocity: Vec2,
}

/// Construction and reset hooks for enemies.
///
/// Sprite variants are drawn from a seeded generator, so two simulations
/// with the same seed pick the same sprites.
pub struct EnemyLifecycle {
    rng: ChaCha8Rng,
}

impl EnemyLifecycle {
    /// Creates hooks drawing variants from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Lifecycle for EnemyLifecycle {
    type Flyweight = EnemyFlyweight;
    type Handle = Body;
    type Params = EnemySpawn;

    fn construct(&mut self, flyweight: &EnemyFlyweight, _params: &EnemySpawn) -> PoolResult<Body> {
        Ok(Body::new(BodyState {
            mass: flyweight.mass,
            scale: flyweight.scale,
            ..BodyState::default()
        }))
    }

    fn common_initialize(&mut self, flyweight: &EnemyFlyweight, handle: &Body, params: &EnemySpawn) {
        handle.with_state(|state| {
            state.mass = flyweight.mass;
            state.scale = flyweight.scale;
        });
        handle.set_position(params.position);
        handle.set_velocity(params.velocity);
        handle.set_rotation(0.0);
        handle.set_angular_velocity(0.0);

        let variant = self.rng.gen_range(0..flyweight.sprites.len().max(1));
        handle.set_visual_variant(VariantId(variant as u32));

        if flyweight.kind == EnemyKind::Bomber {
            // Bombers face where they fly
            handle.set_rotation(params.velocity.normalized().angle_degrees());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flyweight::BomberParams;
    use asteroids_core::ObjectPool;
    use std::sync::Arc;

    fn flyweight(kind: EnemyKind) -> EnemyFlyweight {
        EnemyFlyweight {
            name: "enemy".into(),
            kind,
            mass: 2.0,
            scale: 0.5,
            sprites: vec!["a".into(), "b".into(), "c".into()],
            death_sound: None,
            layer: 0,
            score: 5,
            split: None,
            bomber: (kind == EnemyKind::Bomber).then(|| BomberParams {
                projectile: "bomb".into(),
                fire_interval: 1.0,
            }),
        }
    }

    fn spawn(vx: f32, vy: f32) -> EnemySpawn {
        EnemySpawn {
            position: Vec2::new(1.0, 1.0),
            velocity: Vec2::new(vx, vy),
        }
    }

    #[test]
    fn test_simple_enemy_starts_unrotated() {
        let mut pool = ObjectPool::new(Arc::new(flyweight(EnemyKind::Simple)), EnemyLifecycle::new(7));
        let enemy = pool.create(spawn(0.0, 1.0)).unwrap().handle;

        assert!(enemy.enabled());
        assert_eq!(enemy.rotation(), 0.0);
        assert_eq!(enemy.state().mass, 2.0);
        assert!(enemy.visual_variant().0 < 3);
    }

    #[test]
    fn test_bomber_faces_its_velocity() {
        let mut pool = ObjectPool::new(Arc::new(flyweight(EnemyKind::Bomber)), EnemyLifecycle::new(7));
        let bomber = pool.create(spawn(0.0, 2.0)).unwrap().handle;
        assert!((bomber.rotation() - 90.0).abs() < 1e-4);

        pool.store(&bomber).unwrap();
        let again = pool.create(spawn(-1.0, 0.0)).unwrap().handle;
        assert!((again.rotation().abs() - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_same_seed_same_variants() {
        let pick = |seed| {
            let mut pool = ObjectPool::new(Arc::new(flyweight(EnemyKind::Simple)), EnemyLifecycle::new(seed));
            (0..8)
                .map(|_| pool.create(spawn(1.0, 0.0)).unwrap().handle.visual_variant())
                .collect::<Vec<_>>()
        };
        assert_eq!(pick(42), pick(42));
    }

    #[test]
    fn test_replaced_flyweight_applies_on_reuse() {
        let mut pool = ObjectPool::new(Arc::new(flyweight(EnemyKind::Simple)), EnemyLifecycle::new(1));
        let enemy = pool.create(spawn(1.0, 0.0)).unwrap().handle;
        pool.store(&enemy).unwrap();

        let mut heavier = flyweight(EnemyKind::Simple);
        heavier.mass = 9.0;
        pool.set_flyweight(Arc::new(heavier));

        let again = pool.create(spawn(1.0, 0.0)).unwrap().handle;
        assert!(again.same_body(&enemy));
        assert_eq!(again.state().mass, 9.0);
    }
}
