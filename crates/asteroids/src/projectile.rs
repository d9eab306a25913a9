//! Projectile lifecycle: bullets fired by the player and bombs dropped by
//! bombers.

use asteroids_core::{Body, BodyState, EntityHandle, Lifecycle, PoolResult, VariantId};
use asteroids_shared::Vec2;

use crate::flyweight::ProjectileFlyweight;

/// Launch point and heading of a projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ProjectileShot {
    /// Launch position.
    pub position: Vec2,
    /// Heading; only the direction matters.
    pub direction: Vec2,
}

/// Construction and reset hooks for projectiles.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectileLifecycle;

impl Lifecycle for ProjectileLifecycle {
    type Flyweight = ProjectileFlyweight;
    type Handle = Body;
    type Params = ProjectileShot;

    fn construct(&mut self, flyweight: &ProjectileFlyweight, _params: &ProjectileShot) -> PoolResult<Body> {
        Ok(Body::new(BodyState {
            mass: flyweight.mass,
            scale: flyweight.scale,
            ..BodyState::default()
        }))
    }

    fn common_initialize(&mut self, flyweight: &ProjectileFlyweight, handle: &Body, params: &ProjectileShot) {
        let heading = params.direction.normalized();
        handle.with_state(|state| {
            state.mass = flyweight.mass;
            state.scale = flyweight.scale;
        });
        handle.set_position(params.position);
        handle.set_velocity(heading * flyweight.speed);
        handle.set_rotation(heading.angle_degrees());
        handle.set_angular_velocity(0.0);
        handle.set_visual_variant(VariantId(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asteroids_core::ObjectPool;
    use std::sync::Arc;

    #[test]
    fn test_shot_travels_along_heading() {
        let bullet = ProjectileFlyweight {
            name: "bullet".into(),
            mass: 0.1,
            scale: 0.2,
            sprites: vec!["bullet".into()],
            layer: 0,
            speed: 8.0,
            lifetime: 1.0,
            hits_enemies: true,
        };
        let mut pool = ObjectPool::new(Arc::new(bullet), ProjectileLifecycle);
        let shot = ProjectileShot {
            position: Vec2::new(0.5, 0.0),
            direction: Vec2::new(0.0, 3.0),
        };

        let handle = pool.create(shot).unwrap().handle;
        assert_eq!(handle.velocity(), Vec2::new(0.0, 8.0));
        assert!((handle.rotation() - 90.0).abs() < 1e-4);
        assert_eq!(handle.position(), Vec2::new(0.5, 0.0));
    }
}
