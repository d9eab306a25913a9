//! Rewind subscriptions for pooled actors.

use std::sync::Arc;

use crate::error::PoolResult;
use crate::handle::EntityHandle;
use crate::memento::{interpolate, Snapshot};
use crate::pool::{Lifecycle, ObjectPool, SharedPool};

use super::coordinator::RewindCoordinator;
use super::registry::SubscriptionId;

/// Subscribes a pooled handle to the coordinator.
///
/// Call once per physical handle, when [`crate::Spawn::fresh`] is true. The
/// subscription captures a [`Snapshot`] every pass and, while rewinding,
/// routes the handle through [`apply_pooled`]. The pool is held weakly; once
/// it is dropped the consumer does nothing.
pub fn track_pooled<L: Lifecycle>(
    rewind: &mut RewindCoordinator,
    pool: &SharedPool<L>,
    handle: &L::Handle,
) -> SubscriptionId {
    let discontinuity = rewind.discontinuity();
    let weak_pool = Arc::downgrade(pool);
    let producer_handle = handle.clone();
    let consumer_handle = handle.clone();

    rewind.subscribe(
        move || Snapshot::capture(&producer_handle),
        move |sample: Option<Snapshot>| {
            let Some(pool) = weak_pool.upgrade() else {
                return;
            };
            let mut pool = pool.lock();
            if let Err(err) = apply_pooled(&mut *pool, &consumer_handle, sample.as_ref()) {
                tracing::warn!("Rewind could not apply {}: {}", consumer_handle.id(), err);
            }
        },
        move |a: &Snapshot, b: &Snapshot, t: f32| interpolate(a, b, t, &discontinuity),
    )
}

/// Applies a rewound state to a pooled handle.
///
/// - Enabled sample: the handle leaves the free list if it was stored (no
///   initialization runs), is enabled, and receives the sample's fields
/// - Disabled sample or `None`: an active handle is stored; a stored one is
///   left alone
///
/// # Errors
///
/// [`crate::PoolError::UnknownHandle`] when an enabled sample targets a
/// handle the pool no longer owns.
pub fn apply_pooled<L: Lifecycle>(
    pool: &mut ObjectPool<L>,
    handle: &L::Handle,
    sample: Option<&Snapshot>,
) -> PoolResult<()> {
    match sample {
        Some(snapshot) if snapshot.enabled => {
            pool.extract_if_has(handle)?;
            handle.set_enabled(true);
            snapshot.write_fields(handle);
        }
        _ => {
            if pool.is_active(handle) {
                pool.store(handle)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RewindConfig;
    use crate::handle::{Body, BodyState};
    use crate::memento::VariantId;
    use crate::pool::Flyweight;
    use asteroids_shared::Vec2;

    struct Mote;

    impl Flyweight for Mote {
        fn name(&self) -> &str {
            "mote"
        }
    }

    #[derive(Default)]
    struct MoteLifecycle {
        initializations: usize,
    }

    impl Lifecycle for MoteLifecycle {
        type Flyweight = Mote;
        type Handle = Body;
        type Params = Vec2;

        fn construct(&mut self, _flyweight: &Mote, _params: &Vec2) -> PoolResult<Body> {
            Ok(Body::new(BodyState::default()))
        }

        fn common_initialize(&mut self, _flyweight: &Mote, handle: &Body, position: &Vec2) {
            self.initializations += 1;
            handle.set_position(*position);
            handle.set_velocity(Vec2::ZERO);
        }
    }

    fn pool() -> SharedPool<MoteLifecycle> {
        ObjectPool::new(Arc::new(Mote), MoteLifecycle::default()).shared()
    }

    fn alive_at(x: f32) -> Snapshot {
        Snapshot {
            enabled: true,
            position: Vec2::new(x, 0.0),
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            visual_variant: VariantId(2),
        }
    }

    #[test]
    fn test_enabled_sample_extracts_without_initializing() {
        let pool = pool();
        let mut pool = pool.lock();
        let handle = pool.create(Vec2::ZERO).unwrap().handle;
        pool.store(&handle).unwrap();

        apply_pooled(&mut *pool, &handle, Some(&alive_at(3.0))).unwrap();

        assert!(pool.is_active(&handle));
        assert!(handle.enabled());
        assert_eq!(handle.position(), Vec2::new(3.0, 0.0));
        assert_eq!(handle.visual_variant(), VariantId(2));
        assert_eq!(pool.lifecycle().initializations, 1);
        assert_eq!(pool.stats().extracted, 1);
    }

    #[test]
    fn test_absent_or_disabled_sample_stores_once() {
        let pool = pool();
        let mut pool = pool.lock();
        let handle = pool.create(Vec2::ZERO).unwrap().handle;

        apply_pooled(&mut *pool, &handle, None).unwrap();
        assert!(pool.is_stored(&handle));
        assert!(!handle.enabled());

        let mut dead = alive_at(1.0);
        dead.enabled = false;
        apply_pooled(&mut *pool, &handle, Some(&dead)).unwrap();
        assert_eq!(pool.stored_count(), 1);
    }

    #[test]
    fn test_tracked_handle_follows_rewind() {
        let mut rewind = RewindCoordinator::new(RewindConfig::default()).unwrap();
        let pool = pool();

        let spawn = pool.lock().create(Vec2::ZERO).unwrap();
        assert!(spawn.fresh);
        let handle = spawn.handle;
        track_pooled(&mut rewind, &pool, &handle);

        for step in 1..=10 {
            handle.set_position(Vec2::new(step as f32, 0.0));
            rewind.tick(0.1);
        }
        pool.lock().store(&handle).unwrap();
        for _ in 0..5 {
            rewind.tick(0.1);
        }

        rewind.set_rewind_target(1.0);
        rewind.tick(0.02);

        assert!(pool.lock().is_active(&handle));
        assert!((handle.position().x - 5.0).abs() < 1e-3);

        rewind.set_rewind_target(0.0);
        rewind.tick(0.02);
        assert!(pool.lock().is_stored(&handle));
    }

    #[test]
    fn test_dropped_pool_is_ignored() {
        let mut rewind = RewindCoordinator::new(RewindConfig::default()).unwrap();
        let pool = pool();
        let handle = pool.lock().create(Vec2::ZERO).unwrap().handle;
        track_pooled(&mut rewind, &pool, &handle);
        rewind.tick(0.1);
        drop(pool);

        rewind.set_rewind_target(0.0);
        rewind.tick(0.1);
        assert_eq!(rewind.stats().applied, 1);
    }
}
