//! # Rewind Benchmark
//!
//! - Pool churn: create/store cycles once the pool is warm
//! - Capture pass over a full arena
//! - Rewind pass with interpolation
//!
//! Run with: `cargo bench --package asteroids_core`

#![allow(missing_docs)]

use std::sync::Arc;

use asteroids_core::{
    track_pooled, Body, BodyState, EntityHandle, Flyweight, Lifecycle, ObjectPool, PoolResult,
    RewindConfig, RewindCoordinator, SharedPool,
};
use asteroids_shared::Vec2;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Actor counts to measure.
const ARENA_SIZES: [usize; 3] = [100, 1_000, 10_000];

struct Dust;

impl Flyweight for Dust {
    fn name(&self) -> &str {
        "dust"
    }
}

struct DustLifecycle;

impl Lifecycle for DustLifecycle {
    type Flyweight = Dust;
    type Handle = Body;
    type Params = Vec2;

    fn construct(&mut self, _flyweight: &Dust, _params: &Vec2) -> PoolResult<Body> {
        Ok(Body::new(BodyState::default()))
    }

    fn common_initialize(&mut self, _flyweight: &Dust, handle: &Body, position: &Vec2) {
        handle.set_position(*position);
        handle.set_velocity(Vec2::new(1.0, 0.5));
    }
}

/// Consumers hold their pool weakly, so the pool is returned with the arena.
fn arena(count: usize) -> (RewindCoordinator, SharedPool<DustLifecycle>, Vec<Body>) {
    let mut rewind = RewindCoordinator::new(RewindConfig::default()).unwrap();
    let pool = ObjectPool::new(Arc::new(Dust), DustLifecycle).shared();
    let mut bodies = Vec::with_capacity(count);
    for i in 0..count {
        let handle = pool.lock().create(Vec2::new(i as f32, 0.0)).unwrap().handle;
        track_pooled(&mut rewind, &pool, &handle);
        bodies.push(handle);
    }
    (rewind, pool, bodies)
}

fn bench_pool_churn(c: &mut Criterion) {
    let mut pool = ObjectPool::new(Arc::new(Dust), DustLifecycle);
    pool.prewarm(256, &Vec2::ZERO).unwrap();

    c.bench_function("pool_create_store", |b| {
        b.iter(|| {
            let spawn = pool.create(black_box(Vec2::new(1.0, 2.0))).unwrap();
            pool.store(&spawn.handle).unwrap();
        });
    });
}

fn bench_capture_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("capture_pass");

    for count in ARENA_SIZES {
        let (mut rewind, _pool, _bodies) = arena(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            // One capture interval per iteration
            b.iter(|| rewind.tick(black_box(0.1)));
        });
    }

    group.finish();
}

fn bench_rewind_pass(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewind_pass");

    for count in ARENA_SIZES {
        let (mut rewind, _pool, bodies) = arena(count);
        for _ in 0..250 {
            for body in &bodies {
                body.set_position(body.position() + body.velocity() * 0.02);
            }
            rewind.tick(0.02);
        }
        rewind.set_rewind_target(2.55);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| rewind.tick(black_box(0.02)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pool_churn, bench_capture_pass, bench_rewind_pass);
criterion_main!(benches);
