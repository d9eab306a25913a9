//! # Object Pooling
//!
//! Recycles disabled actors instead of reallocating them.
//!
//! ## Design Philosophy
//!
//! Every physical handle is constructed at most once. After that it only
//! moves between two states:
//! - `Active`: in the simulation, owned by gameplay
//! - `Stored`: disabled, owned by the pool, waiting for reuse

mod lifecycle;
mod object_pool;

pub use lifecycle::{Flyweight, Lifecycle};
pub use object_pool::{Membership, ObjectPool, PoolStats, SharedPool, Spawn};
