//! # ASTEROIDS Core Engine
//!
//! The recyclable-entity lifecycle engine:
//! - A generic object pool that amortizes allocation for actors that are
//!   spawned and destroyed constantly (enemies, projectiles, lasers)
//! - A rewind engine that samples every tracked actor on a fixed cadence and
//!   can roll the simulation back to any instant inside its window,
//!   resurrecting pooled actors and re-absorbing ones that did not exist yet
//!
//! ## Ownership Rules
//!
//! 1. **Stored handles belong to the pool** - gameplay never touches them
//! 2. **Active handles belong to gameplay** - the coordinator only holds
//!    non-owning references through its subscriptions
//! 3. **Ownership moves only through** `create`, `store` and `extract_if_has`
//!
//! ## Example
//!
//! ```rust,ignore
//! use asteroids_core::{ObjectPool, RewindConfig, RewindCoordinator};
//!
//! let mut rewind = RewindCoordinator::new(RewindConfig::default())?;
//! let pool = ObjectPool::new(flyweight, lifecycle).shared();
//!
//! let spawn = pool.lock().create(params)?;
//! if spawn.fresh {
//!     track_pooled(&mut rewind, &pool, &spawn.handle);
//! }
//!
//! // Every fixed step:
//! rewind.tick(dt);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod handle;
pub mod memento;
pub mod persistence;
pub mod pool;
pub mod rewind;

pub use config::{DiscontinuityConfig, RewindConfig, UnderrunPolicy, MAX_HISTORY_CAPACITY};
pub use error::{ConfigError, CoreError, CoreResult, PoolError, PoolResult};
pub use handle::{Body, BodyState, EntityHandle, HandleId};
pub use memento::{interpolate, Discontinuity, HistoryBuffer, Lookup, Snapshot, VariantId};
pub use persistence::{Loader, PersistenceHub, SaveId, SaveProducer, SavedActor};
pub use pool::{Flyweight, Lifecycle, Membership, ObjectPool, PoolStats, SharedPool, Spawn};
pub use rewind::{
    apply_pooled, track_pooled, RewindCoordinator, RewindMode, RewindStats, SubscriptionId,
};
