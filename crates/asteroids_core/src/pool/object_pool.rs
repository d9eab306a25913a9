//! # Object Pool
//!
//! Generic recycler for one actor type.
//!
//! ## Transitions
//!
//! | Operation        | From            | To     | Hooks run                              |
//! |------------------|-----------------|--------|----------------------------------------|
//! | `create`         | Stored / (none) | Active | construct?, initialize, common_initialize |
//! | `store`          | Active          | Stored | deinitialize                           |
//! | `extract_if_has` | Stored          | Active | none                                   |
//!
//! Every handle the pool knows is in exactly one of the two states; a stored
//! handle sits in the free list exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::lifecycle::{Flyweight, Lifecycle};
use crate::error::{PoolError, PoolResult};
use crate::handle::{EntityHandle, HandleId};

/// Who currently owns a handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Membership {
    /// In the simulation, owned by gameplay.
    Active,
    /// Disabled, owned by the pool, eligible for reuse.
    Stored,
}

/// A handle handed out by [`ObjectPool::create`].
#[derive(Clone, Debug)]
pub struct Spawn<H> {
    /// The enabled, fully configured handle.
    pub handle: H,
    /// True when the construction callback ran for this call; the caller
    /// registers fresh handles with the rewind and persistence systems.
    pub fresh: bool,
}

/// Counters describing a pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Handles ever constructed.
    pub constructed: usize,
    /// Handles currently active.
    pub active: usize,
    /// Handles currently in the free list.
    pub stored: usize,
    /// Successful `create` calls.
    pub created: usize,
    /// `create` calls served from the free list.
    pub reused: usize,
    /// Handles pulled out of the free list by `extract_if_has`.
    pub extracted: usize,
}

/// A pool shared between gameplay and rewind consumers.
///
/// One mutex per pool; never hold the lock while ticking the rewind
/// coordinator.
pub type SharedPool<L> = Arc<Mutex<ObjectPool<L>>>;

/// Recycler of handles for one actor type.
///
/// # Thread Safety
///
/// The pool itself is not synchronized. Share it as a [`SharedPool`].
///
/// # Example
///
/// ```rust,ignore
/// let mut pool = ObjectPool::new(Arc::new(flyweight), EnemyLifecycle::new(seed));
///
/// // First call constructs, later calls reuse stored handles
/// let spawn = pool.create(params)?;
///
/// // Back into the free list, disabled
/// pool.store(&spawn.handle)?;
/// ```
pub struct ObjectPool<L: Lifecycle> {
    /// Shared per-type configuration.
    flyweight: Arc<L::Flyweight>,
    /// Construction and reset hooks.
    lifecycle: L,
    /// Stored handles, most recently stored last.
    free_list: Vec<L::Handle>,
    /// State of every handle this pool ever constructed and still owns.
    membership: HashMap<HandleId, Membership>,
    /// Running counters.
    stats: PoolStats,
}

impl<L: Lifecycle> ObjectPool<L> {
    /// Creates an empty pool.
    ///
    /// # Arguments
    ///
    /// * `flyweight` - Configuration shared by every instance
    /// * `lifecycle` - Hooks for this actor type
    #[must_use]
    pub fn new(flyweight: Arc<L::Flyweight>, lifecycle: L) -> Self {
        Self {
            flyweight,
            lifecycle,
            free_list: Vec::new(),
            membership: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Wraps the pool for sharing with rewind consumers.
    #[must_use]
    pub fn shared(self) -> SharedPool<L> {
        Arc::new(Mutex::new(self))
    }

    /// Hands out an enabled, fully configured handle.
    ///
    /// Reuses a stored handle when one is available, otherwise runs the
    /// construction callback.
    ///
    /// # Errors
    ///
    /// Propagates construction failures; nothing is recorded in that case.
    pub fn create(&mut self, params: L::Params) -> PoolResult<Spawn<L::Handle>> {
        let (handle, fresh) = match self.free_list.pop() {
            Some(handle) => {
                self.stats.reused += 1;
                (handle, false)
            }
            None => (self.construct(&params)?, true),
        };

        self.membership.insert(handle.id(), Membership::Active);
        self.lifecycle.initialize(&self.flyweight, &handle, &params);
        self.lifecycle.common_initialize(&self.flyweight, &handle, &params);
        self.stats.created += 1;

        Ok(Spawn { handle, fresh })
    }

    /// Disables an active handle and puts it in the free list.
    ///
    /// # Errors
    ///
    /// [`PoolError::AlreadyStored`] or [`PoolError::UnknownHandle`]; the
    /// pool is left untouched.
    pub fn store(&mut self, handle: &L::Handle) -> PoolResult<()> {
        let id = handle.id();
        match self.membership.get(&id).copied() {
            Some(Membership::Active) => {
                self.lifecycle.deinitialize(handle);
                self.membership.insert(id, Membership::Stored);
                self.free_list.push(handle.clone());
                Ok(())
            }
            Some(Membership::Stored) => {
                tracing::warn!("{}: store of already stored handle {}", self.flyweight.name(), id);
                Err(PoolError::AlreadyStored(id))
            }
            None => {
                tracing::warn!("{}: store of foreign handle {}", self.flyweight.name(), id);
                Err(PoolError::UnknownHandle(id))
            }
        }
    }

    /// Takes a stored handle back without running any initialization.
    ///
    /// The caller becomes responsible for the handle's full state. Returns
    /// `Ok(true)` when the handle was in the free list, `Ok(false)` when it
    /// was already active.
    ///
    /// # Errors
    ///
    /// [`PoolError::UnknownHandle`] when the pool does not own the handle.
    pub fn extract_if_has(&mut self, handle: &L::Handle) -> PoolResult<bool> {
        let id = handle.id();
        match self.membership.get(&id).copied() {
            Some(Membership::Active) => Ok(false),
            Some(Membership::Stored) => {
                if let Some(index) = self.free_list.iter().position(|h| h.id() == id) {
                    self.free_list.remove(index);
                }
                self.membership.insert(id, Membership::Active);
                self.stats.extracted += 1;
                Ok(true)
            }
            None => {
                tracing::warn!("{}: extract of foreign handle {}", self.flyweight.name(), id);
                Err(PoolError::UnknownHandle(id))
            }
        }
    }

    /// Constructs `count` handles up front and stores them.
    ///
    /// Returns the new handles so the caller can register them.
    ///
    /// # Errors
    ///
    /// Stops at the first construction failure; handles built before it stay
    /// stored.
    pub fn prewarm(&mut self, count: usize, params: &L::Params) -> PoolResult<Vec<L::Handle>> {
        let mut built = Vec::with_capacity(count);
        for _ in 0..count {
            let handle = self.construct(params)?;
            self.lifecycle.deinitialize(&handle);
            self.membership.insert(handle.id(), Membership::Stored);
            self.free_list.push(handle.clone());
            built.push(handle);
        }
        Ok(built)
    }

    /// Permanently forgets a handle, active or stored.
    ///
    /// Returns false when the pool did not own it.
    pub fn destroy(&mut self, handle: &L::Handle) -> bool {
        let id = handle.id();
        match self.membership.remove(&id) {
            Some(Membership::Stored) => {
                self.free_list.retain(|h| h.id() != id);
                true
            }
            Some(Membership::Active) => {
                self.lifecycle.deinitialize(handle);
                true
            }
            None => false,
        }
    }

    /// State of a handle, `None` when the pool does not own it.
    #[inline]
    #[must_use]
    pub fn membership(&self, handle: &L::Handle) -> Option<Membership> {
        self.membership.get(&handle.id()).copied()
    }

    /// Returns true when the handle sits in the free list.
    #[inline]
    #[must_use]
    pub fn is_stored(&self, handle: &L::Handle) -> bool {
        self.membership(handle) == Some(Membership::Stored)
    }

    /// Returns true when the handle is owned by gameplay.
    #[inline]
    #[must_use]
    pub fn is_active(&self, handle: &L::Handle) -> bool {
        self.membership(handle) == Some(Membership::Active)
    }

    /// Number of stored handles.
    #[inline]
    #[must_use]
    pub fn stored_count(&self) -> usize {
        self.free_list.len()
    }

    /// Number of active handles.
    #[inline]
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.membership.len() - self.free_list.len()
    }

    /// Current counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active_count(),
            stored: self.stored_count(),
            ..self.stats
        }
    }

    /// Shared configuration used for the next initializations.
    #[inline]
    #[must_use]
    pub fn flyweight(&self) -> &Arc<L::Flyweight> {
        &self.flyweight
    }

    /// Replaces the shared configuration.
    pub fn set_flyweight(&mut self, flyweight: Arc<L::Flyweight>) {
        self.flyweight = flyweight;
    }

    /// The lifecycle hooks.
    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> &L {
        &self.lifecycle
    }

    /// Mutable access to the lifecycle hooks.
    #[inline]
    pub fn lifecycle_mut(&mut self) -> &mut L {
        &mut self.lifecycle
    }

    /// Runs the construction callback and checks the identity is new.
    fn construct(&mut self, params: &L::Params) -> PoolResult<L::Handle> {
        let handle = self.lifecycle.construct(&self.flyweight, params)?;
        let id = handle.id();
        if self.membership.contains_key(&id) {
            return Err(PoolError::DuplicateHandle(id));
        }
        self.stats.constructed += 1;
        tracing::debug!(
            "{}: constructed handle {} ({} total)",
            self.flyweight.name(),
            id,
            self.stats.constructed
        );
        Ok(handle)
    }
}
