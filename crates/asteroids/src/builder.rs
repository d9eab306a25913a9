//! # Actor Builder
//!
//! One per actor type. Owns the type's pool and enrolls every freshly
//! constructed handle with the rewind coordinator and the persistence hook,
//! exactly once per physical handle.
//!
//! ```text
//!   create ──► pool.create ──► fresh? ──► track_pooled (rewind)
//!                                   └───► register producer (save)
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use asteroids_core::{
    track_pooled, EntityHandle, HandleId, Lifecycle, ObjectPool, PersistenceHub, PoolStats,
    RewindCoordinator, SaveId, SharedPool, Snapshot, SubscriptionId,
};
use parking_lot::Mutex;

use crate::error::GameResult;

/// Pool of one actor type wired to rewind and persistence.
pub struct ActorBuilder<L: Lifecycle> {
    /// Persistence kind, unique per builder.
    kind: String,
    /// The type's pool.
    pool: SharedPool<L>,
    /// Every handle ever enrolled, active or stored.
    roster: Vec<L::Handle>,
    /// Rewind subscription per handle.
    subscriptions: HashMap<HandleId, SubscriptionId>,
    /// Save producer per handle.
    saves: HashMap<HandleId, SaveId>,
    /// Handles constructed by a save loader, not enrolled yet.
    restored: Arc<Mutex<Vec<L::Handle>>>,
}

impl<L: Lifecycle> ActorBuilder<L> {
    /// Creates a builder with an empty pool.
    pub fn new(kind: impl Into<String>, flyweight: Arc<L::Flyweight>, lifecycle: L) -> Self {
        Self {
            kind: kind.into(),
            pool: ObjectPool::new(flyweight, lifecycle).shared(),
            roster: Vec::new(),
            subscriptions: HashMap::new(),
            saves: HashMap::new(),
            restored: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Hands out an active handle, enrolling it when freshly constructed.
    ///
    /// # Errors
    ///
    /// Propagates construction failures.
    pub fn create(
        &mut self,
        rewind: &mut RewindCoordinator,
        persistence: &mut PersistenceHub,
        params: L::Params,
    ) -> GameResult<L::Handle> {
        let spawn = self.pool.lock().create(params)?;
        if spawn.fresh {
            self.enroll(rewind, persistence, &spawn.handle);
        }
        Ok(spawn.handle)
    }

    /// Returns an active handle to the pool.
    ///
    /// # Errors
    ///
    /// Fails when the handle is not active in this pool.
    pub fn store(&self, handle: &L::Handle) -> GameResult<()> {
        self.pool.lock().store(handle)?;
        Ok(())
    }

    /// Takes a stored handle back without initializing it.
    ///
    /// # Errors
    ///
    /// Fails when the handle does not belong to this pool.
    pub fn extract_if_has(&self, handle: &L::Handle) -> GameResult<bool> {
        Ok(self.pool.lock().extract_if_has(handle)?)
    }

    /// Constructs and enrolls `count` stored handles ahead of time.
    ///
    /// # Errors
    ///
    /// Stops at the first construction failure.
    pub fn prewarm(
        &mut self,
        rewind: &mut RewindCoordinator,
        persistence: &mut PersistenceHub,
        count: usize,
        params: &L::Params,
    ) -> GameResult<()> {
        let built = self.pool.lock().prewarm(count, params)?;
        for handle in &built {
            self.enroll(rewind, persistence, handle);
        }
        Ok(())
    }

    /// Permanently removes a handle from the pool, the rewind window and
    /// the save set.
    pub fn destroy(
        &mut self,
        rewind: &mut RewindCoordinator,
        persistence: &mut PersistenceHub,
        handle: &L::Handle,
    ) -> bool {
        let id = handle.id();
        if !self.pool.lock().destroy(handle) {
            return false;
        }
        if let Some(subscription) = self.subscriptions.remove(&id) {
            rewind.unsubscribe(subscription);
        }
        if let Some(save) = self.saves.remove(&id) {
            persistence.unregister(save);
        }
        self.roster.retain(|h| h.id() != id);
        true
    }

    /// Registers the save loader of this actor type.
    ///
    /// The loader creates a handle from the pool and writes the saved state
    /// onto it. Handles it constructs are enrolled by
    /// [`Self::enroll_restored`].
    pub fn register_loader<F>(&self, persistence: &mut PersistenceHub, make_params: F)
    where
        F: Fn(&Snapshot) -> L::Params + Send + 'static,
    {
        let pool = Arc::downgrade(&self.pool);
        let restored = Arc::clone(&self.restored);
        persistence.on_load(self.kind.clone(), move |snapshot: &Snapshot| {
            let Some(pool) = pool.upgrade() else {
                return Ok(());
            };
            let spawn = pool.lock().create(make_params(snapshot))?;
            snapshot.write_fields(&spawn.handle);
            if spawn.fresh {
                restored.lock().push(spawn.handle);
            }
            Ok(())
        });
    }

    /// Enrolls handles constructed by the save loader. Returns how many.
    pub fn enroll_restored(&mut self, rewind: &mut RewindCoordinator, persistence: &mut PersistenceHub) -> usize {
        let restored = std::mem::take(&mut *self.restored.lock());
        for handle in &restored {
            self.enroll(rewind, persistence, handle);
        }
        restored.len()
    }

    /// Replaces the shared configuration for subsequent initializations.
    pub fn set_flyweight(&self, flyweight: Arc<L::Flyweight>) {
        self.pool.lock().set_flyweight(flyweight);
    }

    /// Handles currently in the simulation.
    pub fn active(&self) -> impl Iterator<Item = &L::Handle> {
        self.roster.iter().filter(|h| h.enabled())
    }

    /// Every enrolled handle, active or stored.
    #[inline]
    #[must_use]
    pub fn roster(&self) -> &[L::Handle] {
        &self.roster
    }

    /// Persistence kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The underlying pool.
    #[inline]
    #[must_use]
    pub fn pool(&self) -> &SharedPool<L> {
        &self.pool
    }

    /// Pool counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.pool.lock().stats()
    }

    fn enroll(&mut self, rewind: &mut RewindCoordinator, persistence: &mut PersistenceHub, handle: &L::Handle) {
        let subscription = track_pooled(rewind, &self.pool, handle);
        self.subscriptions.insert(handle.id(), subscription);

        let saved = handle.clone();
        let save = persistence.register(self.kind.clone(), move || Snapshot::capture(&saved));
        self.saves.insert(handle.id(), save);

        self.roster.push(handle.clone());
        tracing::debug!("{}: enrolled {} as {}", self.kind, handle.id(), subscription);
    }
}
