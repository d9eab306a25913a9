//! # Persistence Hook
//!
//! Save-game plumbing, independent of rewind. Actor types register a
//! producer per constructed handle and one loader per kind; the hub turns
//! live actors into serializable records and dispatches records back to the
//! loaders. The on-disk format belongs to the caller.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::memento::Snapshot;

/// Reads the saveable state of one actor.
pub type SaveProducer = Box<dyn FnMut() -> Snapshot + Send>;

/// Recreates one actor of a kind from its saved state.
pub type Loader = Box<dyn FnMut(&Snapshot) -> CoreResult<()> + Send>;

/// Identity of one registered producer, in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaveId(u64);

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "save#{}", self.0)
    }
}

/// One saved actor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedActor {
    /// Actor type, used to pick the loader.
    pub kind: String,
    /// State at save time.
    pub snapshot: Snapshot,
}

/// Registry of save producers and load callbacks.
#[derive(Default)]
pub struct PersistenceHub {
    producers: BTreeMap<SaveId, (String, SaveProducer)>,
    loaders: HashMap<String, Loader>,
    next_id: u64,
}

impl PersistenceHub {
    /// Creates an empty hub.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a producer for one constructed actor.
    ///
    /// Keep the returned id to [`Self::unregister`] the actor once it is
    /// destroyed.
    pub fn register<P>(&mut self, kind: impl Into<String>, producer: P) -> SaveId
    where
        P: FnMut() -> Snapshot + Send + 'static,
    {
        let id = SaveId(self.next_id);
        self.next_id += 1;
        self.producers.insert(id, (kind.into(), Box::new(producer)));
        id
    }

    /// Drops the producer of a destroyed actor. Returns false if unknown.
    pub fn unregister(&mut self, id: SaveId) -> bool {
        self.producers.remove(&id).is_some()
    }

    /// Sets the loader for one kind, replacing any previous one.
    pub fn on_load<F>(&mut self, kind: impl Into<String>, loader: F)
    where
        F: FnMut(&Snapshot) -> CoreResult<()> + Send + 'static,
    {
        self.loaders.insert(kind.into(), Box::new(loader));
    }

    /// Polls every producer. Disabled actors are not saved.
    pub fn collect(&mut self) -> Vec<SavedActor> {
        self.producers
            .values_mut()
            .filter_map(|(kind, producer)| {
                let snapshot = producer();
                snapshot.enabled.then(|| SavedActor {
                    kind: kind.clone(),
                    snapshot,
                })
            })
            .collect()
    }

    /// Dispatches saved records to their loaders.
    ///
    /// Records of a kind with no loader are skipped. Returns the number of
    /// actors restored.
    ///
    /// # Errors
    ///
    /// Stops at the first loader failure.
    pub fn restore(&mut self, records: &[SavedActor]) -> CoreResult<usize> {
        let mut restored = 0;
        for record in records {
            let Some(loader) = self.loaders.get_mut(&record.kind) else {
                tracing::warn!("No loader for saved {}", record.kind);
                continue;
            };
            loader(&record.snapshot)?;
            restored += 1;
        }
        tracing::debug!("Restored {} of {} saved actors", restored, records.len());
        Ok(restored)
    }

    /// Number of registered producers.
    #[inline]
    #[must_use]
    pub fn producer_count(&self) -> usize {
        self.producers.len()
    }
}
