//! # Subscription Registry
//!
//! Binds each tracked actor to its producer, consumer and interpolator, and
//! owns the actor's history. Records are visited in subscription order.

use std::collections::BTreeMap;
use std::fmt;

use crate::memento::{HistoryBuffer, Lookup};

/// Identity of one subscription.
///
/// Ids grow monotonically, so ordering by id is subscription order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub(crate) u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Reads the actor's current state.
pub type Producer<T> = Box<dyn FnMut() -> T + Send>;
/// Applies a historical state; `None` means the actor did not exist yet.
pub type Consumer<T> = Box<dyn FnMut(Option<T>) + Send>;
/// Blends two samples at a fraction in `[0, 1]`.
pub type Interpolator<T> = Box<dyn Fn(&T, &T, f32) -> T + Send>;

/// What happened to one record during a rewind pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Applied {
    /// No history yet, consumer not called.
    Skipped,
    /// Consumer received a sample.
    Sample,
    /// Consumer was told the actor did not exist.
    Absent,
}

/// Type-erased view of a subscription.
pub(crate) trait Tracked: Send {
    /// Captures the current state. Returns false if the sample was rejected.
    fn capture(&mut self, timestamp: f64) -> bool;

    /// Applies the state at `instant`.
    ///
    /// `absent_from` is set under the report-absent policy: an actor whose
    /// history starts after `instant >= absent_from` and never evicted did
    /// not exist at `instant`.
    fn rewind_to(&mut self, instant: f64, absent_from: Option<f64>) -> Applied;

    /// Drops samples newer than `instant`.
    fn truncate_after(&mut self, instant: f64);

    /// Number of retained samples.
    fn history_len(&self) -> usize;
}

struct Subscription<T> {
    producer: Producer<T>,
    consumer: Consumer<T>,
    interpolator: Interpolator<T>,
    history: HistoryBuffer<T>,
}

impl<T: Clone + Send + 'static> Tracked for Subscription<T> {
    fn capture(&mut self, timestamp: f64) -> bool {
        let sample = (self.producer)();
        self.history.push(timestamp, sample)
    }

    fn rewind_to(&mut self, instant: f64, absent_from: Option<f64>) -> Applied {
        let target = match self.history.lookup(instant) {
            Lookup::Empty => return Applied::Skipped,
            Lookup::BeforeOldest(oldest) => {
                let unborn = absent_from.is_some_and(|from| instant >= from)
                    && !self.history.has_evicted();
                if unborn {
                    None
                } else {
                    Some(oldest.clone())
                }
            }
            Lookup::Between { older, newer, t } => Some((self.interpolator)(older, newer, t)),
            Lookup::AtOrAfterNewest(newest) => Some(newest.clone()),
        };

        let applied = if target.is_some() {
            Applied::Sample
        } else {
            Applied::Absent
        };
        (self.consumer)(target);
        applied
    }

    fn truncate_after(&mut self, instant: f64) {
        self.history.truncate_after(instant);
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }
}

/// Ordered set of subscriptions.
pub(crate) struct Registry {
    records: BTreeMap<SubscriptionId, Box<dyn Tracked>>,
    next_id: u64,
    capacity: usize,
}

impl Registry {
    /// Creates an empty registry whose histories hold `capacity` samples.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            records: BTreeMap::new(),
            next_id: 1,
            capacity,
        }
    }

    /// Adds a record and returns its id.
    pub(crate) fn subscribe<T: Clone + Send + 'static>(
        &mut self,
        producer: Producer<T>,
        consumer: Consumer<T>,
        interpolator: Interpolator<T>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.records.insert(
            id,
            Box::new(Subscription {
                producer,
                consumer,
                interpolator,
                history: HistoryBuffer::new(self.capacity),
            }),
        );
        id
    }

    /// Removes a record. Returns false if it was not present.
    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.records.remove(&id).is_some()
    }

    /// Records in subscription order.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Tracked>> {
        self.records.values_mut()
    }

    /// Looks up one record.
    pub(crate) fn get(&self, id: SubscriptionId) -> Option<&dyn Tracked> {
        self.records.get(&id).map(|record| record.as_ref())
    }

    /// Number of records.
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Drops every record.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }
}
