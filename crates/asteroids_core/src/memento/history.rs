//! # History Buffer
//!
//! Fixed-capacity ring of timestamped samples for one actor.
//!
//! ```text
//! capacity = 5
//!
//!   oldest                    newest
//!     │                         │
//!   [t=1.0][t=1.1][t=1.2][t=1.3][t=1.4]   push(t=1.5) evicts t=1.0
//! ```
//!
//! Timestamps are strictly increasing; a sample that is not newer than the
//! newest one is rejected.

use std::collections::VecDeque;

/// Where an instant falls relative to the retained samples.
#[derive(Debug, PartialEq)]
pub enum Lookup<'a, T> {
    /// Nothing recorded yet.
    Empty,
    /// The instant is older than every retained sample.
    BeforeOldest(&'a T),
    /// The instant lies between two samples; `t` is the fraction of the way
    /// from `older` to `newer`, in `[0, 1)`.
    Between {
        /// Sample at or before the instant.
        older: &'a T,
        /// Sample after the instant.
        newer: &'a T,
        /// Fractional position of the instant.
        t: f32,
    },
    /// The instant is at or after the newest sample.
    AtOrAfterNewest(&'a T),
}

/// Time-ordered ring of samples.
#[derive(Clone, Debug)]
pub struct HistoryBuffer<T> {
    /// Samples, oldest first.
    samples: VecDeque<(f64, T)>,
    /// Maximum number of samples.
    capacity: usize,
    /// Whether a sample has ever been evicted.
    evicted: bool,
}

impl<T> HistoryBuffer<T> {
    /// Creates an empty buffer.
    ///
    /// All memory is allocated upfront.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            evicted: false,
        }
    }

    /// Appends a sample, evicting the oldest when full.
    ///
    /// Returns false, and drops `value`, when `timestamp` is not strictly
    /// newer than the newest sample.
    pub fn push(&mut self, timestamp: f64, value: T) -> bool {
        if let Some(newest) = self.newest_timestamp() {
            if timestamp <= newest {
                return false;
            }
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
            self.evicted = true;
        }
        self.samples.push_back((timestamp, value));
        true
    }

    /// Locates `instant` among the retained samples.
    #[must_use]
    pub fn lookup(&self, instant: f64) -> Lookup<'_, T> {
        if self.samples.is_empty() {
            return Lookup::Empty;
        }

        // First sample strictly newer than the instant
        let after = self.samples.partition_point(|(ts, _)| *ts <= instant);

        if after == 0 {
            return Lookup::BeforeOldest(&self.samples[0].1);
        }
        if after == self.samples.len() {
            return Lookup::AtOrAfterNewest(&self.samples[after - 1].1);
        }

        let (t0, older) = &self.samples[after - 1];
        let (t1, newer) = &self.samples[after];
        let t = ((instant - t0) / (t1 - t0)) as f32;

        Lookup::Between { older, newer, t }
    }

    /// Discards every sample newer than `instant`.
    pub fn truncate_after(&mut self, instant: f64) {
        let keep = self.samples.partition_point(|(ts, _)| *ts <= instant);
        self.samples.truncate(keep);
    }

    /// Oldest retained sample.
    #[must_use]
    pub fn oldest(&self) -> Option<(f64, &T)> {
        self.samples.front().map(|(ts, v)| (*ts, v))
    }

    /// Newest retained sample.
    #[must_use]
    pub fn newest(&self) -> Option<(f64, &T)> {
        self.samples.back().map(|(ts, v)| (*ts, v))
    }

    /// Timestamp of the newest sample.
    #[inline]
    #[must_use]
    pub fn newest_timestamp(&self) -> Option<f64> {
        self.samples.back().map(|(ts, _)| *ts)
    }

    /// Whether the buffer ever dropped a sample to make room.
    #[inline]
    #[must_use]
    pub const fn has_evicted(&self) -> bool {
        self.evicted
    }

    /// Number of retained samples.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true when nothing is retained.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterates samples oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &T)> {
        self.samples.iter().map(|(ts, v)| (*ts, v))
    }
}
