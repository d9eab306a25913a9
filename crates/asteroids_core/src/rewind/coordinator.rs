//! # Rewind Coordinator
//!
//! One per simulation session. Samples every subscribed actor on a fixed
//! cadence while recording, and replays interpolated history while
//! rewinding.
//!
//! ```text
//!              begin_rewind / set_rewind_target
//!   ┌───────────┐ ─────────────────────────────► ┌───────────┐
//!   │ Recording │                                │ Rewinding │
//!   └───────────┘ ◄───────────────────────────── └───────────┘
//!     tick: capture         end_rewind             tick: apply
//! ```
//!
//! The coordinator does not stop physics. Movement, wrapping and weapon
//! logic check [`RewindCoordinator::is_rewinding`] and stand still.
//!
//! Consumers of pooled actors lock their pool while applying; callers must
//! not hold any pool lock across [`RewindCoordinator::tick`].

use crate::config::{RewindConfig, UnderrunPolicy};
use crate::error::ConfigError;
use crate::memento::{Discontinuity, HistoryBuffer};

use super::registry::{Applied, Registry, SubscriptionId};

/// Slack when comparing the capture accumulator against the interval.
const CADENCE_EPSILON: f64 = 1e-6;

/// Current mode of the coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RewindMode {
    /// Capturing history every interval.
    Recording,
    /// Applying historical states every tick.
    Rewinding,
}

/// Counters describing the coordinator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewindStats {
    /// Capture passes run.
    pub capture_passes: u64,
    /// Samples appended to histories.
    pub samples: u64,
    /// Samples rejected for a non-increasing timestamp.
    pub rejected: u64,
    /// Rewind passes run.
    pub rewind_passes: u64,
    /// Consumers that received a historical sample.
    pub applied: u64,
    /// Consumers told their actor did not exist yet.
    pub absent: u64,
    /// Records skipped for lack of history.
    pub skipped: u64,
}

/// Process-wide rewind scheduler, constructed once per session.
///
/// # Example
///
/// ```rust,ignore
/// let mut rewind = RewindCoordinator::new(RewindConfig::default())?;
/// let id = rewind.subscribe(producer, consumer, interpolator);
///
/// // Every fixed step, records while not rewinding
/// rewind.tick(dt);
///
/// // Player holds the rewind button
/// rewind.begin_rewind();
/// rewind.step_rewind(dt);
/// rewind.tick(dt);
/// rewind.end_rewind();
/// ```
pub struct RewindCoordinator {
    /// Cadence, window and policies.
    config: RewindConfig,
    /// Tracked actors.
    registry: Registry,
    /// Current mode.
    mode: RewindMode,
    /// Simulation time in seconds.
    clock: f64,
    /// Time accumulated since the last capture pass.
    since_capture: f64,
    /// Timestamps of the retained capture passes.
    passes: HistoryBuffer<()>,
    /// Timestamp of the first capture pass of the session.
    first_capture: Option<f64>,
    /// Clock value when the current rewind began.
    rewind_from: f64,
    /// Seconds back from `rewind_from` being applied.
    offset: f64,
    /// Running counters.
    stats: RewindStats,
}

impl RewindCoordinator {
    /// Creates a coordinator in recording mode at time zero.
    ///
    /// # Errors
    ///
    /// Rejects an invalid configuration.
    pub fn new(config: RewindConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let capacity = config.history_capacity();
        Ok(Self {
            config,
            registry: Registry::new(capacity),
            mode: RewindMode::Recording,
            clock: 0.0,
            since_capture: 0.0,
            passes: HistoryBuffer::new(capacity),
            first_capture: None,
            rewind_from: 0.0,
            offset: 0.0,
            stats: RewindStats::default(),
        })
    }

    // =========================================================================
    // SUBSCRIPTIONS
    // =========================================================================

    /// Starts tracking an actor.
    ///
    /// The record gets no sample until the next capture pass; until then
    /// rewinds skip it.
    ///
    /// # Arguments
    ///
    /// * `producer` - Reads the actor's current state
    /// * `consumer` - Applies a historical state (`None`: did not exist yet)
    /// * `interpolator` - Blends two samples at a fraction in `[0, 1]`
    pub fn subscribe<T, P, C, I>(&mut self, producer: P, consumer: C, interpolator: I) -> SubscriptionId
    where
        T: Clone + Send + 'static,
        P: FnMut() -> T + Send + 'static,
        C: FnMut(Option<T>) + Send + 'static,
        I: Fn(&T, &T, f32) -> T + Send + 'static,
    {
        self.registry
            .subscribe(Box::new(producer), Box::new(consumer), Box::new(interpolator))
    }

    /// Stops tracking an actor and drops its history.
    ///
    /// Only for permanently destroyed actors; pooled actors stay subscribed
    /// so a rewind can bring them back.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.registry.unsubscribe(id)
    }

    /// Number of tracked actors.
    #[inline]
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.registry.len()
    }

    /// Number of samples retained for one actor.
    #[must_use]
    pub fn history_len(&self, id: SubscriptionId) -> Option<usize> {
        self.registry.get(id).map(|record| record.history_len())
    }

    // =========================================================================
    // TICKING
    // =========================================================================

    /// Advances one fixed step.
    ///
    /// While recording, advances the clock and captures when a capture
    /// interval has elapsed. While rewinding, the clock stands still and
    /// every record is set to its state at [`Self::target_instant`].
    pub fn tick(&mut self, dt: f32) {
        match self.mode {
            RewindMode::Recording => {
                let dt = f64::from(dt.max(0.0));
                let interval = self.config.interval();
                self.clock += dt;
                self.since_capture += dt;
                if self.since_capture + CADENCE_EPSILON >= interval {
                    self.since_capture = (self.since_capture - interval).max(0.0) % interval;
                    self.capture_pass();
                }
            }
            RewindMode::Rewinding => self.rewind_pass(),
        }
    }

    /// Captures every record right now, outside the cadence.
    ///
    /// Does nothing while rewinding. Returns the number of samples kept.
    pub fn capture_now(&mut self) -> usize {
        if self.mode == RewindMode::Rewinding {
            return 0;
        }
        self.capture_pass()
    }

    fn capture_pass(&mut self) -> usize {
        let timestamp = self.clock;
        if !self.passes.push(timestamp, ()) {
            // A pass already ran at this instant
            return 0;
        }
        self.first_capture.get_or_insert(timestamp);

        let mut kept = 0;
        for record in self.registry.iter_mut() {
            if record.capture(timestamp) {
                kept += 1;
            } else {
                self.stats.rejected += 1;
                tracing::warn!("Rejected stale sample at t={:.3}", timestamp);
            }
        }

        self.stats.capture_passes += 1;
        self.stats.samples += kept as u64;
        tracing::trace!("Captured {} actors at t={:.3}", kept, timestamp);
        kept
    }

    fn rewind_pass(&mut self) {
        let Some(instant) = self.target_instant() else {
            return;
        };
        let absent_from = match self.config.underrun {
            UnderrunPolicy::Clamp => None,
            UnderrunPolicy::ReportAbsent => self.first_capture,
        };

        for record in self.registry.iter_mut() {
            match record.rewind_to(instant, absent_from) {
                Applied::Sample => self.stats.applied += 1,
                Applied::Absent => self.stats.absent += 1,
                Applied::Skipped => self.stats.skipped += 1,
            }
        }

        self.stats.rewind_passes += 1;
        tracing::trace!("Applied t={:.3} to {} actors", instant, self.registry.len());
    }

    // =========================================================================
    // REWIND CONTROL
    // =========================================================================

    /// Switches to rewinding, targeting the present instant.
    ///
    /// Does nothing when already rewinding.
    pub fn begin_rewind(&mut self) {
        if self.mode == RewindMode::Rewinding {
            return;
        }
        self.mode = RewindMode::Rewinding;
        self.rewind_from = self.clock;
        self.offset = 0.0;
        tracing::info!(
            "Rewind started at t={:.3} ({} actors tracked)",
            self.clock,
            self.registry.len()
        );
    }

    /// Targets the instant `offset` seconds before the rewind began,
    /// entering rewind mode if needed.
    ///
    /// Negative offsets clamp to zero; offsets reaching past the retained
    /// window clamp to its oldest capture.
    pub fn set_rewind_target(&mut self, offset: f32) {
        self.begin_rewind();
        self.offset = if offset.is_finite() { f64::from(offset.max(0.0)) } else { 0.0 };
        tracing::debug!("Rewind target set to {:.3}s back", self.offset);
    }

    /// Moves the target further back by `dt` scaled by the rewind speed.
    ///
    /// Used for hold-to-rewind playback. Does nothing while recording.
    pub fn step_rewind(&mut self, dt: f32) {
        if self.mode == RewindMode::Rewinding {
            self.offset += f64::from(dt.max(0.0) * self.config.rewind_speed);
        }
    }

    /// Returns to recording from the rewound instant.
    ///
    /// The clock is rebased to that instant and samples newer than it are
    /// discarded; older history is kept, so later captures record the
    /// rewound state as ground truth.
    pub fn end_rewind(&mut self) {
        if self.mode == RewindMode::Recording {
            return;
        }
        let instant = self.target_instant().unwrap_or(self.clock);

        for record in self.registry.iter_mut() {
            record.truncate_after(instant);
        }
        self.passes.truncate_after(instant);

        self.clock = instant;
        self.since_capture = 0.0;
        self.offset = 0.0;
        self.mode = RewindMode::Recording;
        tracing::info!(
            "Rewind ended at t={:.3} ({:.3}s rewound)",
            instant,
            self.rewind_from - instant
        );
    }

    /// Instant currently applied while rewinding, `None` while recording.
    ///
    /// Clamped to the retained window.
    #[must_use]
    pub fn target_instant(&self) -> Option<f64> {
        if self.mode != RewindMode::Rewinding {
            return None;
        }
        let wanted = self.rewind_from - self.offset;
        let oldest = self.passes.oldest().map_or(wanted, |(ts, ())| ts);
        Some(wanted.max(oldest).min(self.rewind_from))
    }

    // =========================================================================
    // STATE
    // =========================================================================

    /// Returns true while rewinding. Movement must be suspended meanwhile.
    #[inline]
    #[must_use]
    pub fn is_rewinding(&self) -> bool {
        self.mode == RewindMode::Rewinding
    }

    /// Current mode.
    #[inline]
    #[must_use]
    pub const fn mode(&self) -> RewindMode {
        self.mode
    }

    /// Simulation time in seconds.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Active configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &RewindConfig {
        &self.config
    }

    /// Teleport thresholds for snapshot interpolators.
    #[must_use]
    pub fn discontinuity(&self) -> Discontinuity {
        Discontinuity::from(self.config.discontinuity)
    }

    /// Current counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> RewindStats {
        self.stats
    }

    /// Ends the session: drops every subscription and its history.
    pub fn shutdown(&mut self) {
        let dropped = self.registry.len();
        self.registry.clear();
        self.mode = RewindMode::Recording;
        self.offset = 0.0;
        tracing::info!("Rewind session closed ({} subscriptions dropped)", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn coordinator(cps: u32, window: f32) -> RewindCoordinator {
        RewindCoordinator::new(RewindConfig {
            captures_per_second: cps,
            window_seconds: window,
            ..RewindConfig::default()
        })
        .unwrap()
    }

    /// Tracks a scalar; returns (source, applied values).
    fn track(rewind: &mut RewindCoordinator) -> (Arc<Mutex<f32>>, Arc<Mutex<Vec<Option<f32>>>>) {
        let source = Arc::new(Mutex::new(0.0_f32));
        let sink = Arc::new(Mutex::new(Vec::new()));
        let (s, k) = (source.clone(), sink.clone());
        rewind.subscribe(
            move || *s.lock().unwrap(),
            move |v: Option<f32>| k.lock().unwrap().push(v),
            |a: &f32, b: &f32, t: f32| a + (b - a) * t,
        );
        (source, sink)
    }

    #[test]
    fn test_captures_on_cadence() {
        let mut rewind = coordinator(10, 5.0);
        let (_, _) = track(&mut rewind);

        // 50 Hz steps, 10 captures per second
        for _ in 0..50 {
            rewind.tick(0.02);
        }
        assert_eq!(rewind.stats().capture_passes, 10);
        assert!((rewind.clock() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut rewind = coordinator(10, 1.0);
        let (_, _) = track(&mut rewind);
        let id = SubscriptionId(1);

        for _ in 0..100 {
            rewind.tick(0.1);
        }
        assert_eq!(rewind.history_len(id), Some(10));
    }

    #[test]
    fn test_rewind_interpolates() {
        let mut rewind = coordinator(10, 5.0);
        let (source, sink) = track(&mut rewind);

        for step in 1..=20 {
            *source.lock().unwrap() = step as f32;
            rewind.tick(0.1);
        }

        rewind.set_rewind_target(0.55);
        rewind.tick(0.1);

        let applied = sink.lock().unwrap().clone();
        assert_eq!(applied.len(), 1);
        let value = applied[0].unwrap();
        assert!((value - 14.5).abs() < 1e-3, "got {value}");
    }

    #[test]
    fn test_clock_frozen_while_rewinding() {
        let mut rewind = coordinator(10, 5.0);
        for _ in 0..10 {
            rewind.tick(0.1);
        }
        rewind.begin_rewind();
        let before = rewind.clock();
        for _ in 0..10 {
            rewind.tick(0.1);
        }
        assert_eq!(rewind.clock(), before);
        assert_eq!(rewind.stats().capture_passes, 10);
        assert!(rewind.is_rewinding());
    }

    #[test]
    fn test_target_clamps_to_window() {
        let mut rewind = coordinator(10, 1.0);
        for _ in 0..30 {
            rewind.tick(0.1);
        }
        rewind.set_rewind_target(100.0);

        let oldest = rewind.target_instant().unwrap();
        assert!((oldest - 2.1).abs() < 1e-6, "got {oldest}");

        rewind.set_rewind_target(-3.0);
        assert_eq!(rewind.target_instant(), Some(rewind.clock()));
    }

    #[test]
    fn test_end_rewind_rebases_clock() {
        let mut rewind = coordinator(10, 5.0);
        let (source, _) = track(&mut rewind);
        for step in 1..=30 {
            *source.lock().unwrap() = step as f32;
            rewind.tick(0.1);
        }

        rewind.set_rewind_target(1.0);
        rewind.tick(0.1);
        rewind.end_rewind();

        assert!(!rewind.is_rewinding());
        assert!((rewind.clock() - 2.0).abs() < 1e-6);
        // Samples up to t=2.0 survive
        assert_eq!(rewind.history_len(SubscriptionId(1)), Some(20));

        rewind.tick(0.1);
        assert_eq!(rewind.history_len(SubscriptionId(1)), Some(21));
        assert_eq!(rewind.stats().rejected, 0);
    }

    #[test]
    fn test_step_rewind_moves_target_back() {
        let mut rewind = coordinator(10, 5.0);
        for _ in 0..30 {
            rewind.tick(0.1);
        }
        rewind.begin_rewind();
        rewind.step_rewind(0.5);
        rewind.step_rewind(0.5);

        let instant = rewind.target_instant().unwrap();
        assert!((instant - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_fresh_subscription_is_skipped() {
        let mut rewind = coordinator(10, 5.0);
        for _ in 0..5 {
            rewind.tick(0.1);
        }
        let (_, sink) = track(&mut rewind);
        rewind.set_rewind_target(0.2);
        rewind.tick(0.1);

        assert!(sink.lock().unwrap().is_empty());
        assert_eq!(rewind.stats().skipped, 1);
    }

    #[test]
    fn test_shutdown_drops_everything() {
        let mut rewind = coordinator(10, 5.0);
        let (_, _) = track(&mut rewind);
        let (_, _) = track(&mut rewind);
        rewind.begin_rewind();

        rewind.shutdown();

        assert_eq!(rewind.subscription_count(), 0);
        assert!(!rewind.is_rewinding());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = RewindConfig {
            window_seconds: 0.0,
            ..RewindConfig::default()
        };
        assert!(RewindCoordinator::new(config).is_err());

        let endless = RewindConfig {
            window_seconds: 1e30,
            ..RewindConfig::default()
        };
        assert!(matches!(RewindCoordinator::new(endless), Err(ConfigError::Invalid(_))));
    }
}
