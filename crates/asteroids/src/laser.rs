//! # Laser Weapon
//!
//! A held-down beam. Not pooled: one instance lives for the whole level and
//! is tracked for rewind with its own memento type.

use std::sync::Arc;

use asteroids_core::{RewindCoordinator, SubscriptionId};
use asteroids_shared::lerp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Rewindable state of the laser.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LaserMemento {
    /// Whether the beam is on.
    pub firing: bool,
    /// Seconds of beam left.
    pub remaining: f32,
}

impl LaserMemento {
    /// Blends two mementos. Switching the beam on or off is never blended.
    #[must_use]
    pub fn interpolate(a: &Self, b: &Self, t: f32) -> Self {
        if a.firing != b.firing {
            return if t > 0.5 { *b } else { *a };
        }
        Self {
            firing: a.firing,
            remaining: lerp(a.remaining, b.remaining, t),
        }
    }
}

#[derive(Debug, Default)]
struct LaserState {
    firing: bool,
    remaining: f32,
    cooldown: f32,
}

/// The player's laser.
#[derive(Clone, Debug)]
pub struct LaserWeapon {
    duration: f32,
    cooldown: f32,
    state: Arc<Mutex<LaserState>>,
}

impl LaserWeapon {
    /// Creates an idle laser.
    ///
    /// # Arguments
    ///
    /// * `duration` - Seconds the beam stays on per shot
    /// * `cooldown` - Seconds between two shots
    #[must_use]
    pub fn new(duration: f32, cooldown: f32) -> Self {
        Self {
            duration,
            cooldown,
            state: Arc::new(Mutex::new(LaserState::default())),
        }
    }

    /// Subscribes the laser's beam state to the coordinator.
    pub fn track(&self, rewind: &mut RewindCoordinator) -> SubscriptionId {
        let produced = Arc::clone(&self.state);
        let consumed = Arc::clone(&self.state);
        rewind.subscribe(
            move || {
                let state = produced.lock();
                LaserMemento {
                    firing: state.firing,
                    remaining: state.remaining,
                }
            },
            move |memento: Option<LaserMemento>| {
                let memento = memento.unwrap_or_default();
                let mut state = consumed.lock();
                state.firing = memento.firing;
                state.remaining = memento.remaining;
            },
            LaserMemento::interpolate,
        )
    }

    /// Turns the beam on. Returns false while rewinding or cooling down.
    pub fn fire(&self, rewinding: bool) -> bool {
        if rewinding {
            return false;
        }
        let mut state = self.state.lock();
        if state.cooldown > 0.0 {
            return false;
        }
        state.firing = true;
        state.remaining = self.duration;
        state.cooldown = self.cooldown;
        true
    }

    /// Advances the beam and the cooldown. Frozen while rewinding.
    pub fn update(&self, dt: f32, rewinding: bool) {
        if rewinding {
            return;
        }
        let mut state = self.state.lock();
        state.cooldown = (state.cooldown - dt).max(0.0);
        if state.firing {
            state.remaining -= dt;
            if state.remaining <= 0.0 {
                state.firing = false;
                state.remaining = 0.0;
            }
        }
    }

    /// Whether the beam is on.
    #[must_use]
    pub fn is_firing(&self) -> bool {
        self.state.lock().firing
    }

    /// Current rewindable state.
    #[must_use]
    pub fn memento(&self) -> LaserMemento {
        let state = self.state.lock();
        LaserMemento {
            firing: state.firing,
            remaining: state.remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asteroids_core::RewindConfig;

    #[test]
    fn test_beam_runs_out() {
        let laser = LaserWeapon::new(0.5, 1.0);
        assert!(laser.fire(false));
        assert!(!laser.fire(false));

        for _ in 0..30 {
            laser.update(0.02, false);
        }
        assert!(!laser.is_firing());
        assert_eq!(laser.memento().remaining, 0.0);
    }

    #[test]
    fn test_no_firing_while_rewinding() {
        let laser = LaserWeapon::new(0.5, 1.0);
        assert!(!laser.fire(true));
        assert!(!laser.is_firing());
    }

    #[test]
    fn test_switch_is_not_blended() {
        let off = LaserMemento::default();
        let on = LaserMemento { firing: true, remaining: 0.4 };
        assert_eq!(LaserMemento::interpolate(&off, &on, 0.5), off);
        assert_eq!(LaserMemento::interpolate(&off, &on, 0.6), on);

        let later = LaserMemento { firing: true, remaining: 0.2 };
        let mid = LaserMemento::interpolate(&on, &later, 0.5);
        assert!((mid.remaining - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_rewind_restores_beam() {
        let mut rewind = RewindCoordinator::new(RewindConfig::default()).unwrap();
        let laser = LaserWeapon::new(1.0, 2.0);
        laser.track(&mut rewind);

        assert!(laser.fire(false));
        for _ in 0..25 {
            laser.update(0.02, rewind.is_rewinding());
            rewind.tick(0.02);
        }
        for _ in 0..50 {
            laser.update(0.02, rewind.is_rewinding());
            rewind.tick(0.02);
        }
        assert!(!laser.is_firing());

        rewind.set_rewind_target(1.0);
        rewind.tick(0.02);
        assert!(laser.is_firing());
        assert!((laser.memento().remaining - 0.5).abs() < 0.05);
    }
}
