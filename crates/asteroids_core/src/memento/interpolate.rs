//! # Snapshot Interpolation
//!
//! Blends two stored snapshots for an instant that falls between captures.
//!
//! Two structural edge cases are never blended, only switched at `t = 0.5`:
//! - **Life boundary**: one side enabled, the other not (death or
//!   resurrection happened inside the interval)
//! - **Teleport**: the position jumped further than the discontinuity
//!   threshold on either axis (screen wrap)
//!
//! Blending across either would slide the actor across the screen.
//!
//! The teleport test is a heuristic. A legitimately fast actor sampled at a
//! low cadence can be misread as a teleport, and a short wrap can be
//! misread as motion. This is an accepted approximation.

use asteroids_shared::lerp_angle;

use super::snapshot::Snapshot;
use crate::config::DiscontinuityConfig;

/// Per-axis distance above which two samples are a teleport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Discontinuity {
    /// Largest horizontal offset still treated as motion.
    pub max_dx: f32,
    /// Largest vertical offset still treated as motion.
    pub max_dy: f32,
}

impl Discontinuity {
    /// Never treats any jump as a teleport.
    pub const NONE: Self = Self {
        max_dx: f32::INFINITY,
        max_dy: f32::INFINITY,
    };

    /// Explicit thresholds.
    #[must_use]
    pub const fn new(max_dx: f32, max_dy: f32) -> Self {
        Self { max_dx, max_dy }
    }

    /// Returns true when going from `a` to `b` is a jump, not motion.
    #[inline]
    #[must_use]
    pub fn is_jump(&self, a: &Snapshot, b: &Snapshot) -> bool {
        (a.position.x - b.position.x).abs() > self.max_dx
            || (a.position.y - b.position.y).abs() > self.max_dy
    }
}

impl From<DiscontinuityConfig> for Discontinuity {
    fn from(config: DiscontinuityConfig) -> Self {
        let (max_dx, max_dy) = config.thresholds();
        Self { max_dx, max_dy }
    }
}

/// Produces the snapshot `t` of the way from `a` to `b`.
///
/// `t` is clamped to `[0, 1]`. Whenever the result is not blended it is
/// exactly `a` (for `t <= 0.5`) or exactly `b`.
#[must_use]
pub fn interpolate(a: &Snapshot, b: &Snapshot, t: f32, discontinuity: &Discontinuity) -> Snapshot {
    let t = t.clamp(0.0, 1.0);
    let pick = |a: &Snapshot, b: &Snapshot| if t > 0.5 { *b } else { *a };

    // Resurrection or death inside the interval
    if a.enabled != b.enabled {
        return pick(a, b);
    }

    // Screen wrap
    if discontinuity.is_jump(a, b) {
        return pick(a, b);
    }

    Snapshot {
        enabled: a.enabled,
        position: a.position.lerp(b.position, t),
        rotation: lerp_angle(a.rotation, b.rotation, t),
        velocity: a.velocity.lerp(b.velocity, t),
        angular_velocity: asteroids_shared::lerp(a.angular_velocity, b.angular_velocity, t),
        visual_variant: if t > 0.5 { b.visual_variant } else { a.visual_variant },
    }
}
