//! Snapshot of one actor at one instant.

use asteroids_shared::Vec2;
use serde::{Deserialize, Serialize};

use crate::handle::EntityHandle;

/// Index of a visual variant inside an actor type's flyweight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VariantId(pub u32);

/// Rewindable state of one actor.
///
/// Never mutated after capture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Whether the actor was alive.
    pub enabled: bool,
    /// World position.
    pub position: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Linear velocity.
    pub velocity: Vec2,
    /// Angular velocity in degrees per second.
    pub angular_velocity: f32,
    /// Displayed visual variant.
    pub visual_variant: VariantId,
}

impl Snapshot {
    /// Reads the rewindable state of `handle`. No side effects.
    #[must_use]
    pub fn capture<H: EntityHandle>(handle: &H) -> Self {
        Self {
            enabled: handle.enabled(),
            position: handle.position(),
            rotation: handle.rotation(),
            velocity: handle.velocity(),
            angular_velocity: handle.angular_velocity(),
            visual_variant: handle.visual_variant(),
        }
    }

    /// Writes the kinematic fields and the visual variant onto `handle`.
    ///
    /// Does not touch `enabled` and knows nothing about pools; routing a
    /// handle in or out of its pool is the consumer's job.
    pub fn write_fields<H: EntityHandle>(&self, handle: &H) {
        handle.set_position(self.position);
        handle.set_rotation(self.rotation);
        handle.set_velocity(self.velocity);
        handle.set_angular_velocity(self.angular_velocity);
        handle.set_visual_variant(self.visual_variant);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{Body, BodyState};

    #[test]
    fn test_capture_then_write_restores_fields() {
        let body = Body::new(BodyState::default());
        body.with_state(|s| {
            s.enabled = true;
            s.position = Vec2::new(1.0, 2.0);
            s.rotation = 45.0;
            s.velocity = Vec2::new(-1.0, 0.5);
            s.angular_velocity = 12.0;
            s.visual_variant = VariantId(3);
        });
        let snapshot = Snapshot::capture(&body);

        body.with_state(|s| {
            s.position = Vec2::ZERO;
            s.rotation = 0.0;
            s.velocity = Vec2::ZERO;
            s.angular_velocity = 0.0;
            s.visual_variant = VariantId(0);
        });
        snapshot.write_fields(&body);

        assert_eq!(Snapshot::capture(&body), snapshot);
    }

    #[test]
    fn test_write_leaves_enabled_alone() {
        let body = Body::new(BodyState::default());
        let mut snapshot = Snapshot::capture(&body);
        snapshot.enabled = true;

        snapshot.write_fields(&body);

        assert!(!body.state().enabled);
    }
}
