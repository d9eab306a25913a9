//! # Entity Handles
//!
//! A handle is a cheap, cloneable reference to one live actor. The core
//! only ever reads and writes the rewindable state listed on
//! [`EntityHandle`]; how that state is rendered or simulated is someone
//! else's business.
//!
//! Handles are shared references: gameplay, the pool free list and rewind
//! subscriptions may all hold a clone of the same handle, so the setters take
//! `&self` and go through interior mutability.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use asteroids_shared::Vec2;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::memento::VariantId;

/// Stable identity of a physical handle.
///
/// Two clones of the same handle report the same id for their whole
/// lifetime, across any number of store/create cycles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct HandleId(u64);

impl HandleId {
    /// Wraps a raw id.
    #[inline]
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Capability set the core needs from an actor.
///
/// Rotation is in degrees, angular velocity in degrees per second.
pub trait EntityHandle: Clone + Send + Sync + 'static {
    /// Identity of the underlying actor.
    fn id(&self) -> HandleId;

    /// Whether the actor takes part in the simulation.
    fn enabled(&self) -> bool;
    /// Enables or disables the actor.
    fn set_enabled(&self, enabled: bool);

    /// World position.
    fn position(&self) -> Vec2;
    /// Moves the actor.
    fn set_position(&self, position: Vec2);

    /// Rotation in degrees.
    fn rotation(&self) -> f32;
    /// Sets the rotation in degrees.
    fn set_rotation(&self, rotation: f32);

    /// Linear velocity.
    fn velocity(&self) -> Vec2;
    /// Sets the linear velocity.
    fn set_velocity(&self, velocity: Vec2);

    /// Angular velocity in degrees per second.
    fn angular_velocity(&self) -> f32;
    /// Sets the angular velocity.
    fn set_angular_velocity(&self, angular_velocity: f32);

    /// Currently displayed visual variant.
    fn visual_variant(&self) -> VariantId;
    /// Swaps the displayed visual variant.
    fn set_visual_variant(&self, variant: VariantId);
}

/// Plain state behind a [`Body`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    /// Whether the body is simulated.
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
    /// Physics mass, set once at construction.
    pub mass: f32,
    /// Uniform scale, set once at construction.
    pub scale: f32,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            enabled: false,
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            visual_variant: VariantId::default(),
            mass: 1.0,
            scale: 1.0,
        }
    }
}

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

/// Default handle: a rigid body behind a shared lock.
///
/// Every `Body::new` is one allocation and receives a process-unique id.
#[derive(Clone)]
pub struct Body {
    id: HandleId,
    state: Arc<Mutex<BodyState>>,
}

impl Body {
    /// Allocates a new body with the given initial state.
    #[must_use]
    pub fn new(state: BodyState) -> Self {
        Self {
            id: HandleId::new(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed)),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Copies the full state out.
    #[must_use]
    pub fn state(&self) -> BodyState {
        *self.state.lock()
    }

    /// Runs `f` with exclusive access to the state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut BodyState) -> R) -> R {
        f(&mut self.state.lock())
    }

    /// Returns true when both values refer to the same allocation.
    #[must_use]
    pub fn same_body(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .finish()
    }
}

impl EntityHandle for Body {
    fn id(&self) -> HandleId {
        self.id
    }

    fn enabled(&self) -> bool {
        self.state.lock().enabled
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.lock().enabled = enabled;
    }

    fn position(&self) -> Vec2 {
        self.state.lock().position
    }

    fn set_position(&self, position: Vec2) {
        self.state.lock().position = position;
    }

    fn rotation(&self) -> f32 {
        self.state.lock().rotation
    }

    fn set_rotation(&self, rotation: f32) {
        self.state.lock().rotation = rotation;
    }

    fn velocity(&self) -> Vec2 {
        self.state.lock().velocity
    }

    fn set_velocity(&self, velocity: Vec2) {
        self.state.lock().velocity = velocity;
    }

    fn angular_velocity(&self) -> f32 {
        self.state.lock().angular_velocity
    }

    fn set_angular_velocity(&self, angular_velocity: f32) {
        self.state.lock().angular_velocity = angular_velocity;
    }

    fn visual_variant(&self) -> VariantId {
        self.state.lock().visual_variant
    }

    fn set_visual_variant(&self, variant: VariantId) {
        self.state.lock().visual_variant = variant;
    }
}
