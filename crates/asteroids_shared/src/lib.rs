//! # ASTEROIDS Shared
//!
//! Common types used by the core lifecycle engine and the game crate.
//!
//! ## Rule
//!
//! This crate holds plain values only: vectors, interpolation helpers,
//! constants and gameplay events. Anything that owns an actor lives in
//! `asteroids_core` or `asteroids`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod events;
pub mod math;

pub use constants::{
    CAPTURES_PER_SECOND, DISCONTINUITY_FRACTION, FIXED_TIMESTEP, ORTHOGRAPHIC_SIZE,
    REWIND_WINDOW_SECONDS, TICK_RATE, VIEW_ASPECT,
};
pub use events::GameEvent;
pub use math::{lerp, lerp_angle, Vec2};
