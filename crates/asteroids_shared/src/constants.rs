//! # Engine Constants
//!
//! Defaults baked into the binary. Every value here can be overridden by the
//! TOML configuration loaded at startup.

// =============================================================================
// SIMULATION
// =============================================================================

/// Fixed simulation steps per second.
pub const TICK_RATE: u32 = 50;

/// Duration of one fixed simulation step, in seconds.
pub const FIXED_TIMESTEP: f32 = 1.0 / TICK_RATE as f32;

// =============================================================================
// REWIND
// =============================================================================

/// Snapshots captured per second for every rewind-tracked actor.
pub const CAPTURES_PER_SECOND: u32 = 10;

/// How far back the rewind history reaches, in seconds.
pub const REWIND_WINDOW_SECONDS: f32 = 5.0;

/// Fraction of the visible play-field height above which a jump between two
/// samples is treated as a screen-wrap teleport instead of motion.
///
/// **WARNING:** too small a value misreads fast enemies as teleports when the
/// capture cadence is low.
pub const DISCONTINUITY_FRACTION: f32 = 0.35;

// =============================================================================
// VIEW
// =============================================================================

/// Half of the visible play-field height, in world units.
pub const ORTHOGRAPHIC_SIZE: f32 = 5.0;

/// Visible play-field width divided by its height.
pub const VIEW_ASPECT: f32 = 16.0 / 9.0;
