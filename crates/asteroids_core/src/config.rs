//! # Rewind Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! captures_per_second = 10
//! window_seconds = 5.0
//! underrun = "clamp"
//!
//! [discontinuity]
//! mode = "view"
//! orthographic_size = 5.0
//! aspect = 1.7777
//! fraction = 0.35
//! ```

use std::path::Path;

use asteroids_shared::{
    CAPTURES_PER_SECOND, DISCONTINUITY_FRACTION, ORTHOGRAPHIC_SIZE, REWIND_WINDOW_SECONDS,
    VIEW_ASPECT,
};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Most samples a single history buffer may retain.
///
/// At the default 10 captures per second this is a little over a day.
pub const MAX_HISTORY_CAPACITY: usize = 1 << 20;

/// What a rewind does for an actor whose history does not reach back to the
/// requested instant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderrunPolicy {
    /// Apply the oldest retained sample verbatim.
    #[default]
    Clamp,
    /// Hand the consumer `None` when the actor provably did not exist yet
    /// (its first sample is newer than the instant and nothing was evicted).
    /// Older-than-window requests still clamp.
    ReportAbsent,
}

/// How the interpolator decides that two samples are a teleport rather than
/// motion.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DiscontinuityConfig {
    /// Thresholds derived from the visible play field: a vertical jump larger
    /// than `2 * orthographic_size * fraction`, or a horizontal one larger
    /// than that times `aspect`.
    View {
        /// Half of the visible height.
        orthographic_size: f32,
        /// Visible width divided by visible height.
        aspect: f32,
        /// Fraction of the visible extent that counts as a jump.
        fraction: f32,
    },
    /// Explicit per-axis thresholds, independent of the camera.
    Fixed {
        /// Largest horizontal offset still treated as motion.
        max_dx: f32,
        /// Largest vertical offset still treated as motion.
        max_dy: f32,
    },
}

impl Default for DiscontinuityConfig {
    fn default() -> Self {
        Self::View {
            orthographic_size: ORTHOGRAPHIC_SIZE,
            aspect: VIEW_ASPECT,
            fraction: DISCONTINUITY_FRACTION,
        }
    }
}

impl DiscontinuityConfig {
    /// Returns the `(max_dx, max_dy)` thresholds.
    #[must_use]
    pub fn thresholds(self) -> (f32, f32) {
        match self {
            Self::View {
                orthographic_size,
                aspect,
                fraction,
            } => {
                let height = orthographic_size * 2.0 * fraction;
                (height * aspect, height)
            }
            Self::Fixed { max_dx, max_dy } => (max_dx, max_dy),
        }
    }
}

/// Configuration of the rewind coordinator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewindConfig {
    /// Snapshots captured per second.
    pub captures_per_second: u32,
    /// Seconds of history retained per actor.
    pub window_seconds: f32,
    /// Behaviour when a rewind reaches past an actor's history.
    pub underrun: UnderrunPolicy,
    /// Teleport detection used by the standard snapshot interpolator.
    pub discontinuity: DiscontinuityConfig,
    /// Seconds of history consumed per second of `step_rewind`.
    pub rewind_speed: f32,
}

impl Default for RewindConfig {
    fn default() -> Self {
        Self {
            captures_per_second: CAPTURES_PER_SECOND,
            window_seconds: REWIND_WINDOW_SECONDS,
            underrun: UnderrunPolicy::Clamp,
            discontinuity: DiscontinuityConfig::default(),
            rewind_speed: 1.0,
        }
    }
}

impl RewindConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.captures_per_second == 0 {
            return Err(ConfigError::Invalid(
                "captures_per_second must be greater than zero".into(),
            ));
        }
        if !(self.window_seconds.is_finite() && self.window_seconds > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "window_seconds must be positive, got {}",
                self.window_seconds
            )));
        }
        if !(self.rewind_speed.is_finite() && self.rewind_speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "rewind_speed must be non-negative, got {}",
                self.rewind_speed
            )));
        }
        let samples = f64::from(self.captures_per_second) * f64::from(self.window_seconds);
        if samples.ceil() > MAX_HISTORY_CAPACITY as f64 {
            return Err(ConfigError::Invalid(format!(
                "captures_per_second * window_seconds must not exceed {MAX_HISTORY_CAPACITY}, got {samples}"
            )));
        }
        let (max_dx, max_dy) = self.discontinuity.thresholds();
        if !(max_dx > 0.0 && max_dy > 0.0) {
            return Err(ConfigError::Invalid(
                "discontinuity thresholds must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Seconds between two capture passes.
    #[must_use]
    pub fn interval(&self) -> f64 {
        1.0 / f64::from(self.captures_per_second)
    }

    /// Number of samples each history buffer retains.
    #[must_use]
    pub fn history_capacity(&self) -> usize {
        let samples = (f64::from(self.captures_per_second) * f64::from(self.window_seconds)).ceil();
        (samples as usize).max(2)
    }
}
