//! # Core Error Types
//!
//! Only construction failures are fatal. Invalid pool transitions are
//! programming errors: they are reported, logged, and leave the pool
//! untouched. Rewinding never fails.

use thiserror::Error;

use crate::handle::HandleId;

/// Errors raised by an object pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The construction callback could not produce a handle.
    #[error("failed to construct {actor}: {reason}")]
    Construction {
        /// Name of the actor type being constructed.
        actor: String,
        /// Why construction failed.
        reason: String,
    },

    /// `store` was called on a handle the pool already holds.
    #[error("handle {0} is already stored")]
    AlreadyStored(HandleId),

    /// The handle was never produced by this pool (or was destroyed).
    #[error("handle {0} does not belong to this pool")]
    UnknownHandle(HandleId),

    /// The construction callback returned an identity the pool already tracks.
    #[error("construction returned duplicate handle {0}")]
    DuplicateHandle(HandleId),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The configuration file could not be read.
    #[error("failed to read {path}: {reason}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        reason: String,
    },

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Any error the core can surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Pool failure.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Configuration failure.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
