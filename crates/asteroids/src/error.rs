//! # Game Error Types

use asteroids_core::{ConfigError, CoreError, PoolError};
use thiserror::Error;

/// Errors raised by the game layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// Pool or rewind failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Catalog or settings could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No flyweight with this name is loaded.
    #[error("unknown actor type: {0}")]
    UnknownActor(String),
}

impl From<PoolError> for GameError {
    fn from(err: PoolError) -> Self {
        Self::Core(CoreError::Pool(err))
    }
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
