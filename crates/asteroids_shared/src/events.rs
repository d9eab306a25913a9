//! Gameplay events raised by the simulation.
//!
//! Events are plain values; whoever runs the simulation drains them once per
//! tick (scoreboard, audio and UI live outside this repository).

use serde::{Deserialize, Serialize};

/// Something the simulation wants the outside world to know about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An enemy was killed and returned to its pool.
    EnemyDestroyed {
        /// Points awarded for the kill.
        score: u32,
    },
    /// An enemy broke into smaller pieces.
    EnemySplit {
        /// Number of pieces spawned.
        amount: u32,
    },
    /// The level ended.
    LevelTerminated {
        /// True when the player won.
        won: bool,
    },
    /// The simulation was paused or resumed.
    Paused {
        /// True when paused.
        paused: bool,
    },
}

impl GameEvent {
    /// Score carried by the event, zero for events that award none.
    #[must_use]
    pub const fn score(self) -> u32 {
        match self {
            Self::EnemyDestroyed { score } => score,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_kills_score() {
        assert_eq!(GameEvent::EnemyDestroyed { score: 25 }.score(), 25);
        assert_eq!(GameEvent::EnemySplit { amount: 3 }.score(), 0);
        assert_eq!(GameEvent::Paused { paused: true }.score(), 0);
    }
}
