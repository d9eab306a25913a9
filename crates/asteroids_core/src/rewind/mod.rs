//! # Rewind Engine
//!
//! A single coordinator samples every tracked actor on a fixed cadence and
//! can apply the interpolated state of any instant inside its window.
//!
//! ```text
//!   producer ──► capture pass ──► HistoryBuffer (per actor)
//!                                      │
//!   consumer ◄── interpolator ◄── lookup(target instant)
//! ```
//!
//! Pooled actors are wired up by [`track_pooled`]: their consumer moves the
//! handle out of or back into its pool as the rewound state demands.

mod coordinator;
mod registry;
mod tracking;

pub use coordinator::{RewindCoordinator, RewindMode, RewindStats};
pub use registry::{Consumer, Interpolator, Producer, SubscriptionId};
pub use tracking::{apply_pooled, track_pooled};
