//! # Mementos
//!
//! Immutable captures of rewindable state, the rule for blending two of
//! them, and the fixed-window history they are kept in.
//!
//! ```text
//! capture ─► Snapshot ─► HistoryBuffer ─► lookup(instant)
//!                                             │
//!                      ┌──────────────────────┴──────────┐
//!                      ▼                                 ▼
//!               Between(a, b, t)                 Oldest / Newest
//!                      │                                 │
//!                 interpolate ──────────► apply ◄────────┘
//! ```

mod history;
mod interpolate;
mod snapshot;

pub use history::{HistoryBuffer, Lookup};
pub use interpolate::{interpolate, Discontinuity};
pub use snapshot::{Snapshot, VariantId};
