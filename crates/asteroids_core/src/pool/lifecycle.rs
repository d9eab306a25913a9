//! Per-actor-type hooks run by the pool.

use crate::error::PoolResult;
use crate::handle::EntityHandle;

/// Immutable configuration shared by every instance of one actor type.
///
/// The pool holds it behind an `Arc` and never mutates it.
pub trait Flyweight: Send + Sync + 'static {
    /// Name of the actor type, used in logs and errors.
    fn name(&self) -> &str;
}

/// Construction and reset hooks for one actor type.
///
/// ```text
///            construct (once per handle)
///                 │
///                 ▼
///   ┌──► initialize ─► common_initialize ─► Active
///   │                                          │
///   └──────────── Stored ◄── deinitialize ◄────┘
/// ```
pub trait Lifecycle: Send + 'static {
    /// Shared per-type configuration.
    type Flyweight: Flyweight;
    /// Handle type produced by `construct`.
    type Handle: EntityHandle;
    /// Parameters passed to `create`.
    type Params;

    /// Allocates a new backing instance: attaches physics, visuals and
    /// audio. Runs once per physical handle.
    fn construct(&mut self, flyweight: &Self::Flyweight, params: &Self::Params) -> PoolResult<Self::Handle>;

    /// Cheap reset run on every `create`. Enables the handle by default.
    fn initialize(&mut self, _flyweight: &Self::Flyweight, handle: &Self::Handle, _params: &Self::Params) {
        handle.set_enabled(true);
    }

    /// Type-specific full reset run on every `create` after `initialize`
    /// (position, velocity, a freshly picked visual variant).
    fn common_initialize(&mut self, flyweight: &Self::Flyweight, handle: &Self::Handle, params: &Self::Params);

    /// Quiesces a handle before it is stored. Disables it by default.
    fn deinitialize(&mut self, handle: &Self::Handle) {
        handle.set_enabled(false);
    }
}
