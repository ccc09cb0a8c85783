use core::fmt::Debug;

use crate::TickContext;

/// Deep-copyable simulation snapshot.
///
/// `clone()` is the fork operation: the search clones a snapshot before any
/// divergent mutation, so no world state is ever shared between branches.
///
/// The core crate intentionally does not prescribe which queries a world must
/// expose; specific subsystems (movement, perception, damage) should define
/// extension traits.
pub trait SimWorld: Clone + 'static {
    /// Stable handle for an acting unit. `Ord` keeps iteration deterministic.
    type Actor: Copy + Ord + Debug;

    /// World-side integration step, run once per driven tick before the
    /// current action updates. Default: the world only changes through
    /// actions.
    fn step(&mut self, _ctx: &TickContext) {}
}
