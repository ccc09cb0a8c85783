use crate::{SimWorld, TickContext};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SimStatus {
    NotStarted,
    InProgress,
    CompletedSuccessfully,
}

impl SimStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, SimStatus::CompletedSuccessfully)
    }
}

/// Sink for human-readable intent lines (what an action is about to do).
///
/// Inspection layers provide the sink; the core only routes through it.
pub trait IntentSink {
    fn push(&mut self, line: &str);
}

impl IntentSink for Vec<String> {
    fn push(&mut self, line: &str) {
        Vec::push(self, line.to_string());
    }
}

pub trait SimAction<W>: 'static
where
    W: SimWorld,
{
    fn status(&self) -> SimStatus;

    fn update(&mut self, world: &mut W, ctx: &TickContext);

    fn cancel(&mut self, _world: &mut W) {}

    /// Whether this action currently occupies the given actor.
    ///
    /// Must answer from in-memory state only; callers poll it every tick.
    fn is_actor_busy(&self, _actor: W::Actor) -> bool {
        false
    }

    /// Something outside this action mutated the world; re-read what matters.
    fn notify_external_change(&mut self, _world: &mut W) {}

    fn draw_intent(&self, _world: &W, _sink: &mut dyn IntentSink) {}

    fn clone_boxed(&self) -> Box<dyn SimAction<W>>;
}

impl<W: SimWorld> Clone for Box<dyn SimAction<W>> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// Build runtime actions from immutable primitive-action specs.
///
/// Planners output specs; both the search (against forked snapshots) and the
/// plan executor (against the live world) materialize them through the same
/// factory, one step at a time.
pub trait ActionFactory<W>: 'static
where
    W: SimWorld,
{
    type Spec: Clone + 'static;

    fn build(&self, spec: &Self::Spec, world: &W) -> Box<dyn SimAction<W>>;
}
