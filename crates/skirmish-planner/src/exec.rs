use std::rc::Rc;

use skirmish_sim::{
    ActionFactory, ActionParallel, CancelToken, IntentSink, SimAction, SimStatus, SimWorld,
    TickContext,
};
use tracing::trace;

use crate::{ExecMode, MethodBody, MethodId, Plan, TaskSpec};

/// Walks a plan and drives it to completion as simulation actions.
///
/// The sequential spine of the subtree is flattened once up front (post-order,
/// so a goal's prerequisites convert before the goal itself). Parallel
/// decompositions are forked at conversion time into one nested executor per
/// subtask, joined by an [`ActionParallel`]. Primitive actions are
/// materialized lazily, one at a time.
pub struct PlannerSimAction<T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W> + Clone,
{
    plan: Rc<Plan<T, F::Spec, W>>,
    flattened: Rc<[MethodId]>,
    converted: usize,
    current: Option<Box<dyn SimAction<W>>>,
    factory: F,
    cancel: CancelToken,
    cancelled: bool,
}

impl<T, W, F> PlannerSimAction<T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W> + Clone,
{
    pub fn new(plan: Rc<Plan<T, F::Spec, W>>, root: MethodId, factory: F, cancel: CancelToken) -> Self {
        let flattened: Rc<[MethodId]> = plan.enumerate_sequential_actions(root).into();
        Self {
            plan,
            flattened,
            converted: 0,
            current: None,
            factory,
            cancel,
            cancelled: false,
        }
    }

    pub fn plan(&self) -> &Rc<Plan<T, F::Spec, W>> {
        &self.plan
    }

    /// Count of flattened methods already converted. Only ever increases.
    pub fn methods_converted(&self) -> usize {
        self.converted
    }

    pub fn flattened_len(&self) -> usize {
        self.flattened.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Pull un-converted methods until one yields an action or the list is
    /// exhausted. Methods that convert to nothing are skipped silently.
    fn advance(&mut self, world: &W) {
        while self.current.is_none() && self.converted < self.flattened.len() {
            let id = self.flattened[self.converted];
            self.converted += 1;
            self.current = self.convert(id, world);
        }
    }

    fn convert(&self, id: MethodId, world: &W) -> Option<Box<dyn SimAction<W>>> {
        let method = self.plan.method(id);
        match self.plan.decomposition_of(id) {
            Some(decomposition) => {
                if matches!(method.body(), MethodBody::Primitive(_)) {
                    panic!(
                        "method `{}` claims both a decomposition and a primitive action",
                        method.label()
                    );
                }
                match decomposition.mode {
                    // Subtasks are already flattened into this executor's
                    // list; converting the group again would duplicate work.
                    ExecMode::Sequential => None,
                    ExecMode::Parallel => {
                        let branches: Vec<Box<dyn SimAction<W>>> = decomposition
                            .subtasks
                            .iter()
                            .map(|&sub| {
                                Box::new(PlannerSimAction::new(
                                    Rc::clone(&self.plan),
                                    sub,
                                    self.factory.clone(),
                                    self.cancel.clone(),
                                )) as Box<dyn SimAction<W>>
                            })
                            .collect();
                        Some(Box::new(ActionParallel::new(branches)))
                    }
                }
            }
            None => {
                // Leaf. An inert leaf (no spec for this world) is skipped.
                let spec = method.primitive_spec(world)?;
                Some(self.factory.build(&spec, world))
            }
        }
    }

    fn cancel_in_place(&mut self, world: &mut W) {
        if self.cancelled {
            return;
        }
        if let Some(current) = self.current.as_mut() {
            current.cancel(world);
        }
        self.current = None;
        self.cancelled = true;
        trace!("plan executor cancelled");
    }
}

impl<T, W, F> SimAction<W> for PlannerSimAction<T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W> + Clone,
{
    fn status(&self) -> SimStatus {
        if self.current.is_none() && self.converted == self.flattened.len() {
            SimStatus::CompletedSuccessfully
        } else if self.current.is_none() && self.converted == 0 {
            SimStatus::NotStarted
        } else {
            SimStatus::InProgress
        }
    }

    fn update(&mut self, world: &mut W, ctx: &TickContext) {
        if self.cancelled {
            return;
        }
        if self.cancel.is_cancelled() {
            self.cancel_in_place(world);
            return;
        }

        if self.current.is_none() {
            self.advance(world);
        }
        let finished = match self.current.as_mut() {
            Some(current) => {
                current.update(world, ctx);
                current.status().is_complete()
            }
            None => return,
        };
        if finished {
            // One forward-progress attempt per update, so a finished
            // sub-action never stalls the executor more than one cycle.
            self.current = None;
            self.advance(world);
        }
    }

    fn cancel(&mut self, world: &mut W) {
        self.cancel_in_place(world);
    }

    fn is_actor_busy(&self, actor: W::Actor) -> bool {
        self.current
            .as_ref()
            .map(|c| c.is_actor_busy(actor))
            .unwrap_or(false)
    }

    fn notify_external_change(&mut self, world: &mut W) {
        if self.cancelled {
            return;
        }
        let finished = match self.current.as_mut() {
            Some(current) => {
                current.notify_external_change(world);
                current.status().is_complete()
            }
            None => {
                self.advance(world);
                return;
            }
        };
        if finished {
            self.current = None;
            self.advance(world);
        }
    }

    fn draw_intent(&self, world: &W, sink: &mut dyn IntentSink) {
        if let Some(current) = self.current.as_ref() {
            current.draw_intent(world, sink);
        }
    }

    fn clone_boxed(&self) -> Box<dyn SimAction<W>> {
        Box::new(Self {
            plan: Rc::clone(&self.plan),
            flattened: Rc::clone(&self.flattened),
            converted: self.converted,
            current: self.current.clone(),
            factory: self.factory.clone(),
            cancel: self.cancel.clone(),
            cancelled: self.cancelled,
        })
    }
}
