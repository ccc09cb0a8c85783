use crate::{IntentSink, SimAction, SimStatus, SimWorld, TickContext};

/// Run children strictly in list order, each to completion before the next
/// starts.
pub struct ActionSequence<W>
where
    W: SimWorld,
{
    children: Vec<Box<dyn SimAction<W>>>,
    index: usize,
}

impl<W> ActionSequence<W>
where
    W: SimWorld,
{
    pub fn new(children: Vec<Box<dyn SimAction<W>>>) -> Self {
        Self { children, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.index
    }
}

impl<W> SimAction<W> for ActionSequence<W>
where
    W: SimWorld,
{
    fn status(&self) -> SimStatus {
        if self.index >= self.children.len() {
            return SimStatus::CompletedSuccessfully;
        }
        if self.index == 0 && self.children[0].status() == SimStatus::NotStarted {
            return SimStatus::NotStarted;
        }
        SimStatus::InProgress
    }

    fn update(&mut self, world: &mut W, ctx: &TickContext) {
        while self.index < self.children.len() {
            let child = &mut self.children[self.index];
            child.update(world, ctx);
            if child.status().is_complete() {
                self.index += 1;
            } else {
                return;
            }
        }
    }

    fn cancel(&mut self, world: &mut W) {
        if self.index < self.children.len() {
            self.children[self.index].cancel(world);
        }
    }

    fn is_actor_busy(&self, actor: W::Actor) -> bool {
        self.children
            .get(self.index)
            .map(|c| c.is_actor_busy(actor))
            .unwrap_or(false)
    }

    fn notify_external_change(&mut self, world: &mut W) {
        if self.index < self.children.len() {
            self.children[self.index].notify_external_change(world);
        }
    }

    fn draw_intent(&self, world: &W, sink: &mut dyn IntentSink) {
        if self.index < self.children.len() {
            self.children[self.index].draw_intent(world, sink);
        }
    }

    fn clone_boxed(&self) -> Box<dyn SimAction<W>> {
        Box::new(Self {
            children: self.children.clone(),
            index: self.index,
        })
    }
}

/// Advance all children each update; the group completes when **all**
/// children complete (join semantics).
pub struct ActionParallel<W>
where
    W: SimWorld,
{
    children: Vec<Box<dyn SimAction<W>>>,
}

impl<W> ActionParallel<W>
where
    W: SimWorld,
{
    pub fn new(children: Vec<Box<dyn SimAction<W>>>) -> Self {
        Self { children }
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl<W> SimAction<W> for ActionParallel<W>
where
    W: SimWorld,
{
    fn status(&self) -> SimStatus {
        if self.children.is_empty() {
            return SimStatus::CompletedSuccessfully;
        }
        let mut all_complete = true;
        let mut all_not_started = true;
        for child in &self.children {
            match child.status() {
                SimStatus::CompletedSuccessfully => all_not_started = false,
                SimStatus::NotStarted => all_complete = false,
                SimStatus::InProgress => {
                    all_complete = false;
                    all_not_started = false;
                }
            }
        }
        if all_complete {
            SimStatus::CompletedSuccessfully
        } else if all_not_started {
            SimStatus::NotStarted
        } else {
            SimStatus::InProgress
        }
    }

    fn update(&mut self, world: &mut W, ctx: &TickContext) {
        for child in &mut self.children {
            if !child.status().is_complete() {
                child.update(world, ctx);
            }
        }
    }

    fn cancel(&mut self, world: &mut W) {
        for child in &mut self.children {
            if !child.status().is_complete() {
                child.cancel(world);
            }
        }
    }

    fn is_actor_busy(&self, actor: W::Actor) -> bool {
        self.children.iter().any(|c| c.is_actor_busy(actor))
    }

    fn notify_external_change(&mut self, world: &mut W) {
        for child in &mut self.children {
            if !child.status().is_complete() {
                child.notify_external_change(world);
            }
        }
    }

    fn draw_intent(&self, world: &W, sink: &mut dyn IntentSink) {
        for child in &self.children {
            if !child.status().is_complete() {
                child.draw_intent(world, sink);
            }
        }
    }

    fn clone_boxed(&self) -> Box<dyn SimAction<W>> {
        Box::new(Self {
            children: self.children.clone(),
        })
    }
}
