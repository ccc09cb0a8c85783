use core::fmt;
use std::collections::BTreeMap;
use std::rc::Rc;

use skirmish_sim::{ActionFactory, CancelToken, SimWorld};

use crate::{ExecMode, Method, PlannerSimAction, TaskSpec};

const DEFAULT_PRETTY_CAPACITY: usize = 16 * 1024;

/// Stable index of a method within one plan's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MethodId(u32);

impl MethodId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// All method instances expanded for one plan, addressed by [`MethodId`].
///
/// Indices stay valid across deep copies, which is what lets the chosen-map
/// survive a fork without identity bookkeeping.
pub struct MethodArena<T, S, W> {
    methods: Vec<Method<T, S, W>>,
}

impl<T, S, W> Default for MethodArena<T, S, W> {
    fn default() -> Self {
        Self {
            methods: Vec::new(),
        }
    }
}

impl<T: Clone, S, W> Clone for MethodArena<T, S, W> {
    fn clone(&self) -> Self {
        Self {
            methods: self.methods.clone(),
        }
    }
}

impl<T: fmt::Debug, S, W> fmt::Debug for MethodArena<T, S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodArena")
            .field("methods", &self.methods)
            .finish()
    }
}

impl<T, S, W> MethodArena<T, S, W> {
    pub(crate) fn alloc(&mut self, method: Method<T, S, W>) -> MethodId {
        let id = MethodId(self.methods.len() as u32);
        self.methods.push(method);
        id
    }

    pub(crate) fn alloc_all(&mut self, methods: Vec<Method<T, S, W>>) -> Vec<MethodId> {
        methods.into_iter().map(|m| self.alloc(m)).collect()
    }

    pub fn get(&self, id: MethodId) -> &Method<T, S, W> {
        &self.methods[id.index()]
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

/// One chosen expansion of a method, in arena coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub mode: ExecMode,
    pub subtasks: Vec<MethodId>,
}

/// The artifact of search: which decomposition was chosen for every expanded
/// method of a goal tree, plus the start and end world snapshots.
///
/// Every key in the chosen-map is reachable from the top method through
/// chosen decompositions; methods absent from the map are leaves (actionable
/// or inert).
pub struct Plan<T, S, W> {
    pub(crate) arena: MethodArena<T, S, W>,
    pub(crate) top: MethodId,
    pub(crate) chosen: BTreeMap<MethodId, Decomposition>,
    pub(crate) start_state: W,
    pub(crate) plan_time_state: W,
    pub(crate) end_state: Option<W>,
}

impl<T: fmt::Debug, S, W: fmt::Debug> fmt::Debug for Plan<T, S, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plan")
            .field("arena", &self.arena)
            .field("top", &self.top)
            .field("chosen", &self.chosen)
            .field("start_state", &self.start_state)
            .field("plan_time_state", &self.plan_time_state)
            .field("end_state", &self.end_state)
            .finish()
    }
}

impl<T: Clone, S, W: Clone> Clone for Plan<T, S, W> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            top: self.top,
            chosen: self.chosen.clone(),
            start_state: self.start_state.clone(),
            plan_time_state: self.plan_time_state.clone(),
            end_state: self.end_state.clone(),
        }
    }
}

impl<T, S, W> Plan<T, S, W>
where
    T: TaskSpec,
    S: Clone + 'static,
    W: SimWorld,
{
    pub(crate) fn new(goal: Method<T, S, W>, start: W) -> Self {
        let mut arena = MethodArena::default();
        let top = arena.alloc(goal);
        Self {
            arena,
            top,
            chosen: BTreeMap::new(),
            start_state: start.clone(),
            plan_time_state: start,
            end_state: None,
        }
    }

    pub fn top(&self) -> MethodId {
        self.top
    }

    pub fn arena(&self) -> &MethodArena<T, S, W> {
        &self.arena
    }

    pub fn method(&self, id: MethodId) -> &Method<T, S, W> {
        self.arena.get(id)
    }

    pub fn decomposition_of(&self, id: MethodId) -> Option<&Decomposition> {
        self.chosen.get(&id)
    }

    /// Snapshot the search started from. Never mutated after construction.
    pub fn start_state(&self) -> &W {
        &self.start_state
    }

    /// Snapshot the search mutated while running branches forward.
    pub fn plan_time_state(&self) -> &W {
        &self.plan_time_state
    }

    /// Final snapshot of the branch; always present on plans yielded by the
    /// search.
    pub fn end_state(&self) -> Option<&W> {
        self.end_state.as_ref()
    }

    /// Deep copy: both snapshots are cloned, methods are shared-recipe
    /// clones (they carry no mutable internal state).
    pub fn deep_copy(&self) -> Self {
        self.clone()
    }

    /// Depth-first, post-order flattening of the subtree at `root`,
    /// descending only into `Sequential` decompositions. `Parallel`
    /// decompositions stay opaque single entries; the executor forks them
    /// separately. The root is yielded after its flattened prerequisites.
    pub fn enumerate_sequential_actions(&self, root: MethodId) -> Vec<MethodId> {
        let mut out = Vec::new();
        self.flatten_into(root, &mut out);
        out
    }

    fn flatten_into(&self, id: MethodId, out: &mut Vec<MethodId>) {
        if let Some(d) = self.chosen.get(&id) {
            if d.mode == ExecMode::Sequential {
                for &sub in &d.subtasks {
                    self.flatten_into(sub, out);
                }
            }
        }
        out.push(id);
    }

    pub fn pretty_print(&self) -> String {
        self.pretty_print_capped(DEFAULT_PRETTY_CAPACITY)
    }

    /// Render the decomposition tree as indented text, mode label on parent
    /// lines. Output is truncated at `max_len` rather than failing on
    /// oversized trees.
    pub fn pretty_print_capped(&self, max_len: usize) -> String {
        let mut out = String::new();
        self.print_node(self.top, 0, max_len, &mut out);
        out
    }

    fn print_node(&self, id: MethodId, depth: usize, max_len: usize, out: &mut String) -> bool {
        let method = self.arena.get(id);
        let decomposition = self.chosen.get(&id);

        let mut line = String::new();
        for _ in 0..depth {
            line.push_str("  ");
        }
        line.push_str(&method.label());
        if let Some(d) = decomposition {
            line.push_str(match d.mode {
                ExecMode::Sequential => " [sequential]",
                ExecMode::Parallel => " [parallel]",
            });
        }
        line.push('\n');

        if out.len() + line.len() > max_len {
            out.push_str("...\n");
            return false;
        }
        out.push_str(&line);

        if let Some(d) = decomposition {
            for &sub in &d.subtasks {
                if !self.print_node(sub, depth + 1, max_len, out) {
                    return false;
                }
            }
        }
        true
    }

    /// Bridge this plan into the simulation's runtime action model, rooted at
    /// the top method.
    pub fn to_sim_action<F>(self: Rc<Self>, factory: F, cancel: CancelToken) -> PlannerSimAction<T, W, F>
    where
        F: ActionFactory<W, Spec = S> + Clone,
    {
        let top = self.top;
        PlannerSimAction::new(self, top, factory, cancel)
    }
}
