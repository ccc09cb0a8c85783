use std::collections::VecDeque;

use skirmish_sim::{run_action_forward, ActionFactory, CancelToken, RunOutcome, SimWorld, StepBudget};
use tracing::{debug, trace};

use crate::{
    Decomposition, Expansion, Method, MethodId, MethodLibrary, Plan, PlanScorer, SearchError,
    TaskSpec,
};

/// Tuning for one search run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Forward-execution budget for each primitive action inside a branch.
    pub action_budget: StepBudget,
    /// Max method expansions across the whole stream (loop protection).
    pub max_expansions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            action_budget: StepBudget::default(),
            max_expansions: 4096,
        }
    }
}

/// Enumerates alternative decomposition choices for a goal, exploring each
/// against an independently forked world snapshot ("many worlds").
pub struct ManyWorldsSearch<T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W>,
{
    library: MethodLibrary<T, F::Spec, W>,
    factory: F,
    config: SearchConfig,
}

impl<T, W, F> ManyWorldsSearch<T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W>,
{
    pub fn new(library: MethodLibrary<T, F::Spec, W>, factory: F) -> Self {
        Self {
            library,
            factory,
            config: SearchConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    pub fn library(&self) -> &MethodLibrary<T, F::Spec, W> {
        &self.library
    }

    /// Stream of completed plans for `goal` starting from `start`.
    ///
    /// Every yielded plan carries an end state. No ordering is guaranteed
    /// across decomposition branches; callers that need the best plan must
    /// score every yielded plan and keep the maximum.
    pub fn run(
        &self,
        goal: Method<T, F::Spec, W>,
        start: W,
        cancel: CancelToken,
    ) -> PlanStream<'_, T, W, F> {
        let plan = Plan::new(goal, start);
        let mut agenda = VecDeque::new();
        agenda.push_back(plan.top());
        PlanStream {
            search: self,
            stack: vec![Branch {
                plan,
                agenda,
                tick: 0,
            }],
            cancel,
            expansions: 0,
        }
    }

    /// Run the search to exhaustion and return the highest-scoring plan.
    pub fn best_plan(
        &self,
        goal: Method<T, F::Spec, W>,
        start: W,
        scorer: &dyn PlanScorer<W>,
        cancel: CancelToken,
    ) -> Result<Plan<T, F::Spec, W>, SearchError> {
        let goal_label = goal.label();
        let mut best: Option<(f64, Plan<T, F::Spec, W>)> = None;
        for plan in self.run(goal, start, cancel.clone()) {
            let score = {
                let state = plan.end_state().unwrap_or_else(|| plan.plan_time_state());
                scorer.score(state).score
            };
            match &best {
                Some((kept, _)) if *kept >= score => {}
                _ => best = Some((score, plan)),
            }
        }
        match best {
            Some((_, plan)) => Ok(plan),
            None if cancel.is_cancelled() => Err(SearchError::Cancelled),
            None => Err(SearchError::NoPlanFound { goal: goal_label }),
        }
    }
}

struct Branch<T, S, W> {
    plan: Plan<T, S, W>,
    /// Methods still to expand, front first. Sequential subtasks enter in
    /// order so later ones see the forked-state effects of earlier ones.
    agenda: VecDeque<MethodId>,
    tick: u64,
}

impl<T: Clone, S, W: Clone> Clone for Branch<T, S, W> {
    fn clone(&self) -> Self {
        Self {
            plan: self.plan.clone(),
            agenda: self.agenda.clone(),
            tick: self.tick,
        }
    }
}

fn apply_expansion<T, S, W>(branch: &mut Branch<T, S, W>, id: MethodId, expansion: Expansion<T, S, W>) {
    let subtask_ids = branch.plan.arena.alloc_all(expansion.subtasks);
    for &sub in subtask_ids.iter().rev() {
        branch.agenda.push_front(sub);
    }
    branch.plan.chosen.insert(
        id,
        Decomposition {
            mode: expansion.mode,
            subtasks: subtask_ids,
        },
    );
}

/// Cancellable stream of completed plans; see [`ManyWorldsSearch::run`].
pub struct PlanStream<'a, T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W>,
{
    search: &'a ManyWorldsSearch<T, W, F>,
    stack: Vec<Branch<T, F::Spec, W>>,
    cancel: CancelToken,
    expansions: usize,
}

impl<T, W, F> Iterator for PlanStream<'_, T, W, F>
where
    T: TaskSpec,
    W: SimWorld,
    F: ActionFactory<W>,
{
    type Item = Plan<T, F::Spec, W>;

    fn next(&mut self) -> Option<Self::Item> {
        'branches: while let Some(mut branch) = self.stack.pop() {
            // Cooperative cancellation, observed between branches only.
            if self.cancel.is_cancelled() {
                debug!(pending = self.stack.len() + 1, "search cancelled");
                self.stack.clear();
                return None;
            }

            loop {
                let Some(id) = branch.agenda.pop_front() else {
                    // The goal tree bottomed out.
                    branch.plan.end_state = Some(branch.plan.plan_time_state.clone());
                    trace!(methods = branch.plan.arena().len(), "plan complete");
                    return Some(branch.plan);
                };

                if self.expansions >= self.search.config.max_expansions {
                    debug!(
                        limit = self.search.config.max_expansions,
                        "expansion budget exhausted; ending stream"
                    );
                    self.stack.clear();
                    return None;
                }
                self.expansions += 1;

                let method = branch.plan.method(id).clone();
                if method.is_leaf() {
                    let Some(spec) = method.primitive_spec(&branch.plan.plan_time_state) else {
                        trace!("dead leaf; branch pruned");
                        continue 'branches;
                    };
                    let mut action = self
                        .search
                        .factory
                        .build(&spec, &branch.plan.plan_time_state);
                    let report = run_action_forward(
                        action.as_mut(),
                        &mut branch.plan.plan_time_state,
                        self.search.config.action_budget,
                        &self.cancel,
                        branch.tick,
                    );
                    branch.tick += u64::from(report.steps);
                    match report.outcome {
                        RunOutcome::Completed => continue,
                        RunOutcome::BudgetExhausted => {
                            trace!("action budget exhausted; branch pruned");
                            continue 'branches;
                        }
                        RunOutcome::Cancelled => {
                            self.stack.clear();
                            return None;
                        }
                    }
                }

                let mut expansions =
                    method.expand(&branch.plan.plan_time_state, &self.search.library);
                if expansions.is_empty() {
                    trace!("no viable decomposition; branch pruned");
                    continue 'branches;
                }

                if expansions.len() == 1 {
                    if let Some(expansion) = expansions.pop() {
                        apply_expansion(&mut branch, id, expansion);
                    }
                    continue;
                }

                // Fork one world per alternative; pushed in reverse so the
                // first-yielded expansion is explored first.
                for expansion in expansions.into_iter().rev() {
                    let mut fork = branch.clone();
                    apply_expansion(&mut fork, id, expansion);
                    self.stack.push(fork);
                }
                continue 'branches;
            }
        }
        None
    }
}
