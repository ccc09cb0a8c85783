use crate::{CancelToken, SimAction, SimWorld, TickContext};

/// Forward-execution budget for driving one action inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepBudget {
    pub max_steps: u32,
    pub dt_seconds: f32,
}

impl Default for StepBudget {
    fn default() -> Self {
        Self {
            max_steps: 600,
            dt_seconds: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    BudgetExhausted,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Ticks actually consumed.
    pub steps: u32,
}

/// Drive a single action until it completes, the step budget runs out, or the
/// cancel token is observed. The token is checked every step.
pub fn run_action_forward<W>(
    action: &mut dyn SimAction<W>,
    world: &mut W,
    budget: StepBudget,
    cancel: &CancelToken,
    start_tick: u64,
) -> RunReport
where
    W: SimWorld,
{
    for step in 0..budget.max_steps {
        if cancel.is_cancelled() {
            return RunReport {
                outcome: RunOutcome::Cancelled,
                steps: step,
            };
        }
        let ctx = TickContext::new(start_tick + u64::from(step), budget.dt_seconds);
        world.step(&ctx);
        action.update(world, &ctx);
        if action.status().is_complete() {
            return RunReport {
                outcome: RunOutcome::Completed,
                steps: step + 1,
            };
        }
    }
    RunReport {
        outcome: RunOutcome::BudgetExhausted,
        steps: budget.max_steps,
    }
}
