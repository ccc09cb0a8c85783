use skirmish_sim::SimWorld;
use tracing::debug;

use crate::{Plan, TaskSpec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Evaluates a world snapshot into a score plus a human-readable breakdown.
pub trait PlanScorer<W> {
    fn name(&self) -> &str;
    fn score(&self, state: &W) -> ScoreReport;
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoreReport {
    pub score: f64,
    /// Human-readable account of how the score came together.
    pub breakdown: String,
    /// Named secondary scores recorded for diagnostics.
    pub alternates: Vec<(String, f64)>,
}

impl ScoreReport {
    pub fn new(score: f64, breakdown: impl Into<String>) -> Self {
        Self {
            score,
            breakdown: breakdown.into(),
            alternates: Vec::new(),
        }
    }

    pub fn with_alternate(mut self, name: impl Into<String>, score: f64) -> Self {
        self.alternates.push((name.into(), score));
        self
    }
}

/// One scored plan. Immutable after creation; only ever dropped by pruning.
pub struct PlanRecord<T, S, W> {
    pub plan: Plan<T, S, W>,
    pub score: f64,
    /// Name of the scoring function that produced `score`.
    pub scorer: String,
    pub breakdown: String,
    pub alternates: Vec<(String, f64)>,
}

/// Population of scored plans with score-diversity ("novelty") pruning.
///
/// Only the thread driving the search loop mutates a storage; there are no
/// concurrent writers.
pub struct PlanStorage<T, S, W> {
    records: Vec<PlanRecord<T, S, W>>,
}

impl<T, S, W> Default for PlanStorage<T, S, W> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T, S, W> PlanStorage<T, S, W>
where
    T: TaskSpec,
    S: Clone + 'static,
    W: SimWorld,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PlanRecord<T, S, W>] {
        &self.records
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Score `plan` and keep the record. Scoring runs against the plan's end
    /// state when the search recorded one, otherwise its plan-time state.
    pub fn add(&mut self, plan: Plan<T, S, W>, scorer: &dyn PlanScorer<W>) {
        let report = {
            let state = plan.end_state().unwrap_or_else(|| plan.plan_time_state());
            scorer.score(state)
        };
        self.records.push(PlanRecord {
            plan,
            score: report.score,
            scorer: scorer.name().to_string(),
            breakdown: report.breakdown,
            alternates: report.alternates,
        });
    }

    /// Stable sort by score, best first.
    pub fn sort_descending(&mut self) {
        self.records.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    /// Prune down to `max_to_keep` records, preferring to drop records whose
    /// scores are near-duplicates of a higher score already kept.
    ///
    /// `max_to_keep == 0` clears the whole storage.
    ///
    /// # Panics
    ///
    /// Panics if pruning cannot converge; that indicates corrupted scores
    /// rather than a valid population.
    pub fn drop_non_novel(&mut self, max_to_keep: usize) {
        if max_to_keep == 0 {
            self.records.clear();
            return;
        }
        if self.records.len() <= max_to_keep {
            return;
        }

        let mut to_drop = self.records.len() - max_to_keep;
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for record in &self.records {
            lo = lo.min(record.score);
            hi = hi.max(record.score);
        }
        let score_range = hi - lo;
        let max_epsilon = 0.1 * score_range;
        let mut epsilon = f64::EPSILON;
        let mut reversed_once = false;

        while to_drop > 0 {
            let dropped = self.drop_pass(epsilon, &mut to_drop);
            if to_drop == 0 {
                break;
            }
            if dropped > 0 {
                continue;
            }
            if epsilon < max_epsilon {
                epsilon = (epsilon * 2.0).min(max_epsilon);
            } else if !reversed_once {
                // Already-ascending input defeats the backward scan; one
                // reversal re-seeds the passes.
                self.records.reverse();
                reversed_once = true;
                epsilon = f64::EPSILON;
            } else {
                panic!(
                    "novelty pruning failed to converge: {} records left, {} still to drop, score range {}",
                    self.records.len(),
                    to_drop,
                    score_range
                );
            }
        }
        debug!(kept = self.records.len(), "novelty pruning done");
    }

    /// One backward scan: drop records whose score is within `epsilon` of
    /// (and not greater than) a score already accepted in this pass. Returns
    /// the number dropped.
    fn drop_pass(&mut self, epsilon: f64, to_drop: &mut usize) -> usize {
        let mut accepted: Vec<f64> = Vec::new();
        let mut dropped = 0;
        let mut i = self.records.len();
        while i > 0 && *to_drop > 0 {
            i -= 1;
            let score = self.records[i].score;
            let near_duplicate = accepted.iter().any(|&a| score <= a && a - score <= epsilon);
            if near_duplicate {
                self.records.remove(i);
                *to_drop -= 1;
                dropped += 1;
            } else {
                accepted.push(score);
            }
        }
        dropped
    }
}
