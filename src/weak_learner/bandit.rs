use rand::prelude::*;

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::condition_learner::{
    ConditionLearner,
    ExhaustiveConditionLearner,
    ScoredCondition,
};
use crate::constants::*;
use crate::criterion::SplittingCriterion;
use crate::error::{Error, Result};
use crate::expression::Expression;
use crate::logging::{Logger, Verbosity};
use crate::sample::Table;

use super::*;


/// A queued arm with the index it was pushed with.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Entry {
    index: f64,
    handle: usize,
}


impl Eq for Entry {}


impl Ord for Entry {
    // Max-heap on the index; equal indices pop the smaller handle first.
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.total_cmp(&other.index)
            .then_with(|| other.handle.cmp(&self.handle))
    }
}


impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}


/// Play statistics of one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    /// Position of the candidate in the candidate list.
    pub candidate: usize,
    /// Number of plays.
    pub plays: usize,
    /// Mean of the observed scores.
    pub mean: f64,
}


/// Arms addressed by handle, and a priority queue of
/// `(index, handle)` entries.
/// The index of an arm is `mean + exploration / plays`,
/// or `+∞` before its first play.
/// An arm is queued at most once; it is pushed back after each play
/// with its new index, unless it is retired.
#[derive(Debug, Clone)]
pub struct ArmPool {
    arms: Vec<Arm>,
    queue: BinaryHeap<Entry>,
    exploration: f64,
}


impl ArmPool {
    /// One queued arm per candidate.
    pub fn new<I>(candidates: I, exploration: f64) -> Self
        where I: IntoIterator<Item = usize>
    {
        let arms = candidates.into_iter()
            .map(|candidate| Arm { candidate, plays: 0, mean: 0.0 })
            .collect::<Vec<_>>();
        let queue = (0..arms.len())
            .map(|handle| Entry { index: f64::INFINITY, handle })
            .collect();
        Self { arms, queue, exploration }
    }


    /// The arm behind `handle`.
    #[inline]
    pub fn arm(&self, handle: usize) -> &Arm {
        &self.arms[handle]
    }


    /// The current index of arm `handle`.
    pub fn index(&self, handle: usize) -> f64 {
        let arm = &self.arms[handle];
        if arm.plays == 0 {
            return f64::INFINITY;
        }
        arm.mean + self.exploration / arm.plays as f64
    }


    /// Removes the arm with the highest index from the queue.
    pub fn pop(&mut self) -> Option<(usize, f64)> {
        self.queue.pop().map(|entry| (entry.handle, entry.index))
    }


    /// Handles of the queued arms, in no particular order.
    pub fn queued(&self) -> impl Iterator<Item = usize> + '_ {
        self.queue.iter().map(|entry| entry.handle)
    }


    /// Records a play of arm `handle`, which must have been popped.
    /// The arm is queued again unless `retire` is set.
    pub fn record(&mut self, handle: usize, score: f64, retire: bool) {
        let arm = &mut self.arms[handle];
        arm.plays += 1;
        arm.mean += (score - arm.mean) / arm.plays as f64;

        if !retire {
            let index = self.index(handle);
            self.queue.push(Entry { index, handle });
        }
    }


    /// The played arm with the best mean score.
    /// Ties go to the smaller handle.
    pub fn best(&self) -> Option<usize> {
        self.arms.iter()
            .enumerate()
            .filter(|(_, arm)| arm.plays > 0)
            .fold(None, |best: Option<(usize, f64)>, (handle, arm)| {
                match best {
                    Some((_, mean)) if mean >= arm.mean => best,
                    _ => Some((handle, arm.mean)),
                }
            })
            .map(|(handle, _)| handle)
    }
}


/// Chooses a condition by playing candidates as bandit arms.
///
/// The rows of the node are shuffled once per search.
/// The `k`-th play of an arm scores its candidate on the first
/// `k × mini_batch_size` rows of that order,
/// where `mini_batch_size = mini_batch_relative_size × #rows`.
/// The arm with the highest upper-confidence index is played next.
/// An arm that has been scored on every row is retired.
/// The search stops at the first play that exceeds the budget;
/// the arm with the best mean is then scored on every row.
#[derive(Debug)]
pub struct BanditBasedWeakLearner {
    relative_budget: f64,
    mini_batch_relative_size: f64,
    exploration: f64,
    seed: u64,
    rng: StdRng,
    scorer: ExhaustiveConditionLearner,
    evaluations: usize,
    logger: Logger,
}


impl BanditBasedWeakLearner {
    /// Construct a new instance of `BanditBasedWeakLearner`.
    pub fn new(
        relative_budget: f64,
        mini_batch_relative_size: f64,
        seed: u64,
    ) -> Result<Self>
    {
        check_relative_budget(relative_budget)?;
        let size_ok = mini_batch_relative_size > 0.0
            && mini_batch_relative_size <= 1.0;
        if !size_ok {
            let reason = format!(
                "the mini-batch size must be in (0, 1]. \
                 got {mini_batch_relative_size}."
            );
            return Err(Error::invalid("mini_batch_relative_size", reason));
        }

        Ok(Self {
            relative_budget,
            mini_batch_relative_size,
            exploration: DEFAULT_EXPLORATION_COEFFICIENT,
            seed,
            rng: StdRng::seed_from_u64(seed),
            scorer: ExhaustiveConditionLearner::with_verbosity(Verbosity::Silent),
            evaluations: 0,
            logger: Logger::new("bandit", Verbosity::default()),
        })
    }


    /// Set the exploration coefficient `C` of the arm index
    /// `mean + C / plays`.
    pub fn exploration(mut self, exploration: f64) -> Result<Self> {
        if !(exploration.is_finite() && exploration >= 0.0) {
            let reason = format!(
                "the exploration coefficient must be non-negative. \
                 got {exploration}."
            );
            return Err(Error::invalid("exploration", reason));
        }
        self.exploration = exploration;
        Ok(self)
    }


    /// Set the verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.logger = Logger::new("bandit", verbosity);
        self
    }


    /// Evaluations spent by the last call to `learn`.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}


impl ConditionLearner for BanditBasedWeakLearner {
    fn name(&self) -> &str {
        "Bandit-based weak learner"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = vec![
            ("Relative budget", format!("{}", self.relative_budget)),
            ("Mini-batch size", format!("{}", self.mini_batch_relative_size)),
            ("Exploration", format!("{}", self.exploration)),
            ("Seed", format!("{}", self.seed)),
        ];
        Some(info)
    }


    fn learn(
        &mut self,
        table: &Table,
        criterion: &mut dyn SplittingCriterion,
        candidates: &[Expression],
    ) -> Option<ScoredCondition>
    {
        self.evaluations = 0;
        let indices = criterion.indices().clone();
        let n_rows = indices.len();
        let budget = evaluation_budget(self.relative_budget, n_rows);
        if candidates.is_empty() || n_rows == 0 || budget < n_rows {
            return None;
        }
        // The final scoring on every row is paid for up front.
        let play_budget = budget - n_rows;

        let batch_size = (self.mini_batch_relative_size * n_rows as f64)
            .round() as usize;
        let batch_size = batch_size.clamp(1, n_rows);
        let order = shuffled_rows(&indices, &mut self.rng);

        let arms = (0..candidates.len())
            .filter(|&c| !candidates[c].is_constant());
        let mut pool = ArmPool::new(arms, self.exploration);

        let mut plays = 0_usize;
        while let Some((handle, index)) = pool.pop() {
            let arm = pool.arm(handle);
            let size = ((arm.plays + 1) * batch_size).min(n_rows);
            if self.evaluations + size > play_budget {
                break;
            }

            let candidate = &candidates[arm.candidate];
            criterion.rebind(prefix(&order, size, &indices));
            let Some(scored) = self.scorer.score_candidate(table, criterion, candidate) else {
                continue;
            };
            self.evaluations += size;
            plays += 1;
            self.logger.trace(format!(
                "arm {handle} (index {index:.4}) scores {:.6} on {size} rows",
                scored.score,
            ));
            pool.record(handle, scored.score, size >= n_rows);
        }
        criterion.rebind(indices);

        let best = pool.best()?;
        self.evaluations += n_rows;
        self.logger.detail(format!(
            "{plays} plays, {} evaluations of {budget}", self.evaluations
        ));
        let candidate = &candidates[pool.arm(best).candidate];
        self.scorer.score_candidate(table, criterion, candidate)
    }


    fn stop_batch(&mut self) {
        self.scorer.stop_batch();
    }
}
