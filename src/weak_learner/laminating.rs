use rand::prelude::*;
use rand::seq::index;

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


/// The shape of a halving schedule:
/// `n_candidates` candidates scored on `n_examples` rows in the first round.
/// Each later round keeps the better half of the candidates
/// and doubles the rows, up to every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaminatingPlan {
    /// Candidates in the first round.
    pub n_candidates: usize,
    /// Rows in the first round.
    pub n_examples: usize,
}


impl LaminatingPlan {
    /// `(candidates, rows)` of each round, for a node of `n_rows` rows.
    pub fn rounds(&self, n_rows: usize) -> Vec<(usize, usize)> {
        let mut rounds = Vec::new();
        let mut w = self.n_candidates;
        let mut m = self.n_examples.min(n_rows);
        loop {
            rounds.push((w, m));
            if w <= 1 || m >= n_rows {
                break;
            }
            w = (w + 1) / 2;
            m = (2 * m).min(n_rows);
        }
        rounds
    }


    /// Evaluations spent by the schedule,
    /// including the final scoring on every row.
    pub fn cost(&self, n_rows: usize) -> usize {
        let rounds = self.rounds(n_rows);
        let scans = rounds.iter().map(|(w, m)| w * m).sum::<usize>();
        let last_size = rounds.last().map_or(n_rows, |&(_, m)| m);
        if last_size < n_rows { scans + n_rows } else { scans }
    }


    /// The plan for `n_candidates` candidates and `n_rows` rows
    /// under `budget` evaluations.
    ///
    /// As many candidates as possible enter the first round,
    /// scored on `min_examples` rows.
    /// Once every candidate fits, the remaining budget enlarges the first
    /// round, choosing the size that spends the most without overspending.
    /// Returns `None` if not even one candidate fits.
    pub fn new(
        n_candidates: usize,
        n_rows: usize,
        budget: usize,
        min_examples: usize,
    ) -> Option<Self>
    {
        if n_candidates == 0 || n_rows == 0 {
            return None;
        }
        let n_min = min_examples.clamp(1, n_rows);
        let cost = |w: usize, m: usize| {
            Self { n_candidates: w, n_examples: m }.cost(n_rows)
        };

        let w0 = largest_feasible(1, n_candidates, |w| cost(w, n_min) <= budget)?;
        if w0 < n_candidates {
            return Some(Self { n_candidates: w0, n_examples: n_min });
        }

        // Rounds are constant between consecutive breakpoints,
        // and the cost grows with the first round inside each segment.
        let mut breakpoints = (0..usize::BITS)
            .map(|k| n_rows.div_ceil(1 << k))
            .filter(|&b| b > n_min)
            .collect::<Vec<_>>();
        breakpoints.push(n_min);
        breakpoints.sort_unstable();
        breakpoints.dedup();

        let mut best = (cost(n_candidates, n_min), n_min);
        for (k, &lo) in breakpoints.iter().enumerate() {
            let hi = breakpoints.get(k + 1).map_or(n_rows, |&b| b - 1);
            let feasible = |m: usize| cost(n_candidates, m) <= budget;
            if let Some(m) = largest_feasible(lo, hi, feasible) {
                let c = cost(n_candidates, m);
                if c >= best.0 {
                    best = (c, m);
                }
            }
        }
        Some(Self { n_candidates, n_examples: best.1 })
    }
}


/// The largest `x` in `[lo, hi]` with `feasible(x)`,
/// for a predicate that holds on a prefix of the range.
fn largest_feasible<F>(lo: usize, hi: usize, feasible: F) -> Option<usize>
    where F: Fn(usize) -> bool
{
    if lo > hi || !feasible(lo) {
        return None;
    }
    let (mut lo, mut hi) = (lo, hi);
    while lo < hi {
        let mid = lo + (hi - lo + 1) / 2;
        if feasible(mid) {
            lo = mid;
        } else {
            hi = mid - 1;
        }
    }
    Some(lo)
}


/// Successive halving over candidate conditions.
/// Every round scores the surviving candidates on a subsample,
/// keeps the better half and doubles the subsample.
/// The survivor is scored again on every row of the node.
///
/// # Example
///
/// ```no_run
/// use minitrees::prelude::*;
///
/// let learner = LaminatingWeakLearner::new(10.0, 20, 1234).unwrap();
/// ```
#[derive(Debug)]
pub struct LaminatingWeakLearner {
    relative_budget: f64,
    min_examples_for_laminating: usize,
    seed: u64,
    rng: StdRng,
    scorer: ExhaustiveConditionLearner,
    evaluations: usize,
    logger: Logger,
}


impl LaminatingWeakLearner {
    /// Construct a new instance of `LaminatingWeakLearner`.
    pub fn new(
        relative_budget: f64,
        min_examples_for_laminating: usize,
        seed: u64,
    ) -> Result<Self>
    {
        check_relative_budget(relative_budget)?;
        if min_examples_for_laminating == 0 {
            let reason = "at least one example is needed per round";
            return Err(Error::invalid("min_examples_for_laminating", reason));
        }

        Ok(Self {
            relative_budget,
            min_examples_for_laminating,
            seed,
            rng: StdRng::seed_from_u64(seed),
            scorer: ExhaustiveConditionLearner::with_verbosity(Verbosity::Silent),
            evaluations: 0,
            logger: Logger::new("laminating", Verbosity::default()),
        })
    }


    /// Set the verbosity.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.logger = Logger::new("laminating", verbosity);
        self
    }


    /// Evaluations spent by the last call to `learn`.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}


impl Default for LaminatingWeakLearner {
    fn default() -> Self {
        Self {
            relative_budget: DEFAULT_RELATIVE_BUDGET,
            min_examples_for_laminating: DEFAULT_MIN_EXAMPLES_FOR_LAMINATING,
            seed: DEFAULT_SEED,
            rng: StdRng::seed_from_u64(DEFAULT_SEED),
            scorer: ExhaustiveConditionLearner::with_verbosity(Verbosity::Silent),
            evaluations: 0,
            logger: Logger::new("laminating", Verbosity::default()),
        }
    }
}


impl ConditionLearner for LaminatingWeakLearner {
    fn name(&self) -> &str {
        "Laminating weak learner"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        let info = vec![
            ("Relative budget", format!("{}", self.relative_budget)),
            ("Min. examples", format!("{}", self.min_examples_for_laminating)),
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

        let plan = LaminatingPlan::new(
            candidates.len(),
            n_rows,
            budget,
            self.min_examples_for_laminating,
        );
        let Some(plan) = plan else {
            self.logger.detail(format!(
                "no candidate fits {budget} evaluations on {n_rows} rows"
            ));
            return None;
        };
        self.logger.detail(format!(
            "{} of {} candidates on {} of {n_rows} rows, \
             {} evaluations planned",
            plan.n_candidates,
            candidates.len(),
            plan.n_examples,
            plan.cost(n_rows),
        ));

        let mut pool = if plan.n_candidates < candidates.len() {
            let mut pool = index::sample(
                &mut self.rng, candidates.len(), plan.n_candidates
            ).into_vec();
            pool.sort_unstable();
            pool
        } else {
            (0..candidates.len()).collect::<Vec<_>>()
        };
        let order = shuffled_rows(&indices, &mut self.rng);

        let mut size = plan.n_examples;
        let winner = loop {
            criterion.rebind(prefix(&order, size, &indices));
            let mut scored = Vec::with_capacity(pool.len());
            for &c in &pool {
                let candidate = &candidates[c];
                if let Some(s) = self.scorer.score_candidate(table, criterion, candidate) {
                    scored.push((c, s));
                }
            }
            self.evaluations += pool.len() * size;

            scored.sort_by(|(c1, s1), (c2, s2)| {
                s2.score.total_cmp(&s1.score).then(c1.cmp(c2))
            });

            if scored.len() <= 1 || size >= n_rows {
                break scored.into_iter().next();
            }

            let keep = (scored.len() + 1) / 2;
            pool = scored.into_iter()
                .take(keep)
                .map(|(c, _)| c)
                .collect();
            size = (2 * size).min(n_rows);
        };

        if size >= n_rows {
            return winner.map(|(_, scored)| scored);
        }
        criterion.rebind(indices);
        let (c, _) = winner?;
        self.evaluations += n_rows;
        self.scorer.score_candidate(table, criterion, &candidates[c])
    }


    fn stop_batch(&mut self) {
        self.scorer.stop_batch();
    }
}
