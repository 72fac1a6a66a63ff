use rand::prelude::*;

use crate::criterion::SplittingCriterion;
use crate::expression::{Expression, ExpressionType};
use crate::logging::{Logger, Verbosity};
use crate::sample::Table;

use super::{ConditionLearner, ScoredCondition, keep_best};


/// Extremely randomized split search.
/// Each numeric candidate is scored at one threshold drawn uniformly
/// between its smallest and largest value on the node's rows.
/// Boolean candidates are scored as they are.
#[derive(Debug, Clone)]
pub struct RandomSplitConditionLearner {
    rng: StdRng,
    seed: u64,
    logger: Logger,
}


impl RandomSplitConditionLearner {
    /// Construct a learner whose draws are determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self::with_verbosity(seed, Verbosity::default())
    }


    /// Construct a learner that logs at `verbosity`.
    pub fn with_verbosity(seed: u64, verbosity: Verbosity) -> Self {
        let rng = StdRng::seed_from_u64(seed);
        let logger = Logger::new("random split", verbosity);
        Self { rng, seed, logger }
    }


    fn random_stump(
        &mut self,
        table: &Table,
        criterion: &mut dyn SplittingCriterion,
        candidate: &Expression,
    ) -> Option<ScoredCondition>
    {
        let (min, max) = criterion.indices()
            .iter()
            .filter_map(|row| candidate.evaluate_numeric(table, row))
            .fold(None, |range: Option<(f64, f64)>, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let threshold = if min < max {
            let t = self.rng.gen_range(min..max);
            if t > min { t } else { 0.5 * (min + max) }
        } else {
            min
        };

        let condition = Expression::stump(candidate.clone(), threshold);
        let score = criterion.evaluate(table, &condition);
        Some(ScoredCondition { condition, score })
    }
}


impl ConditionLearner for RandomSplitConditionLearner {
    fn name(&self) -> &str {
        "Random split condition learner"
    }


    fn info(&self) -> Option<Vec<(&str, String)>> {
        Some(vec![("Seed", self.seed.to_string())])
    }


    fn learn(
        &mut self,
        table: &Table,
        criterion: &mut dyn SplittingCriterion,
        candidates: &[Expression],
    ) -> Option<ScoredCondition>
    {
        let mut best = None;
        for candidate in candidates {
            if candidate.is_constant() {
                continue;
            }
            let scored = match candidate.output_type() {
                ExpressionType::Boolean => {
                    let score = criterion.evaluate(table, candidate);
                    Some(ScoredCondition { condition: candidate.clone(), score })
                },
                ExpressionType::Numeric => {
                    self.random_stump(table, criterion, candidate)
                },
            };
            if let Some(scored) = scored {
                self.logger.trace(
                    format!("{} scores {:.6}", scored.condition, scored.score)
                );
                keep_best(&mut best, scored);
            }
        }
        best
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::{Targets, VarianceReduction};
    use crate::sample::{Column, IndexSet};
    use std::sync::Arc;

    #[test]
    fn thresholds_fall_inside_the_observed_range() {
        let x = vec![2.0, 4.0, 6.0, 8.0];
        let y = vec![0.0, 0.0, 1.0, 1.0];
        let table = Table::new(vec![
            Column::from_numeric("x", x),
            Column::from_numeric("y", y),
        ]).unwrap();
        let targets = Targets::from_column(table.column(1)).unwrap();
        let mut criterion = VarianceReduction::default();
        criterion.configure(Arc::new(targets), None, IndexSet::full(4));

        let candidates = vec![Expression::variable(&table, 0).unwrap()];
        for seed in 0..20 {
            let mut learner = RandomSplitConditionLearner::new(seed);
            let scored = learner.learn(&table, &mut criterion, &candidates)
                .unwrap();
            let Expression::Stump { threshold, .. } = scored.condition else {
                panic!("expected a stump, got {:?}", scored.condition);
            };
            assert!(2.0 < threshold && threshold < 8.0, "got {threshold}");
            assert!(scored.score > 0.0);
        }
    }


    #[test]
    fn same_seed_same_split() {
        let x = vec![0.0, 3.0, 1.0, 7.0, 5.0];
        let y = vec![1.0, 2.0, 0.0, 3.0, 2.0];
        let table = Table::new(vec![
            Column::from_numeric("x", x),
            Column::from_numeric("y", y),
        ]).unwrap();
        let targets = Arc::new(Targets::from_column(table.column(1)).unwrap());
        let candidates = vec![Expression::variable(&table, 0).unwrap()];

        let mut results = Vec::new();
        for _ in 0..2 {
            let mut criterion = VarianceReduction::default();
            criterion.configure(targets.clone(), None, IndexSet::full(5));
            let mut learner = RandomSplitConditionLearner::new(42);
            results.push(learner.learn(&table, &mut criterion, &candidates));
        }
        assert_eq!(results[0], results[1]);
    }
}
