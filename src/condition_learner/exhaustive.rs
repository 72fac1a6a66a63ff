use crate::criterion::SplittingCriterion;
use crate::expression::{Expression, ExpressionType};
use crate::logging::{Logger, Verbosity};
use crate::sample::Table;

use super::{ConditionLearner, ScoredCondition, keep_best};
use super::sorted_values::SortedValuesCache;


const TIE_TOLERANCE: f64 = 1e-12;


/// Tries every candidate.
/// Boolean candidates are scored as they are;
/// numeric candidates are scored at their best threshold.
#[derive(Debug, Default)]
pub struct ExhaustiveConditionLearner {
    cache: SortedValuesCache,
    logger: Logger,
}


impl ExhaustiveConditionLearner {
    /// Construct a new instance of `ExhaustiveConditionLearner`.
    pub fn new() -> Self {
        Self::with_verbosity(Verbosity::default())
    }


    /// Construct a learner that logs at `verbosity`.
    pub fn with_verbosity(verbosity: Verbosity) -> Self {
        let logger = Logger::new("exhaustive", verbosity);
        Self { cache: SortedValuesCache::new(), logger }
    }


    /// The sorted values cache.
    pub fn cache(&self) -> &SortedValuesCache {
        &self.cache
    }


    /// Scores one candidate on the rows `criterion` is bound to.
    /// Numeric candidates are turned into a stump at their best threshold.
    /// Constant candidates never split anything and are skipped.
    pub fn score_candidate(
        &mut self,
        table: &Table,
        criterion: &mut dyn SplittingCriterion,
        candidate: &Expression,
    ) -> Option<ScoredCondition>
    {
        if candidate.is_constant() {
            return None;
        }

        let scored = match candidate.output_type() {
            ExpressionType::Boolean => {
                let score = criterion.evaluate(table, candidate);
                ScoredCondition { condition: candidate.clone(), score }
            },
            ExpressionType::Numeric => {
                let indices = criterion.indices().clone();
                let sorted = self.cache
                    .sorted_values(table, candidate, &indices);

                let predictions = indices.iter()
                    .map(|row| {
                        candidate.evaluate_numeric(table, row)
                            .map(|_| false)
                    })
                    .collect::<Vec<_>>();
                criterion.set_predictions(&predictions);

                let (threshold, score) = best_threshold(criterion, &sorted);
                let condition = Expression::stump(candidate.clone(), threshold);
                ScoredCondition { condition, score }
            },
        };
        self.logger.trace(
            format!("{} scores {:.6}", scored.condition, scored.score)
        );
        Some(scored)
    }
}


impl ConditionLearner for ExhaustiveConditionLearner {
    fn name(&self) -> &str {
        "Exhaustive condition learner"
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
            if let Some(scored) = self.score_candidate(table, criterion, candidate) {
                keep_best(&mut best, scored);
            }
        }
        best
    }


    fn stop_batch(&mut self) {
        self.cache.clear();
    }
}


/// Finds the best threshold of a numeric input.
///
/// `sorted` holds the `(row, value)` pairs of the rows with a value,
/// and `criterion` must have every one of those rows on the `false` side.
/// Rows move to the `true` side from the highest value down,
/// all rows sharing a value at once, and the criterion is read
/// between consecutive distinct values.
/// A threshold is the midpoint of the two values around it.
/// When several thresholds reach the best score,
/// the median of them is returned.
///
/// Returns `(threshold, score)`. With no value at all,
/// the threshold is `0` and the score that of the initial assignment.
/// With a single distinct value, the threshold is that value.
pub fn best_threshold(
    criterion: &mut dyn SplittingCriterion,
    sorted: &[(usize, f64)],
) -> (f64, f64)
{
    let Some(&(_, highest)) = sorted.last() else {
        return (0.0, criterion.compute_criterion());
    };
    let initial = criterion.compute_criterion();

    let mut best_score = f64::NEG_INFINITY;
    let mut best_thresholds = Vec::new();
    let mut previous = highest;
    for &(row, value) in sorted.iter().rev() {
        if value < previous {
            let score = criterion.compute_criterion();
            if ties(score, best_score) {
                best_score = best_score.max(score);
                best_thresholds.push((value + previous) / 2.0);
            } else if score > best_score {
                best_thresholds.clear();
                best_score = score;
                best_thresholds.push((value + previous) / 2.0);
            }
            previous = value;
        }
        criterion.flip_prediction(row);
    }

    if best_thresholds.is_empty() {
        return (highest, initial);
    }
    (best_thresholds[best_thresholds.len() / 2], best_score)
}


/// Scores updated row by row drift in their last bits,
/// so equal splits are compared with a relative tolerance.
#[inline]
fn ties(score: f64, best: f64) -> bool {
    best.is_finite()
        && (score - best).abs() <= TIE_TOLERANCE * best.abs().max(1.0)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::criterion::{Targets, VarianceReduction};
    use crate::sample::{Column, IndexSet};
    use std::sync::Arc;

    fn setup(x: Vec<f64>, y: Vec<f64>)
        -> (Table, VarianceReduction, Expression)
    {
        let n_rows = x.len();
        let table = Table::new(vec![
            Column::from_numeric("x", x),
            Column::from_numeric("y", y),
        ]).unwrap();
        let targets = Targets::from_column(table.column(1)).unwrap();
        let mut criterion = VarianceReduction::default();
        criterion.configure(Arc::new(targets), None, IndexSet::full(n_rows));
        let x = Expression::variable(&table, 0).unwrap();
        (table, criterion, x)
    }


    #[test]
    fn ties_resolve_to_the_median_threshold() {
        let (table, mut criterion, x) = setup(
            vec![0.5, 1.5, 2.5, 3.5],
            vec![0.0, 0.0, 0.0, 0.0],
        );
        let mut learner = ExhaustiveConditionLearner::new();
        let scored = learner.score_candidate(&table, &mut criterion, &x)
            .unwrap();
        assert_eq!(scored.condition, Expression::stump(x, 2.0));
    }


    #[test]
    fn mirrored_splits_tie() {
        // `x < 4.5` leaves one 0.7 among the high rows,
        // `x < 6.5` one 0.1 among the low rows.
        let (table, mut criterion, x) = setup(
            (1..=10).map(f64::from).collect(),
            vec![0.7, 0.7, 0.7, 0.7, 0.1, 0.7, 0.1, 0.1, 0.1, 0.1],
        );
        let mut learner = ExhaustiveConditionLearner::new();
        let scored = learner.score_candidate(&table, &mut criterion, &x)
            .unwrap();
        assert_eq!(scored.condition, Expression::stump(x, 4.5));
        assert!(scored.score > 0.0);
    }


    #[test]
    fn equal_values_are_never_separated() {
        let (table, mut criterion, x) = setup(
            vec![1.0, 1.0, 1.0, 2.0],
            vec![0.0, 0.0, 9.0, 9.0],
        );
        let mut learner = ExhaustiveConditionLearner::new();
        let scored = learner.score_candidate(&table, &mut criterion, &x)
            .unwrap();
        assert_eq!(scored.condition, Expression::stump(x, 1.5));
    }


    #[test]
    fn all_missing_input_has_zero_threshold() {
        let (table, mut criterion, x) = setup(
            vec![f64::NAN, f64::NAN],
            vec![0.0, 1.0],
        );
        let mut learner = ExhaustiveConditionLearner::new();
        let scored = learner.score_candidate(&table, &mut criterion, &x)
            .unwrap();
        assert_eq!(scored.condition, Expression::stump(x, 0.0));
        assert_eq!(scored.score, criterion.worst_score());
    }


    #[test]
    fn constants_are_skipped() {
        let (table, mut criterion, _) = setup(vec![1.0, 2.0], vec![0.0, 1.0]);
        let mut learner = ExhaustiveConditionLearner::new();
        let candidates = [Expression::Constant(true)];
        assert!(learner.learn(&table, &mut criterion, &candidates).is_none());
    }
}
