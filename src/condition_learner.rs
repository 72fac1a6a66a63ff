//! Searches for the best condition of a tree node.
use crate::criterion::SplittingCriterion;
use crate::expression::Expression;
use crate::sample::Table;

mod sorted_values;
mod exhaustive;
mod random_split;

pub use sorted_values::{SortedValues, SortedValuesCache};
pub use exhaustive::{ExhaustiveConditionLearner, best_threshold};
pub use random_split::RandomSplitConditionLearner;


/// A condition together with its criterion score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCondition {
    /// A boolean expression.
    pub condition: Expression,
    /// Its score under the criterion that found it.
    pub score: f64,
}


/// Finds a condition maximizing a [`SplittingCriterion`].
///
/// Implementors keep mutable search state (caches, random streams),
/// so a learner must not be shared by concurrent tree builds.
pub trait ConditionLearner: Send {
    /// Name of the learner.
    fn name(&self) -> &str;


    /// Parameters to print before training, as `(name, value)` pairs.
    fn info(&self) -> Option<Vec<(&str, String)>> {
        None
    }


    /// Returns the best condition among `candidates`
    /// for the rows `criterion` is bound to,
    /// or `None` if no candidate could be scored.
    /// On return, the criterion is still bound to the same rows.
    fn learn(
        &mut self,
        table: &Table,
        criterion: &mut dyn SplittingCriterion,
        candidates: &[Expression],
    ) -> Option<ScoredCondition>;


    /// Drops the state kept for one training batch.
    fn stop_batch(&mut self) {}
}


/// Keeps the first candidate among equally scored ones.
pub(crate) fn keep_best(
    best: &mut Option<ScoredCondition>,
    candidate: ScoredCondition,
)
{
    let better = best.as_ref()
        .map_or(true, |best| candidate.score > best.score);
    if better {
        *best = Some(candidate);
    }
}
