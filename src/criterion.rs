//! Splitting criteria.
//! A criterion is bound to a fixed index set and scores
//! the current assignment of its rows to the sides of a split.
//! Single rows can be moved across the split in `O(1)`,
//! which makes a full threshold scan linear after sorting.
use serde::{Serialize, Deserialize};

use std::fmt;
use std::sync::Arc;

use crate::expression::Expression;
use crate::sample::{IndexSet, Table};

mod targets;
mod statistics;
mod impurity_reduction;

pub use targets::{Targets, Vote};
pub use statistics::{
    WeightedMoments,
    ClassHistogram,
    SideStatistics,
    ClassImpurity,
    Entropy,
    Gini,
};
pub use impurity_reduction::{
    ImpurityReduction,
    VarianceReduction,
    InformationGain,
    GiniImpurity,
};


/// Scores a binary split of a fixed set of rows.
/// Higher scores are better.
pub trait SplittingCriterion: Send {
    /// Human readable name.
    fn name(&self) -> &'static str;


    /// Binds the criterion to `indices`.
    /// Rows are weighted by `weights[row]`, or by `1` if `weights` is `None`.
    /// All rows start on the `false` side.
    fn configure(
        &mut self,
        targets: Arc<Targets>,
        weights: Option<Arc<[f64]>>,
        indices: IndexSet,
    );


    /// Binds the criterion to other rows of the same targets.
    fn rebind(&mut self, indices: IndexSet);


    /// The rows under evaluation.
    fn indices(&self) -> &IndexSet;


    /// Assigns every row to a side.
    /// `predictions[k]` is the side of `indices()[k]`;
    /// `None` puts the row on the missing side.
    fn set_predictions(&mut self, predictions: &[Option<bool>]);


    /// Puts every row on the `value` side.
    fn set_constant_prediction(&mut self, value: bool);


    /// Moves `row` to the other side.
    /// `row` must not be on the missing side.
    fn flip_prediction(&mut self, row: usize);


    /// The score of the current assignment.
    fn compute_criterion(&self) -> f64;


    /// The score of an assignment that does not split anything.
    fn worst_score(&self) -> f64 {
        0.0
    }


    /// Scores the split induced by a boolean `condition`.
    fn evaluate(&mut self, table: &Table, condition: &Expression) -> f64 {
        let predictions = self.indices()
            .iter()
            .map(|row| condition.evaluate_boolean(table, row))
            .collect::<Vec<_>>();
        self.set_predictions(&predictions);
        self.compute_criterion()
    }
}


/// The splitting criteria available to tree learners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Criterion {
    /// Reduction of the weighted variance of a numeric target.
    #[default]
    VarianceReduction,
    /// Reduction of the entropy of a class label.
    InformationGain,
    /// Reduction of the Gini index of a class label.
    Gini,
}


impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::VarianceReduction => "Variance reduction",
            Self::InformationGain => "Information gain",
            Self::Gini => "Gini index",
        };

        write!(f, "{name}")
    }
}


impl Criterion {
    /// Returns `true` if this criterion needs a class label target.
    pub fn requires_labels(&self) -> bool {
        !matches!(self, Self::VarianceReduction)
    }


    /// A fresh, unconfigured criterion.
    pub fn build(&self) -> Box<dyn SplittingCriterion> {
        match self {
            Self::VarianceReduction => Box::<VarianceReduction>::default(),
            Self::InformationGain => Box::<InformationGain>::default(),
            Self::Gini => Box::<GiniImpurity>::default(),
        }
    }
}
