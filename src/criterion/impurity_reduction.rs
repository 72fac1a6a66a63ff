use fixedbitset::FixedBitSet;

use std::sync::Arc;

use crate::sample::IndexSet;
use super::SplittingCriterion;
use super::targets::Targets;
use super::statistics::*;


const FAIL: usize = 0;
const PASS: usize = 1;
const MISSING: usize = 2;


/// Reduction of the variance of a numeric target.
pub type VarianceReduction = ImpurityReduction<WeightedMoments>;
/// Reduction of the entropy of a class label.
pub type InformationGain = ImpurityReduction<ClassHistogram<Entropy>>;
/// Reduction of the Gini index of a class label.
pub type GiniImpurity = ImpurityReduction<ClassHistogram<Gini>>;


/// Scores a split by how much it reduces an impurity:
/// `I(rows) - Σ_s (W_s / W) I(s)` over the fail, pass and missing sides,
/// where `W_s` is the weight of side `s`.
/// A split that leaves fewer than two non-empty sides scores `0`.
#[derive(Debug, Clone, Default)]
pub struct ImpurityReduction<S> {
    targets: Option<Arc<Targets>>,
    weights: Option<Arc<[f64]>>,
    indices: IndexSet,

    // Bit `i` is set iff the `i`-th row of `indices` is on the pass side.
    // Sized to the bound rows, not to the table.
    pass: FixedBitSet,
    missing: FixedBitSet,

    sides: [S; 3],
    total: S,
}


impl<S: SideStatistics> ImpurityReduction<S> {
    #[inline]
    fn weight(&self, row: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |w| w[row])
    }


    /// Position of `row` in the bound rows.
    #[inline]
    fn position(&self, row: usize) -> usize {
        let position = self.indices.as_slice().binary_search(&row);
        debug_assert!(position.is_ok(), "row {row} is not bound");
        position.unwrap_or_else(|p| p)
    }


    fn clear_sides(&mut self) {
        self.pass.clear();
        self.missing.clear();
        if let Some(targets) = &self.targets {
            self.sides.iter_mut().for_each(|side| side.reset(targets));
        }
    }
}


impl<S: SideStatistics> SplittingCriterion for ImpurityReduction<S> {
    fn name(&self) -> &'static str {
        S::NAME
    }


    fn configure(
        &mut self,
        targets: Arc<Targets>,
        weights: Option<Arc<[f64]>>,
        indices: IndexSet,
    )
    {
        self.targets = Some(targets);
        self.weights = weights;
        self.rebind(indices);
    }


    fn rebind(&mut self, indices: IndexSet) {
        self.pass = FixedBitSet::with_capacity(indices.len());
        self.missing = FixedBitSet::with_capacity(indices.len());
        let Some(targets) = self.targets.clone() else {
            self.indices = indices;
            return;
        };

        self.total.reset(&targets);
        for row in indices.iter() {
            let w = self.weight(row);
            self.total.add(&targets, row, w);
        }
        self.indices = indices;
        self.set_constant_prediction(false);
    }


    #[inline]
    fn indices(&self) -> &IndexSet {
        &self.indices
    }


    fn set_predictions(&mut self, predictions: &[Option<bool>]) {
        debug_assert_eq!(predictions.len(), self.indices.len());
        self.clear_sides();
        let Some(targets) = self.targets.clone() else { return; };

        let indices = self.indices.clone();
        let rows = indices.iter().zip(predictions).enumerate();
        for (position, (row, prediction)) in rows {
            let w = self.weight(row);
            let side = match prediction {
                Some(false) => FAIL,
                Some(true) => {
                    self.pass.insert(position);
                    PASS
                },
                None => {
                    self.missing.insert(position);
                    MISSING
                },
            };
            self.sides[side].add(&targets, row, w);
        }
    }


    fn set_constant_prediction(&mut self, value: bool) {
        self.clear_sides();
        if value {
            self.pass.insert_range(..);
            self.sides[PASS] = self.total.clone();
        } else {
            self.sides[FAIL] = self.total.clone();
        }
    }


    fn flip_prediction(&mut self, row: usize) {
        let position = self.position(row);
        debug_assert!(!self.missing.contains(position));
        let Some(targets) = self.targets.clone() else { return; };

        let w = self.weight(row);
        let (from, to) = if self.pass.contains(position) {
            (PASS, FAIL)
        } else {
            (FAIL, PASS)
        };
        self.sides[from].add(&targets, row, -w);
        self.sides[to].add(&targets, row, w);
        self.pass.toggle(position);
    }


    fn compute_criterion(&self) -> f64 {
        let total = self.total.weight();
        let non_empty = self.sides.iter()
            .filter(|side| side.weight() > EMPTY_SIDE)
            .count();
        if total <= EMPTY_SIDE || non_empty < 2 {
            return self.worst_score();
        }

        let within = self.sides.iter()
            .filter(|side| side.weight() > EMPTY_SIDE)
            .map(|side| side.weight() / total * side.impurity())
            .sum::<f64>();
        self.total.impurity() - within
    }
}
