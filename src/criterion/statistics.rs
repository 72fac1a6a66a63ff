//! Sufficient statistics of one side of a split.
//! Weights may be negative, which removes a row.
use std::marker::PhantomData;

use super::targets::Targets;


/// Below this mass a side is considered empty.
pub(crate) const EMPTY_SIDE: f64 = 1e-12;


/// Statistics that can be updated one row at a time.
pub trait SideStatistics: Clone + Default + Send {
    /// Name of the criterion built on these statistics.
    const NAME: &'static str;
    /// Resets to the statistics of no row.
    fn reset(&mut self, targets: &Targets);
    /// Adds `row` with weight `weight`.
    fn add(&mut self, targets: &Targets, row: usize, weight: f64);
    /// Total weight.
    fn weight(&self) -> f64;
    /// Impurity of the rows seen so far.
    fn impurity(&self) -> f64;
}


/// Weighted first and second moments of a real variable.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMoments {
    weight: f64,
    sum: f64,
    sum_sq: f64,
}


impl WeightedMoments {
    /// Adds `value` with weight `weight`.
    #[inline]
    pub fn push(&mut self, value: f64, weight: f64) {
        self.weight += weight;
        self.sum += weight * value;
        self.sum_sq += weight * value * value;
    }


    /// Total weight.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }


    /// Weighted mean, `0` if empty.
    pub fn mean(&self) -> f64 {
        if self.weight <= EMPTY_SIDE {
            return 0.0;
        }
        self.sum / self.weight
    }


    /// Weighted population variance, `0` if empty.
    pub fn variance(&self) -> f64 {
        if self.weight <= EMPTY_SIDE {
            return 0.0;
        }
        let mean = self.sum / self.weight;
        (self.sum_sq / self.weight - mean * mean).max(0.0)
    }
}


impl SideStatistics for WeightedMoments {
    const NAME: &'static str = "variance reduction";

    fn reset(&mut self, _targets: &Targets) {
        *self = Self::default();
    }


    #[inline]
    fn add(&mut self, targets: &Targets, row: usize, weight: f64) {
        if let Targets::Numeric(values) = targets {
            self.push(values[row], weight);
        }
    }


    #[inline]
    fn weight(&self) -> f64 {
        self.weight
    }


    #[inline]
    fn impurity(&self) -> f64 {
        self.variance()
    }
}


/// An impurity function over class proportions.
pub trait ClassImpurity: Clone + Default + Send {
    /// Name of the criterion built on this impurity.
    const NAME: &'static str;
    /// Impurity of the distribution `counts / total`.
    fn impurity(counts: &[f64], total: f64) -> f64;
}


/// Shannon entropy (nats).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Entropy;


impl ClassImpurity for Entropy {
    const NAME: &'static str = "information gain";

    fn impurity(counts: &[f64], total: f64) -> f64 {
        counts.iter()
            .map(|&c| {
                let p = c / total;
                if p <= 0.0 { 0.0 } else { -p * p.ln() }
            })
            .sum::<f64>()
    }
}


/// Gini index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gini;


impl ClassImpurity for Gini {
    const NAME: &'static str = "gini impurity";

    fn impurity(counts: &[f64], total: f64) -> f64 {
        let sum_sq = counts.iter()
            .map(|&c| (c / total).powi(2))
            .sum::<f64>();
        (1.0 - sum_sq).max(0.0)
    }
}


/// Weighted class counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassHistogram<I> {
    counts: Vec<f64>,
    total: f64,
    _impurity: PhantomData<I>,
}


impl<I> ClassHistogram<I> {
    /// Weighted counts per class.
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }
}


impl<I: ClassImpurity> SideStatistics for ClassHistogram<I> {
    const NAME: &'static str = I::NAME;

    fn reset(&mut self, targets: &Targets) {
        self.counts.clear();
        self.counts.resize(targets.n_classes(), 0.0);
        self.total = 0.0;
    }


    #[inline]
    fn add(&mut self, targets: &Targets, row: usize, weight: f64) {
        if let Targets::Labels { labels, .. } = targets {
            self.counts[labels[row] as usize] += weight;
            self.total += weight;
        }
    }


    #[inline]
    fn weight(&self) -> f64 {
        self.total
    }


    fn impurity(&self) -> f64 {
        if self.total <= EMPTY_SIDE {
            return 0.0;
        }
        I::impurity(&self.counts, self.total)
    }
}
