use serde::{Serialize, Deserialize};
use statrs::distribution::{ContinuousCDF, FisherSnedecor};

use std::fmt;

use crate::constants::*;
use crate::error::{Error, Result};
use super::ebst::Ebst;
use super::statistics::RegressionStatistics;


/// `sqrt(range² · log2(1/delta) / (2n))`, the half width of the interval
/// that holds the mean of `n` observations in a range of width `range`
/// with probability `1 - delta`.
/// By convention it is `1` when `n == 0` or `delta == 0`.
pub fn hoeffding_bound(range: f64, n: f64, delta: f64) -> f64 {
    if n == 0.0 || delta == 0.0 {
        return 1.0;
    }
    (range * range * (1.0 / delta).log2() / (2.0 * n)).sqrt()
}


/// The split quality measure of an incremental learner.
/// Qualities are relative to the parent, so they lie in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IncrementalSplittingCriterion {
    /// Reduction of the standard deviation of the target.
    #[default]
    StdDevReduction,
    /// Reduction of the residual standard deviation
    /// of a linear fit of the target on the split input.
    Mauve,
    /// Never splits.
    Null,
}


impl fmt::Display for IncrementalSplittingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StdDevReduction => "Std. dev. reduction",
            Self::Mauve => "Mauve",
            Self::Null => "Null",
        };
        write!(f, "{name}")
    }
}


impl IncrementalSplittingCriterion {
    fn spread(&self, stats: &RegressionStatistics) -> f64 {
        match self {
            Self::StdDevReduction => stats.std_dev_y(),
            Self::Mauve => stats.residual_std_dev(),
            Self::Null => 0.0,
        }
    }


    /// Quality of splitting `total` into `left` and `right`.
    pub fn quality(
        &self,
        total: &RegressionStatistics,
        left: &RegressionStatistics,
        right: &RegressionStatistics,
    ) -> f64
    {
        let parent = self.spread(total);
        let (n_left, n_right) = (left.count(), right.count());
        if parent <= 0.0 || n_left <= 0.0 || n_right <= 0.0 {
            return 0.0;
        }
        let children = (n_left * self.spread(left) + n_right * self.spread(right))
            / (n_left + n_right);
        ((parent - children) / parent).max(0.0)
    }


    /// The best split `x <= value` of one input, as `(value, quality)`.
    /// Ties keep the smallest value.
    pub fn best_split(&self, ebst: &Ebst) -> Option<(f64, f64)> {
        let total = *ebst.total();
        let mut best: Option<(f64, f64)> = None;
        ebst.for_each_split(|key, left, right| {
            let quality = self.quality(&total, left, right);
            if best.map_or(true, |(_, q)| quality > q) {
                best = Some((key, quality));
            }
        });
        best
    }
}


/// A committed split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitDecision {
    /// Input index.
    pub attribute: usize,
    /// Rows with `x <= value` go left.
    pub value: f64,
    /// Quality of the split.
    pub quality: f64,
    /// Quality of the best split of any other input.
    /// Always `0` under [`QuandtAndrewsCriterion`].
    pub second_quality: f64,
    /// The Hoeffding bound when the split was decided,
    /// or the drop of the residual variance under [`QuandtAndrewsCriterion`].
    pub bound: f64,
}


/// Decides splits with the Hoeffding bound.
/// A leaf splits on its best input when the best quality is positive
/// and either it beats the best quality of every other input by more
/// than the bound, or the bound is below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoeffdingBoundCriterion {
    delta: f64,
    threshold: f64,
    quality: IncrementalSplittingCriterion,
}


impl Default for HoeffdingBoundCriterion {
    fn default() -> Self {
        Self {
            delta: DEFAULT_HOEFFDING_DELTA,
            threshold: DEFAULT_HOEFFDING_THRESHOLD,
            quality: IncrementalSplittingCriterion::default(),
        }
    }
}


impl HoeffdingBoundCriterion {
    /// Construct a new instance of `HoeffdingBoundCriterion`.
    pub fn new(
        delta: f64,
        threshold: f64,
        quality: IncrementalSplittingCriterion,
    ) -> Result<Self>
    {
        if !(0.0..1.0).contains(&delta) {
            let reason = format!("delta must be in [0, 1). got {delta}.");
            return Err(Error::invalid("delta", reason));
        }
        if !threshold.is_finite() {
            let reason = format!("the threshold must be finite. got {threshold}.");
            return Err(Error::invalid("threshold", reason));
        }
        Ok(Self { delta, threshold, quality })
    }


    /// Confidence parameter.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }


    /// Tie-breaking threshold on the bound.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }


    /// Quality measure.
    #[inline]
    pub fn quality(&self) -> IncrementalSplittingCriterion {
        self.quality
    }


    /// Returns the split to commit, if any,
    /// given one E-BST per input and `n` observations.
    pub fn find_best_split(&self, inputs: &[Ebst], n: f64)
        -> Option<SplitDecision>
    {
        let mut best: Option<(usize, f64, f64)> = None;
        let mut second_quality = 0.0_f64;
        for (attribute, ebst) in inputs.iter().enumerate() {
            let Some((value, quality)) = self.quality.best_split(ebst) else {
                continue;
            };
            match best {
                Some((_, _, q)) if quality <= q => {
                    second_quality = second_quality.max(quality);
                },
                _ => {
                    if let Some((_, _, q)) = best {
                        second_quality = second_quality.max(q);
                    }
                    best = Some((attribute, value, quality));
                },
            }
        }

        let (attribute, value, quality) = best?;
        let bound = hoeffding_bound(1.0, n, self.delta);
        let confident = quality - second_quality > bound
            || bound < self.threshold;
        (quality > 0.0 && confident).then_some(SplitDecision {
            attribute, value, quality, second_quality, bound,
        })
    }
}


/// Decides splits with a Chow test for a break in the
/// least squares line of the target on one input.
///
/// Every split point of every input gets the statistic
/// `F = ((RSS - RSS_l - RSS_r) / d) / ((RSS_l + RSS_r) / (n - 2d))`,
/// where `d` is the number of parameters of the line.
/// Points whose `F` exceeds the critical value of the
/// Fisher-Snedecor distribution `F(d, n - 2d)` at `significance`
/// are candidates, and the one with the largest `F` wins.
/// It is committed when the residual variance drops by more than
/// `threshold`: `RSS / (n - d) - (RSS_l + RSS_r) / (n - 2d) > threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuandtAndrewsCriterion {
    n_parameters: usize,
    threshold: f64,
    significance: f64,
}


impl Default for QuandtAndrewsCriterion {
    fn default() -> Self {
        Self {
            n_parameters: DEFAULT_CHOW_PARAMETERS,
            threshold: DEFAULT_CHOW_THRESHOLD,
            significance: DEFAULT_CHOW_SIGNIFICANCE,
        }
    }
}


/// The best significant split point seen so far.
#[derive(Clone, Copy)]
struct ChowCandidate {
    attribute: usize,
    value: f64,
    statistic: f64,
    rss_total: f64,
    rss_sides: f64,
    n: f64,
}


impl QuandtAndrewsCriterion {
    /// Construct a new instance of `QuandtAndrewsCriterion`
    /// with the `0.01` significance level.
    pub fn new(n_parameters: usize, threshold: f64) -> Result<Self> {
        if n_parameters == 0 {
            return Err(Error::invalid("n_parameters", "must be positive"));
        }
        if !threshold.is_finite() {
            let reason = format!("the threshold must be finite. got {threshold}.");
            return Err(Error::invalid("threshold", reason));
        }
        Ok(Self { n_parameters, threshold, ..Self::default() })
    }


    /// Set the significance level of the test.
    pub fn significance(mut self, significance: f64) -> Result<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            let reason = format!(
                "the significance must be in (0, 1). got {significance}."
            );
            return Err(Error::invalid("significance", reason));
        }
        self.significance = significance;
        Ok(self)
    }


    /// Number of parameters of the fitted line.
    #[inline]
    pub fn n_parameters(&self) -> usize {
        self.n_parameters
    }


    /// Minimal drop of the residual variance.
    #[inline]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }


    /// The `F` value a split of `n` observations must exceed.
    /// Infinite when `n <= 2d`.
    pub fn critical_value(&self, n: f64) -> f64 {
        let d = self.n_parameters as f64;
        let freedom = n - 2.0 * d;
        if freedom < 1.0 {
            return f64::INFINITY;
        }
        FisherSnedecor::new(d, freedom)
            .map_or(f64::INFINITY, |f| f.inverse_cdf(1.0 - self.significance))
    }


    /// Returns the split to commit, if any, given one E-BST per input.
    pub fn find_best_split(&self, inputs: &[Ebst]) -> Option<SplitDecision> {
        let d = self.n_parameters as f64;
        let mut best: Option<ChowCandidate> = None;
        for (attribute, ebst) in inputs.iter().enumerate() {
            let total = ebst.total();
            let n = total.count();
            let critical = self.critical_value(n);
            if critical.is_infinite() {
                continue;
            }
            let rss_total = total.residual_sum_of_squares();
            ebst.for_each_split(|value, left, right| {
                let rss_sides = left.residual_sum_of_squares()
                    + right.residual_sum_of_squares();
                let statistic = chow_statistic(rss_total, rss_sides, n, d);
                if statistic > critical
                    && best.map_or(true, |b| statistic > b.statistic)
                {
                    best = Some(ChowCandidate {
                        attribute, value, statistic, rss_total, rss_sides, n,
                    });
                }
            });
        }

        let best = best?;
        let drop = best.rss_total / (best.n - d)
            - best.rss_sides / (best.n - 2.0 * d);
        (drop > self.threshold).then_some(SplitDecision {
            attribute: best.attribute,
            value: best.value,
            quality: best.statistic,
            second_quality: 0.0,
            bound: drop,
        })
    }
}


/// The Chow `F` statistic, `0` when the two sides fit perfectly.
fn chow_statistic(rss_total: f64, rss_sides: f64, n: f64, d: f64) -> f64 {
    let denominator = rss_sides * d;
    if denominator <= 0.0 {
        return 0.0;
    }
    (rss_total - rss_sides) * (n - 2.0 * d) / denominator
}


/// The rule a [`HoeffdingTreeLearner`](super::HoeffdingTreeLearner)
/// uses to decide when and where a leaf splits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SplitRule {
    /// Compare the two best inputs with the Hoeffding bound.
    HoeffdingBound(HoeffdingBoundCriterion),
    /// Test for a break in a linear fit.
    QuandtAndrews(QuandtAndrewsCriterion),
}


impl Default for SplitRule {
    fn default() -> Self {
        Self::HoeffdingBound(HoeffdingBoundCriterion::default())
    }
}


impl fmt::Display for SplitRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HoeffdingBound(c) => {
                write!(f, "Hoeffding bound ({}, delta = {})", c.quality, c.delta)
            },
            Self::QuandtAndrews(c) => {
                write!(f, "Quandt-Andrews (d = {})", c.n_parameters)
            },
        }
    }
}


impl SplitRule {
    /// Returns the split to commit, if any,
    /// given one E-BST per input and `n` observations.
    pub fn find_best_split(&self, inputs: &[Ebst], n: f64)
        -> Option<SplitDecision>
    {
        match self {
            Self::HoeffdingBound(c) => c.find_best_split(inputs, n),
            Self::QuandtAndrews(c) => c.find_best_split(inputs),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bound_conventions() {
        assert_eq!(hoeffding_bound(1.0, 0.0, 0.1), 1.0);
        assert_eq!(hoeffding_bound(1.0, 10.0, 0.0), 1.0);
        assert_abs_diff_eq!(
            hoeffding_bound(1.0, 50.0, 0.25),
            (2.0_f64 / 100.0).sqrt()
        );
        assert!(hoeffding_bound(1.0, 1000.0, 0.01) < hoeffding_bound(1.0, 100.0, 0.01));
    }


    #[test]
    fn perfect_split_has_full_quality() {
        let mut ebst = Ebst::new();
        for i in 0..10 {
            let x = i as f64;
            ebst.add(x, if x < 5.0 { 0.0 } else { 1.0 });
        }
        let sdr = IncrementalSplittingCriterion::StdDevReduction;
        let (value, quality) = sdr.best_split(&ebst).unwrap();
        assert_eq!(value, 4.0);
        assert_abs_diff_eq!(quality, 1.0, epsilon = 1e-9);

        let null = IncrementalSplittingCriterion::Null;
        assert_eq!(null.best_split(&ebst).unwrap().1, 0.0);
    }


    #[test]
    fn mauve_ignores_linear_trends() {
        let mut ebst = Ebst::new();
        (0..20).map(|i| i as f64)
            .for_each(|x| ebst.add(x, 2.0 * x));
        let (_, quality) = IncrementalSplittingCriterion::Mauve
            .best_split(&ebst)
            .unwrap();
        assert_eq!(quality, 0.0);
    }


    #[test]
    fn close_contenders_wait_for_more_data() {
        let mut a = Ebst::new();
        let mut b = Ebst::new();
        for i in 0..10 {
            let x = i as f64;
            let y = if x < 5.0 { 0.0 } else { 1.0 };
            a.add(x, y);
            b.add(x, y);
        }
        let criterion = HoeffdingBoundCriterion::new(
            0.01, 0.0, IncrementalSplittingCriterion::StdDevReduction
        ).unwrap();
        assert_eq!(criterion.find_best_split(&[a.clone(), b.clone()], 10.0), None);

        let decision = criterion.find_best_split(&[a], 10.0).unwrap();
        assert_eq!(decision.attribute, 0);
        assert_eq!(decision.second_quality, 0.0);
    }


    fn noisy_step(n: usize, seed: u64) -> Ebst {
        use rand::prelude::*;
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ebst = Ebst::new();
        for _ in 0..n {
            let x = rng.gen::<f64>();
            let noise = rng.gen::<f64>() - 0.5;
            ebst.add(x, if x <= 0.5 { noise } else { 5.0 + noise });
        }
        ebst
    }


    #[test]
    fn chow_critical_values_follow_the_f_distribution() {
        let one = QuandtAndrewsCriterion::new(1, 0.0).unwrap();
        // F(1, 10) and F(2, 5) at the 0.01 level.
        assert_abs_diff_eq!(one.critical_value(12.0), 10.044, epsilon = 1e-2);
        let two = QuandtAndrewsCriterion::new(2, 0.0).unwrap();
        assert_abs_diff_eq!(two.critical_value(9.0), 13.274, epsilon = 1e-2);
        assert!(two.critical_value(4.0).is_infinite());
        assert!(two.critical_value(1000.0) < two.critical_value(50.0));
    }


    #[test]
    fn a_break_in_the_line_is_found() {
        let criterion = QuandtAndrewsCriterion::default();
        let flat = Ebst::new();
        let decision = criterion
            .find_best_split(&[flat, noisy_step(200, 3)])
            .unwrap();
        assert_eq!(decision.attribute, 1);
        assert!((0.4..0.6).contains(&decision.value));
        assert!(decision.quality > criterion.critical_value(200.0));
        assert!(decision.bound > 0.0);

        let strict = QuandtAndrewsCriterion::new(2, 100.0).unwrap();
        assert_eq!(strict.find_best_split(&[noisy_step(200, 3)]), None);
        assert!(QuandtAndrewsCriterion::new(0, 0.0).is_err());
    }
}
