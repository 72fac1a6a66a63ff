//! What a leaf of an incremental tree predicts.
use rand::prelude::*;
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::constants::*;
use crate::criterion::WeightedMoments;
use crate::error::{Error, Result};


/// The model kept by every leaf of an
/// [`IncrementalTree`](super::IncrementalTree).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum LeafModel {
    /// The mean of the outputs the leaf has seen.
    #[default]
    Mean,
    /// A linear model of the scaled inputs, updated by one gradient step
    /// per example with rate `learning_rate / (1 + k · decay)`
    /// at the `k`-th update.
    Perceptron {
        /// Rate of the first update.
        learning_rate: f64,
        /// Decay of the rate.
        decay: f64,
    },
}


impl fmt::Display for LeafModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mean => write!(f, "Mean"),
            Self::Perceptron { learning_rate, decay } => write!(
                f, "Perceptron (rate {learning_rate}, decay {decay})"
            ),
        }
    }
}


impl LeafModel {
    /// A perceptron with the default rate `0.5` and decay `0.05`.
    pub fn perceptron() -> Self {
        Self::Perceptron {
            learning_rate: DEFAULT_LEARNING_RATE,
            decay: DEFAULT_LEARNING_RATE_DECAY,
        }
    }


    pub(crate) fn validate(&self) -> Result<()> {
        let Self::Perceptron { learning_rate, decay } = *self else {
            return Ok(());
        };
        if !(learning_rate.is_finite() && learning_rate > 0.0) {
            let reason = format!(
                "the learning rate must be a positive number. got {learning_rate}."
            );
            return Err(Error::invalid("learning_rate", reason));
        }
        if !(decay.is_finite() && decay >= 0.0) {
            let reason = format!(
                "the decay must be a non-negative number. got {decay}."
            );
            return Err(Error::invalid("decay", reason));
        }
        Ok(())
    }
}


/// Running mean and standard deviation of every input,
/// over all the examples of a tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct InputScaler {
    moments: Vec<WeightedMoments>,
}


impl InputScaler {
    pub(crate) fn new(n_inputs: usize) -> Self {
        Self { moments: vec![WeightedMoments::default(); n_inputs] }
    }


    pub(crate) fn add(&mut self, input: &[f64]) {
        self.moments.iter_mut()
            .zip(input)
            .filter(|(_, x)| !x.is_nan())
            .for_each(|(m, &x)| m.push(x, 1.0));
    }


    /// `(x - mean) / (3 sd)`, or `x - mean` for a constant input.
    /// Missing values scale to `0`.
    pub(crate) fn scale(&self, input: &[f64]) -> Vec<f64> {
        self.moments.iter()
            .zip(input)
            .map(|(m, &x)| {
                if x.is_nan() {
                    return 0.0;
                }
                let sd = m.variance().sqrt();
                if sd > 0.0 {
                    (x - m.mean()) / (3.0 * sd)
                } else {
                    x - m.mean()
                }
            })
            .collect()
    }
}


/// A linear model trained one example at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct Perceptron {
    weights: Vec<f64>,
    bias: f64,
    learning_rate: f64,
    decay: f64,
    n_updates: usize,
}


impl Perceptron {
    /// A perceptron over `n_inputs` inputs
    /// with weights and bias drawn uniformly in `[-1, 1)`.
    pub fn new<R: Rng>(
        n_inputs: usize,
        learning_rate: f64,
        decay: f64,
        rng: &mut R,
    ) -> Self
    {
        let weights = (0..n_inputs)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();
        let bias = rng.gen_range(-1.0..1.0);
        Self { weights, bias, learning_rate, decay, n_updates: 0 }
    }


    /// The weights of the inputs.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }


    /// The constant term.
    pub fn bias(&self) -> f64 {
        self.bias
    }


    /// `bias + Σ w_i x_i`.
    pub fn predict(&self, input: &[f64]) -> f64 {
        self.weights.iter()
            .zip(input)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.bias
    }


    /// One gradient step of the squared error towards `output`.
    pub fn train(&mut self, input: &[f64], output: f64) {
        let rate = self.learning_rate
            / (1.0 + self.n_updates as f64 * self.decay);
        let step = rate * (output - self.predict(input));
        self.weights.iter_mut()
            .zip(input)
            .for_each(|(w, x)| *w += step * x);
        self.bias += step;
        self.n_updates += 1;
    }


    /// The same model with its learning rate back at the start.
    pub(crate) fn restarted(&self) -> Self {
        Self { n_updates: 0, ..self.clone() }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_centers_and_shrinks() {
        let mut scaler = InputScaler::new(2);
        for x in [1.0, 2.0, 3.0] {
            scaler.add(&[x, 7.0]);
        }
        let scaled = scaler.scale(&[2.0, 9.0]);
        assert_eq!(scaled, vec![0.0, 2.0]);
        assert_eq!(scaler.scale(&[f64::NAN, 7.0]), vec![0.0, 0.0]);
    }


    #[test]
    fn training_moves_towards_the_output() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut model = Perceptron::new(1, 0.5, 0.0, &mut rng);
        let before = (model.predict(&[0.5]) - 4.0).abs();
        model.train(&[0.5], 4.0);
        let after = (model.predict(&[0.5]) - 4.0).abs();
        assert!(after < before);

        let restarted = model.restarted();
        assert_eq!(restarted.weights(), model.weights());
        assert_eq!(restarted.n_updates, 0);
    }


    #[test]
    fn invalid_rates_are_rejected() {
        assert!(LeafModel::perceptron().validate().is_ok());
        let negative = LeafModel::Perceptron { learning_rate: -1.0, decay: 0.0 };
        assert!(negative.validate().is_err());
        let nan = LeafModel::Perceptron { learning_rate: 0.5, decay: f64::NAN };
        assert!(nan.validate().is_err());
    }
}
