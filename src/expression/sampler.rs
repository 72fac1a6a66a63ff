use rand::Rng;
use rand::seq::index;
use serde::{Serialize, Deserialize};

use std::fmt;

use super::Expression;


/// Chooses which candidate conditions a node search may try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CandidateSampler {
    /// Every candidate.
    #[default]
    All,
    /// `k` candidates drawn uniformly without replacement.
    RandomSubset(usize),
    /// `round(sqrt(#candidates))` candidates drawn uniformly.
    SqrtSubset,
}


impl fmt::Display for CandidateSampler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all candidates"),
            Self::RandomSubset(k) => write!(f, "{k} random candidates"),
            Self::SqrtSubset => write!(f, "sqrt(#candidates) random candidates"),
        }
    }
}


impl CandidateSampler {
    /// Number of candidates drawn from a pool of size `n_pool`.
    pub fn sample_size(&self, n_pool: usize) -> usize {
        match self {
            Self::All => n_pool,
            Self::RandomSubset(k) => (*k).min(n_pool),
            Self::SqrtSubset => {
                let k = ((n_pool as f64).sqrt() + 0.5) as usize;
                k.clamp(n_pool.min(1), n_pool)
            },
        }
    }


    /// Draws candidates from `pool`.
    /// The drawn candidates keep their order in `pool`.
    pub fn sample<R: Rng>(&self, pool: &[Expression], rng: &mut R)
        -> Vec<Expression>
    {
        let k = self.sample_size(pool.len());
        if k == pool.len() {
            return pool.to_vec();
        }
        let mut picked = index::sample(rng, pool.len(), k).into_vec();
        picked.sort_unstable();
        picked.into_iter()
            .map(|i| pool[i].clone())
            .collect()
    }
}
