use rand::prelude::*;

use std::sync::Arc;

use crate::constants::DEFAULT_N_TREES;
use crate::error::Result;
use crate::sample::{IndexSet, Table};
use crate::tree::TreeLearnerConfig;
use super::{check_n_trees, grow_trees, Ensemble};


/// Bootstrap aggregation.
/// Each tree is grown on `N` rows drawn with replacement,
/// where a row drawn `k` times carries the weight `k`.
/// Trees are grown in parallel.
///
/// ```no_run
/// use minitrees::prelude::*;
///
/// let table = Table::from_csv("iris.csv", true).unwrap();
/// let mut config = TreeLearnerConfig::default();
/// config.target = Some("class".to_string());
/// config.criterion = Criterion::InformationGain;
///
/// let forest = Bagging::new(config)
///     .n_trees(50)
///     .unwrap()
///     .learn(&table)
///     .unwrap();
/// let class = forest.predict_class(&table, 0);
/// ```
#[derive(Debug, Clone)]
pub struct Bagging {
    config: TreeLearnerConfig,
    n_trees: usize,
    seed: u64,
}


impl Bagging {
    /// Bagging of trees grown with `config`.
    /// The bootstrap seed defaults to `config.seed`.
    pub fn new(config: TreeLearnerConfig) -> Self {
        let seed = config.seed;
        Self { config, n_trees: DEFAULT_N_TREES, seed }
    }


    /// Set the number of trees.
    pub fn n_trees(mut self, n_trees: usize) -> Result<Self> {
        self.n_trees = check_n_trees(n_trees)?;
        Ok(self)
    }


    /// Set the seed of the bootstrap draws.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Grows the trees on `table`.
    pub fn learn(&self, table: &Table) -> Result<Ensemble> {
        let n_rows = table.n_rows();
        grow_trees(
            table, &self.config, self.n_trees, self.seed, "bagging",
            |rng| {
                let counts = bootstrap_counts(n_rows, rng);
                let indices = counts.iter()
                    .enumerate()
                    .filter_map(|(row, &count)| (count > 0.0).then_some(row))
                    .collect::<IndexSet>();
                (indices, Some(Arc::from(counts)))
            },
        )
    }
}


/// How many times each of `n_rows` rows is drawn in `n_rows` draws.
fn bootstrap_counts<R: Rng>(n_rows: usize, rng: &mut R) -> Vec<f64> {
    let mut counts = vec![0.0; n_rows];
    if n_rows == 0 {
        return counts;
    }
    for _ in 0..n_rows {
        counts[rng.gen_range(0..n_rows)] += 1.0;
    }
    counts
}
