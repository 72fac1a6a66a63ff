use crate::constants::DEFAULT_N_TREES;
use crate::error::Result;
use crate::sample::{IndexSet, Table};
use crate::tree::TreeLearnerConfig;
use super::{check_n_trees, grow_trees, Ensemble};


/// Trees grown on every row, each with its own seed.
/// The trees differ only through the randomness of the learner,
/// e.g., the random split learner or candidate subsampling.
#[derive(Debug, Clone)]
pub struct SimpleEnsemble {
    config: TreeLearnerConfig,
    n_trees: usize,
    seed: u64,
}


impl SimpleEnsemble {
    /// An ensemble of trees grown with `config`.
    pub fn new(config: TreeLearnerConfig) -> Self {
        let seed = config.seed;
        Self { config, n_trees: DEFAULT_N_TREES, seed }
    }


    /// Set the number of trees.
    pub fn n_trees(mut self, n_trees: usize) -> Result<Self> {
        self.n_trees = check_n_trees(n_trees)?;
        Ok(self)
    }


    /// Set the seed the per-tree seeds are drawn from.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Grows the trees on `table`.
    pub fn learn(&self, table: &Table) -> Result<Ensemble> {
        let indices = IndexSet::full(table.n_rows());
        grow_trees(
            table, &self.config, self.n_trees, self.seed, "ensemble",
            |_| (indices.clone(), None),
        )
    }
}
