//! Ensembles of decision trees.
mod bagging;
mod simple;

pub use bagging::Bagging;
pub use simple::SimpleEnsemble;

use rand::prelude::*;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::criterion::Vote;
use crate::error::{Error, Result};
use crate::logging::{Logger, Verbosity};
use crate::sample::{IndexSet, Table};
use crate::tree::{DecisionTree, TreeLearnerBuilder, TreeLearnerConfig};


/// A set of trees whose votes are averaged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    trees: Vec<DecisionTree>,
}


impl Ensemble {
    /// Construct an ensemble from its trees.
    pub fn new(trees: Vec<DecisionTree>) -> Self {
        Self { trees }
    }


    /// The trees.
    #[inline]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }


    /// Number of trees.
    #[inline]
    pub fn len(&self) -> usize {
        self.trees.len()
    }


    /// Returns `true` if the ensemble has no tree.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }


    /// The average vote of the trees for `row`:
    /// the mean of the values, or the mean of the class distributions.
    /// An empty ensemble votes `Vote::Value(0.0)`.
    pub fn predict(&self, table: &Table, row: usize) -> Vote {
        let n_trees = self.trees.len() as f64;
        let mut votes = self.trees.iter().map(|tree| tree.predict(table, row));
        let Some(first) = votes.next() else {
            return Vote::Value(0.0);
        };

        let mut sum = first.clone();
        for vote in votes {
            match (&mut sum, vote) {
                (Vote::Value(s), Vote::Value(v)) => *s += v,
                (Vote::Distribution(s), Vote::Distribution(d)) => {
                    s.iter_mut().zip(d).for_each(|(si, di)| *si += di);
                },
                _ => {},
            }
        }
        match &mut sum {
            Vote::Value(s) => *s /= n_trees,
            Vote::Distribution(s) => s.iter_mut().for_each(|si| *si /= n_trees),
        }
        sum
    }


    /// The scalar prediction for `row`:
    /// the mean value, or the code of the most probable class.
    pub fn predict_value(&self, table: &Table, row: usize) -> f64 {
        self.predict(table, row).value()
    }


    /// The most probable class name for `row`.
    pub fn predict_class(&self, table: &Table, row: usize) -> Option<String> {
        let class = self.predict(table, row).class()?;
        self.trees.first()?
            .class_names()?
            .get(class)
            .cloned()
    }


    /// Scalar predictions for every row of `table`.
    pub fn predict_all(&self, table: &Table) -> Vec<f64> {
        (0..table.n_rows()).into_par_iter()
            .map(|row| self.predict_value(table, row))
            .collect()
    }


    /// The importances of each input, averaged over the trees.
    pub fn feature_importances(&self) -> HashMap<String, f64> {
        let n_trees = self.trees.len() as f64;
        let mut importances = HashMap::new();
        for tree in &self.trees {
            for (name, importance) in tree.feature_importances() {
                *importances.entry(name).or_insert(0.0) += importance / n_trees;
            }
        }
        importances
    }


    /// Serializes the ensemble as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }


    /// Reads an ensemble written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}


/// Rows and weights of one tree.
type Resample = (IndexSet, Option<Arc<[f64]>>);


fn check_n_trees(n_trees: usize) -> Result<usize> {
    if n_trees == 0 {
        return Err(Error::invalid("n_trees", "must be positive"));
    }
    Ok(n_trees)
}


/// Grows `n_trees` trees in parallel.
/// Tree `t` is grown with its own seed, drawn from `seed`,
/// on the rows and weights `resample` draws from an RNG seeded likewise.
fn grow_trees<F>(
    table: &Table,
    config: &TreeLearnerConfig,
    n_trees: usize,
    seed: u64,
    source: &'static str,
    resample: F,
) -> Result<Ensemble>
    where F: Fn(&mut StdRng) -> Resample + Sync,
{
    let logger = Logger::new(source, config.verbosity);
    let tree_verbosity = if config.verbosity >= Verbosity::All {
        Verbosity::Detailed
    } else {
        Verbosity::Silent
    };

    // Report configuration errors once, before spawning anything.
    TreeLearnerBuilder::from_config(table, config.clone()).build()?;

    let mut rng = StdRng::seed_from_u64(seed);
    let seeds = (0..n_trees)
        .map(|_| rng.gen::<u64>())
        .collect::<Vec<_>>();

    let now = Instant::now();
    let trees = seeds.into_par_iter()
        .enumerate()
        .map(|(t, tree_seed)| {
            let mut rng = StdRng::seed_from_u64(tree_seed);
            let (indices, weights) = resample(&mut rng);
            let mut learner = TreeLearnerBuilder::from_config(table, config.clone())
                .seed(tree_seed)
                .verbosity(tree_verbosity)
                .build()?;
            let tree = learner.learn_on(&indices, weights);
            logger.detail(format!(
                "tree {:>4}: {} rows, {} leaves",
                t + 1, indices.len(), tree.n_leaves()
            ));
            Ok::<_, Error>(tree)
        })
        .collect::<Result<Vec<_>>>()?;

    logger.finish(
        format!("{n_trees} trees on {} rows", table.n_rows()),
        now.elapsed().as_millis(),
    );
    Ok(Ensemble::new(trees))
}
