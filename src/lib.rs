#![warn(missing_docs)]

//!
//! A crate that provides decision tree learners.
//!
//! Trees are grown by recursive partitioning over a [`Table`].
//! At each node, a condition learner searches the candidate conditions
//! for the one that maximizes a splitting criterion
//! (variance reduction, information gain or Gini impurity).
//! This crate includes four condition learners.
//!
//! - Exhaustive search
//!     Every candidate is scored at its best threshold.
//!     Sorted column values are cached, so a threshold scan is linear
//!     after sorting; small nodes sort their own rows.
//!
//! - Random split
//!     Every candidate is scored at one uniformly random threshold.
//!
//! - Laminating
//!     Successive halving of the candidates on growing row subsets,
//!     within a budget of `candidate × row` evaluations.
//!
//! - Bandit
//!     An upper-confidence bandit over the candidates,
//!     played with growing mini-batches within the same kind of budget.
//!
//! Trees can be combined with [`Bagging`] or [`SimpleEnsemble`],
//! and [`HoeffdingTreeLearner`] grows regression trees from a stream,
//! with mean or perceptron leaves.
//!
//! ```no_run
//! use minitrees::prelude::*;
//!
//! let table = Table::from_csv("boston.csv", true).unwrap();
//! let mut learner = TreeLearnerBuilder::new(&table)
//!     .target("medv")
//!     .max_depth(4)
//!     .condition_learner(ConditionLearnerKind::laminating())
//!     .build()
//!     .unwrap();
//! let tree = learner.learn();
//! let prediction = tree.predict_value(&table, 0);
//! ```

pub mod constants;
pub mod error;
pub mod logging;
pub mod sample;
pub mod expression;
pub mod criterion;
pub mod condition_learner;
pub mod weak_learner;
pub mod tree;
pub mod incremental;
pub mod ensemble;

pub mod prelude;


pub use error::{Error, Result};
pub use logging::Verbosity;

pub use sample::{Column, ColumnKind, IndexSet, Table};
pub use expression::{CandidateSampler, Expression};

pub use criterion::{Criterion, SplittingCriterion, Vote};
pub use condition_learner::{
    ConditionLearner,
    ExhaustiveConditionLearner,
    RandomSplitConditionLearner,
};
pub use weak_learner::{BanditBasedWeakLearner, LaminatingWeakLearner};

pub use tree::{
    ConditionLearnerKind,
    DecisionTree,
    TreeLearner,
    TreeLearnerBuilder,
    TreeLearnerConfig,
};

pub use incremental::{HoeffdingTreeLearner, IncrementalTree, LeafModel};
pub use ensemble::{Bagging, Ensemble, SimpleEnsemble};
