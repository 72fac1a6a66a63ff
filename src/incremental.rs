//! Streaming regression trees in the Hoeffding tree family.
//! Examples are absorbed into per-leaf statistics and never stored.
mod statistics;
mod ebst;
mod criterion;
mod leaf_model;
mod hoeffding_tree;

pub use statistics::RegressionStatistics;
pub use ebst::Ebst;
pub use criterion::{
    hoeffding_bound,
    IncrementalSplittingCriterion,
    HoeffdingBoundCriterion,
    QuandtAndrewsCriterion,
    SplitRule,
    SplitDecision,
};
pub use leaf_model::{LeafModel, Perceptron};
pub use hoeffding_tree::{IncrementalTree, HoeffdingTreeLearner};
