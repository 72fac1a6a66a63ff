//! Decision trees grown by recursive partitioning.
mod node;
mod config;
mod builder;
mod tree_learner;
mod decision_tree;

pub use node::{Node, TestNode, LeafNode};
pub use config::{ConditionLearnerKind, TreeLearnerConfig};
pub use builder::TreeLearnerBuilder;
pub use tree_learner::{TreeLearner, dispatch};
pub use decision_tree::DecisionTree;
