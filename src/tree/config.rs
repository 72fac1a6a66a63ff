//! Serializable learner configuration.
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::condition_learner::{
    ConditionLearner,
    ExhaustiveConditionLearner,
    RandomSplitConditionLearner,
};
use crate::constants::*;
use crate::criterion::Criterion;
use crate::error::{Error, Result};
use crate::expression::CandidateSampler;
use crate::logging::Verbosity;
use crate::weak_learner::{BanditBasedWeakLearner, LaminatingWeakLearner};


/// Which search finds the condition of each node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ConditionLearnerKind {
    /// Every candidate at its best threshold.
    #[default]
    Exhaustive,
    /// Every candidate at one random threshold.
    RandomSplit,
    /// Successive halving under a budget.
    Laminating {
        /// Budget as a multiple of the node's rows.
        relative_budget: f64,
        /// Rows in the first round, at least.
        min_examples_for_laminating: usize,
    },
    /// Upper-confidence bandit under a budget.
    Bandit {
        /// Budget as a multiple of the node's rows.
        relative_budget: f64,
        /// Mini-batch size as a fraction of the node's rows.
        mini_batch_relative_size: f64,
        /// Exploration coefficient.
        exploration: f64,
    },
}


impl fmt::Display for ConditionLearnerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhaustive => write!(f, "Exhaustive"),
            Self::RandomSplit => write!(f, "Random split"),
            Self::Laminating { relative_budget, .. } => {
                write!(f, "Laminating (budget {relative_budget} x N)")
            },
            Self::Bandit { relative_budget, .. } => {
                write!(f, "Bandit (budget {relative_budget} x N)")
            },
        }
    }
}


impl ConditionLearnerKind {
    /// A laminating search with default parameters.
    pub fn laminating() -> Self {
        Self::Laminating {
            relative_budget: DEFAULT_RELATIVE_BUDGET,
            min_examples_for_laminating: DEFAULT_MIN_EXAMPLES_FOR_LAMINATING,
        }
    }


    /// A bandit search with default parameters.
    pub fn bandit() -> Self {
        Self::Bandit {
            relative_budget: DEFAULT_RELATIVE_BUDGET,
            mini_batch_relative_size: DEFAULT_MINI_BATCH_RELATIVE_SIZE,
            exploration: DEFAULT_EXPLORATION_COEFFICIENT,
        }
    }


    /// Builds the learner, checking its parameters.
    pub fn build(&self, seed: u64, verbosity: Verbosity)
        -> Result<Box<dyn ConditionLearner>>
    {
        let learner: Box<dyn ConditionLearner> = match *self {
            Self::Exhaustive => {
                Box::new(ExhaustiveConditionLearner::with_verbosity(verbosity))
            },
            Self::RandomSplit => {
                Box::new(RandomSplitConditionLearner::with_verbosity(seed, verbosity))
            },
            Self::Laminating { relative_budget, min_examples_for_laminating } => {
                let learner = LaminatingWeakLearner::new(
                    relative_budget, min_examples_for_laminating, seed
                )?;
                Box::new(learner.verbosity(verbosity))
            },
            Self::Bandit {
                relative_budget, mini_batch_relative_size, exploration
            } => {
                let learner = BanditBasedWeakLearner::new(
                    relative_budget, mini_batch_relative_size, seed
                )?;
                Box::new(learner.exploration(exploration)?.verbosity(verbosity))
            },
        };
        Ok(learner)
    }
}


/// Every parameter of a [`TreeLearner`](crate::TreeLearner).
///
/// Missing fields take their default values when read from JSON:
/// ```text
/// target: none (required),
/// inputs: every splittable column but the target,
/// min_examples_to_split: DEFAULT_MIN_EXAMPLES_TO_SPLIT == 2,
/// max_depth: DEFAULT_MAX_DEPTH == 0 (unlimited),
/// criterion: Criterion::VarianceReduction,
/// condition_learner: ConditionLearnerKind::Exhaustive,
/// candidates: CandidateSampler::All,
/// seed: DEFAULT_SEED,
/// verbosity: Verbosity::Progress,
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeLearnerConfig {
    /// Name of the supervision column.
    pub target: Option<String>,
    /// Names of the input columns.
    pub inputs: Option<Vec<String>>,
    /// Nodes with fewer rows become leaves.
    pub min_examples_to_split: usize,
    /// Maximal depth; `0` means unlimited. The root has depth `0`.
    pub max_depth: usize,
    /// Splitting criterion.
    pub criterion: Criterion,
    /// Condition search.
    pub condition_learner: ConditionLearnerKind,
    /// Candidates tried at each node.
    pub candidates: CandidateSampler,
    /// Seed of every random draw.
    pub seed: u64,
    /// Logging level.
    pub verbosity: Verbosity,
}


impl Default for TreeLearnerConfig {
    fn default() -> Self {
        Self {
            target: None,
            inputs: None,
            min_examples_to_split: DEFAULT_MIN_EXAMPLES_TO_SPLIT,
            max_depth: DEFAULT_MAX_DEPTH,
            criterion: Criterion::default(),
            condition_learner: ConditionLearnerKind::default(),
            candidates: CandidateSampler::default(),
            seed: DEFAULT_SEED,
            verbosity: Verbosity::default(),
        }
    }
}


impl TreeLearnerConfig {
    /// Reads a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Serialization(e.to_string()))
    }


    /// Writes this configuration as a JSON string.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }
}
