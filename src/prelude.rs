//! Exports the learners, the data types and the traits.
//!
pub use crate::error::{Error, Result};
pub use crate::logging::Verbosity;


// Data ---------------------------------------
pub use crate::sample::{
    Column,
    ColumnKind,
    IndexSet,
    Table,
};


pub use crate::expression::{
    CandidateSampler,
    Expression,
};


// Criteria -----------------------------------
pub use crate::criterion::{
    // Criterion trait
    SplittingCriterion,

    Criterion,
    Vote,
};


// Condition search ---------------------------
pub use crate::condition_learner::{
    // Condition learner trait
    ConditionLearner,

    ExhaustiveConditionLearner,
    RandomSplitConditionLearner,
};


pub use crate::weak_learner::{
    LaminatingWeakLearner,
    BanditBasedWeakLearner,
};


// Batch trees --------------------------------
pub use crate::tree::{
    ConditionLearnerKind,
    DecisionTree,
    TreeLearner,
    TreeLearnerBuilder,
    TreeLearnerConfig,
};


// Streaming trees ----------------------------
pub use crate::incremental::{
    HoeffdingTreeLearner,
    IncrementalSplittingCriterion,
    IncrementalTree,
    LeafModel,
    SplitRule,
};


// Ensembles ----------------------------------
pub use crate::ensemble::{
    Bagging,
    Ensemble,
    SimpleEnsemble,
};
