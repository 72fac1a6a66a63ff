//! Numeric tolerances and default parameters shared across learners.

/// A split must beat the criterion's worst score by more than this.
pub const SPLIT_TOLERANCE: f64 = 1e-9;

/// Hard bound on the recursion depth of `TreeLearner`.
pub const MAX_RECURSION_DEPTH: usize = 1_024;


// Tree learner ------------------------------------------------
pub const DEFAULT_MIN_EXAMPLES_TO_SPLIT: usize = 2;
pub const DEFAULT_MAX_DEPTH:             usize = 0;
pub const DEFAULT_SEED:                  u64   = 1_234;


// Budgeted weak learners --------------------------------------
pub const DEFAULT_RELATIVE_BUDGET:             f64   = 10.0;
pub const DEFAULT_MIN_EXAMPLES_FOR_LAMINATING: usize = 10;
pub const DEFAULT_MINI_BATCH_RELATIVE_SIZE:    f64   = 0.1;
pub const DEFAULT_EXPLORATION_COEFFICIENT:     f64   = 1.0;


// Hoeffding trees ---------------------------------------------
pub const DEFAULT_CHUNK_SIZE:          usize = 50;
pub const DEFAULT_HOEFFDING_DELTA:     f64   = 0.01;
pub const DEFAULT_HOEFFDING_THRESHOLD: f64   = 0.05;
pub const DEFAULT_CHOW_PARAMETERS:     usize = 2;
pub const DEFAULT_CHOW_THRESHOLD:      f64   = 0.0;
pub const DEFAULT_CHOW_SIGNIFICANCE:   f64   = 0.01;
pub const DEFAULT_LEARNING_RATE:       f64   = 0.5;
pub const DEFAULT_LEARNING_RATE_DECAY: f64   = 0.05;


// Ensembles ---------------------------------------------------
pub const DEFAULT_N_TREES: usize = 10;
