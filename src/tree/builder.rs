use std::sync::Arc;

use crate::criterion::{Criterion, Targets};
use crate::error::{Error, Result};
use crate::expression::{CandidateSampler, Expression};
use crate::logging::Verbosity;
use crate::sample::Table;
use super::config::{ConditionLearnerKind, TreeLearnerConfig};
use super::tree_learner::TreeLearner;


/// A struct that builds [`TreeLearner`].
/// `TreeLearnerBuilder` keeps the parameters of a [`TreeLearnerConfig`]
/// and checks them against the table in [`build`](Self::build).
///
/// # Example
///
/// ```no_run
/// use minitrees::prelude::*;
///
/// let table = Table::from_csv("path/to/file.csv", true).unwrap();
/// let mut learner = TreeLearnerBuilder::new(&table)
///     .target("class")
///     .max_depth(4)
///     .criterion(Criterion::InformationGain)
///     .build()
///     .unwrap();
/// let tree = learner.learn();
/// ```
#[derive(Clone)]
pub struct TreeLearnerBuilder<'a> {
    table: &'a Table,
    config: TreeLearnerConfig,
}


impl<'a> TreeLearnerBuilder<'a> {
    /// Construct a new instance of [`TreeLearnerBuilder`]
    /// with the defaults of [`TreeLearnerConfig`].
    pub fn new(table: &'a Table) -> Self {
        Self::from_config(table, TreeLearnerConfig::default())
    }


    /// Start from an existing configuration.
    pub fn from_config(table: &'a Table, config: TreeLearnerConfig) -> Self {
        Self { table, config }
    }


    /// The configuration so far.
    pub fn config(&self) -> &TreeLearnerConfig {
        &self.config
    }


    /// Set the supervision column.
    pub fn target<S: ToString>(mut self, name: S) -> Self {
        self.config.target = Some(name.to_string());
        self
    }


    /// Restrict the inputs to the given columns.
    pub fn inputs<I, S>(mut self, names: I) -> Self
        where I: IntoIterator<Item = S>,
              S: ToString,
    {
        let names = names.into_iter().map(|s| s.to_string()).collect();
        self.config.inputs = Some(names);
        self
    }


    /// Nodes with fewer rows become leaves. Default is `2`.
    pub fn min_examples_to_split(mut self, n_examples: usize) -> Self {
        self.config.min_examples_to_split = n_examples;
        self
    }


    /// Maximal depth of the tree; `0` (the default) means unlimited.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.config.max_depth = depth;
        self
    }


    /// Set the splitting criterion.
    /// Default value is `Criterion::VarianceReduction`.
    pub fn criterion(mut self, criterion: Criterion) -> Self {
        self.config.criterion = criterion;
        self
    }


    /// Set the condition search.
    /// Default value is `ConditionLearnerKind::Exhaustive`.
    pub fn condition_learner(mut self, kind: ConditionLearnerKind) -> Self {
        self.config.condition_learner = kind;
        self
    }


    /// Set the candidates tried at each node.
    pub fn candidates(mut self, sampler: CandidateSampler) -> Self {
        self.config.candidates = sampler;
        self
    }


    /// Set the seed of every random draw.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }


    /// Set the logging level.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.config.verbosity = verbosity;
        self
    }


    /// Build a [`TreeLearner`], reporting every configuration error.
    pub fn build(self) -> Result<TreeLearner<'a>> {
        let Self { table, config } = self;

        let target_name = config.target.clone().ok_or(Error::NoTarget)?;
        let target = table.index_of(&target_name)?;
        let targets = Targets::from_column(table.column(target))?;
        if config.criterion.requires_labels() != targets.is_labels() {
            let role = if targets.is_labels() {
                "as a target of a regression criterion"
            } else {
                "as a target of a classification criterion"
            };
            return Err(Error::UnsupportedColumn { name: target_name, role });
        }

        if let CandidateSampler::RandomSubset(0) = config.candidates {
            let reason = "at least one candidate must be drawn";
            return Err(Error::invalid("candidates", reason));
        }

        let pool = candidate_pool(table, target, config.inputs.as_deref())?;
        let condition_learner = config.condition_learner
            .build(config.seed, config.verbosity)?;
        let criterion = config.criterion.build();

        Ok(TreeLearner::from_components(
            table,
            config,
            Arc::new(targets),
            pool,
            criterion,
            condition_learner,
        ))
    }
}


/// Candidate conditions of the inputs.
/// Without explicit inputs, every splittable column but the target is used.
fn candidate_pool(
    table: &Table,
    target: usize,
    inputs: Option<&[String]>,
) -> Result<Vec<Expression>>
{
    let columns = match inputs {
        Some(names) => {
            let columns = names.iter()
                .map(|name| table.index_of(name))
                .collect::<Result<Vec<_>>>()?;
            if columns.contains(&target) {
                return Err(Error::UnsupportedColumn {
                    name: table.column(target).name().to_string(),
                    role: "both as an input and as the target",
                });
            }
            columns
        },
        None => {
            table.splittable_columns()
                .filter(|&column| column != target)
                .collect()
        },
    };

    let mut pool = Vec::new();
    for column in columns {
        pool.append(&mut Expression::candidates_for(table, column)?);
    }
    Ok(pool)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::from_numeric("x", vec![1.0, 2.0, 3.0]),
            Column::object("memo", vec![None, None, None]),
            Column::categorical("c", vec![Some("a"), Some("b"), Some("a")]),
            Column::from_numeric("y", vec![0.0, 1.0, 1.0]),
        ]).unwrap()
    }


    #[test]
    fn schema_errors_surface_at_build_time() {
        let table = table();

        let err = TreeLearnerBuilder::new(&table).build().unwrap_err();
        assert!(matches!(err, Error::NoTarget));

        let err = TreeLearnerBuilder::new(&table).target("z").build().unwrap_err();
        assert!(matches!(err, Error::UnknownColumn(_)));

        let err = TreeLearnerBuilder::new(&table)
            .target("y")
            .inputs(["x", "memo"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedColumn { .. }));

        let err = TreeLearnerBuilder::new(&table)
            .target("y")
            .criterion(Criterion::Gini)
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedColumn { .. }));

        let err = TreeLearnerBuilder::new(&table)
            .target("y")
            .inputs(["y"])
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedColumn { .. }));
    }


    #[test]
    fn default_inputs_skip_objects_and_the_target() {
        let table = table();
        let pool = candidate_pool(&table, 3, None).unwrap();
        let names = pool.iter()
            .map(|e| e.input_name().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["x", "c"]);
    }
}
