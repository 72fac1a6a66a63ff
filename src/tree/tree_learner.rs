use colored::Colorize;
use rand::prelude::*;

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::condition_learner::ConditionLearner;
use crate::constants::{MAX_RECURSION_DEPTH, SPLIT_TOLERANCE};
use crate::criterion::{SplittingCriterion, Targets, Vote};
use crate::expression::Expression;
use crate::logging::Logger;
use crate::sample::{IndexSet, Table};
use super::config::TreeLearnerConfig;
use super::decision_tree::DecisionTree;
use super::node::{Node, TestNode};


/// Grows a decision tree by recursive partitioning.
///
/// At each node, the condition learner picks the condition that
/// maximizes the splitting criterion on the node's rows,
/// and the rows are partitioned into those that pass the condition,
/// fail it, or miss an input. The three parts are grown in that order.
/// A node becomes a leaf when it has fewer than `min_examples_to_split`
/// rows, reaches `max_depth`, has a constant target, or has no
/// condition that beats a non-split.
pub struct TreeLearner<'a> {
    table: &'a Table,
    config: TreeLearnerConfig,
    targets: Arc<Targets>,
    pool: Vec<Expression>,
    criterion: Box<dyn SplittingCriterion>,
    condition_learner: Box<dyn ConditionLearner>,
    rng: StdRng,
    logger: Logger,
}


/// State shared by the nodes of one tree.
struct Growth {
    weights: Option<Arc<[f64]>>,
    // Importances are relative to the whole table,
    // whatever subset the tree is grown on.
    n_table: usize,
}


impl<'a> TreeLearner<'a> {
    pub(super) fn from_components(
        table: &'a Table,
        config: TreeLearnerConfig,
        targets: Arc<Targets>,
        pool: Vec<Expression>,
        criterion: Box<dyn SplittingCriterion>,
        condition_learner: Box<dyn ConditionLearner>,
    ) -> Self
    {
        let rng = StdRng::seed_from_u64(config.seed);
        let logger = Logger::new("tree", config.verbosity);
        if pool.is_empty() {
            logger.warn("no input can be split; trees will be single leaves");
        }
        Self {
            table,
            config,
            targets,
            pool,
            criterion,
            condition_learner,
            rng,
            logger,
        }
    }


    /// The configuration of this learner.
    pub fn config(&self) -> &TreeLearnerConfig {
        &self.config
    }


    /// The candidate conditions offered by the inputs.
    pub fn candidates(&self) -> &[Expression] {
        &self.pool
    }


    /// The condition learner.
    pub fn condition_learner(&self) -> &dyn ConditionLearner {
        self.condition_learner.as_ref()
    }


    /// Grows a tree on every row of the table.
    pub fn learn(&mut self) -> DecisionTree {
        let indices = IndexSet::full(self.table.n_rows());
        self.learn_on(&indices, None)
    }


    /// Grows a tree on `indices`, with row `r` weighted by `weights[r]`.
    /// `weights`, when given, covers every row of the table.
    pub fn learn_on(
        &mut self,
        indices: &IndexSet,
        weights: Option<Arc<[f64]>>,
    ) -> DecisionTree
    {
        debug_assert!(
            weights.as_ref().map_or(true, |w| w.len() == self.table.n_rows())
        );
        self.print_info();
        let now = Instant::now();

        let growth = Growth { weights, n_table: self.table.n_rows() };
        let root_vote = self.targets.vote(growth.weights.as_deref(), indices);
        let root = self.make_tree(indices.clone(), 0, &root_vote, &growth);
        self.condition_learner.stop_batch();

        let tree = DecisionTree::new(
            root,
            self.config.target.clone().unwrap_or_default(),
            class_names(&self.targets),
        );
        self.logger.finish(
            format!(
                "{} rows, {} test nodes, depth {}",
                indices.len(), tree.n_test_nodes(), tree.depth(),
            ),
            now.elapsed().as_millis(),
        );
        tree
    }


    fn make_tree(
        &mut self,
        indices: IndexSet,
        depth: usize,
        parent_vote: &Vote,
        growth: &Growth,
    ) -> Node
    {
        if indices.is_empty() {
            return Node::leaf(parent_vote.clone(), 0);
        }

        let n_examples = indices.len();
        let vote = self.targets.vote(growth.weights.as_deref(), &indices);
        let max_depth = self.config.max_depth;
        if n_examples < self.config.min_examples_to_split
            || (max_depth > 0 && depth >= max_depth)
            || self.targets.is_constant(&indices)
        {
            return Node::leaf(vote, n_examples);
        }
        if depth >= MAX_RECURSION_DEPTH {
            debug_assert!(false, "recursion reached depth {depth}");
            self.logger.warn(format!("recursion reached depth {depth}"));
            return Node::leaf(vote, n_examples);
        }

        self.criterion.configure(
            self.targets.clone(),
            growth.weights.clone(),
            indices.clone(),
        );
        let candidates = self.config.candidates
            .sample(&self.pool, &mut self.rng);
        let best = self.condition_learner
            .learn(self.table, self.criterion.as_mut(), &candidates);

        let Some(best) = best else {
            return Node::leaf(vote, n_examples);
        };
        let worst = self.criterion.worst_score();
        if best.condition.is_constant() || best.score <= worst + SPLIT_TOLERANCE {
            return Node::leaf(vote, n_examples);
        }

        let [pass, fail, missing] = dispatch(self.table, &best.condition, &indices);
        if [&pass, &fail, &missing].iter().any(|part| part.len() == n_examples) {
            self.logger.warn(format!(
                "`{}` does not split its {n_examples} rows", best.condition
            ));
            return Node::leaf(vote, n_examples);
        }

        let importance = best.score * n_examples as f64 / growth.n_table as f64;
        self.logger.detail(format!(
            "{:>depth$}{} [score {:.6}] {} / {} / {}",
            "",
            best.condition.to_string().bold(),
            best.score,
            pass.len(),
            fail.len(),
            missing.len(),
        ));

        let pass = self.make_tree(pass, depth + 1, &vote, growth);
        let fail = self.make_tree(fail, depth + 1, &vote, growth);
        let missing = self.make_tree(missing, depth + 1, &vote, growth);

        Node::Test(TestNode {
            condition: best.condition,
            importance,
            pass: Box::new(pass),
            fail: Box::new(fail),
            missing: Box::new(missing),
        })
    }


    fn print_info(&self) {
        let logger = self.logger;
        logger.detail(format!(
            "{} | {} | {} candidates ({})",
            self.criterion.name(),
            self.condition_learner.name(),
            self.pool.len(),
            self.config.candidates,
        ));
        if let Some(info) = self.condition_learner.info() {
            for (name, value) in info {
                logger.detail(format!("  {name:<20} {value}"));
            }
        }
    }
}


impl fmt::Debug for TreeLearner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeLearner")
            .field("config", &self.config)
            .field("criterion", &self.criterion.name())
            .field("condition_learner", &self.condition_learner.name())
            .field("n_candidates", &self.pool.len())
            .finish()
    }
}


/// Partitions `indices` into the rows that pass `condition`,
/// fail it, or cannot evaluate it.
pub fn dispatch(table: &Table, condition: &Expression, indices: &IndexSet)
    -> [IndexSet; 3]
{
    let mut pass = Vec::new();
    let mut fail = Vec::new();
    let mut missing = Vec::new();
    for row in indices.iter() {
        match condition.evaluate_boolean(table, row) {
            Some(true) => pass.push(row),
            Some(false) => fail.push(row),
            None => missing.push(row),
        }
    }
    [pass, fail, missing].map(IndexSet::from_sorted_unchecked)
}


fn class_names(targets: &Targets) -> Option<Vec<String>> {
    match targets {
        Targets::Labels { names, .. } => Some(names.clone()),
        Targets::Numeric(_) => None,
    }
}
