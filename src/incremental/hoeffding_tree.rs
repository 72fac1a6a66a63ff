use rand::prelude::*;

use std::time::Instant;

use crate::constants::*;
use crate::error::{Error, Result};
use crate::logging::{Logger, Verbosity};
use super::criterion::{
    HoeffdingBoundCriterion,
    IncrementalSplittingCriterion,
    QuandtAndrewsCriterion,
    SplitDecision,
    SplitRule,
};
use super::ebst::Ebst;
use super::leaf_model::{InputScaler, LeafModel, Perceptron};
use super::statistics::RegressionStatistics;


/// Statistics accumulated by a leaf of an [`IncrementalTree`].
#[derive(Debug, Clone)]
struct LeafStatistics {
    inputs: Vec<Ebst>,
    target: RegressionStatistics,
    prior: f64,
    perceptron: Option<Perceptron>,
    examples_seen: usize,
}


impl LeafStatistics {
    fn new(n_inputs: usize, prior: f64, perceptron: Option<Perceptron>)
        -> Self
    {
        Self {
            inputs: vec![Ebst::new(); n_inputs],
            target: RegressionStatistics::default(),
            prior,
            perceptron,
            examples_seen: 0,
        }
    }


    fn mean(&self) -> f64 {
        if self.target.count() > 0.0 {
            self.target.mean_y()
        } else {
            self.prior
        }
    }
}


#[derive(Debug, Clone)]
enum IncrementalNode {
    Leaf(LeafStatistics),
    Test {
        attribute: usize,
        threshold: f64,
        left: usize,
        right: usize,
        examples_seen: usize,
    },
}


/// A regression tree grown one example at a time
/// by [`HoeffdingTreeLearner::add_training_sample`].
/// Nodes live in an arena; the root is node `0`.
#[derive(Debug, Clone)]
pub struct IncrementalTree {
    nodes: Vec<IncrementalNode>,
    n_inputs: usize,
    leaf_model: LeafModel,
    scaler: InputScaler,
}


impl IncrementalTree {
    /// A single leaf tree over `n_inputs` inputs that predicts `0`.
    pub fn new(n_inputs: usize) -> Self {
        let root = LeafStatistics::new(n_inputs, 0.0, None);
        Self {
            nodes: vec![IncrementalNode::Leaf(root)],
            n_inputs,
            leaf_model: LeafModel::Mean,
            scaler: InputScaler::new(n_inputs),
        }
    }


    /// A single leaf tree whose leaves predict with `leaf_model`.
    /// A perceptron root starts from random weights drawn with `seed`.
    pub fn with_leaf_model(n_inputs: usize, leaf_model: LeafModel, seed: u64)
        -> Self
    {
        let mut tree = Self::new(n_inputs);
        if let LeafModel::Perceptron { learning_rate, decay } = leaf_model {
            let mut rng = StdRng::seed_from_u64(seed);
            let perceptron = Perceptron::new(
                n_inputs, learning_rate, decay, &mut rng
            );
            let root = LeafStatistics::new(n_inputs, 0.0, Some(perceptron));
            tree.nodes[0] = IncrementalNode::Leaf(root);
        }
        tree.leaf_model = leaf_model;
        tree
    }


    /// The model of the leaves.
    #[inline]
    pub fn leaf_model(&self) -> LeafModel {
        self.leaf_model
    }


    /// Number of inputs of every example.
    #[inline]
    pub fn n_inputs(&self) -> usize {
        self.n_inputs
    }


    /// Predicted output for `input`.
    /// Missing (`NaN`) values go left.
    ///
    /// # Panics
    /// Panics when `input` is shorter than [`IncrementalTree::n_inputs`].
    pub fn predict(&self, input: &[f64]) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                IncrementalNode::Leaf(leaf) => {
                    return match &leaf.perceptron {
                        Some(model) => model.predict(&self.scaler.scale(input)),
                        None => leaf.mean(),
                    };
                },
                IncrementalNode::Test { attribute, threshold, left, right, .. } => {
                    let x = input[*attribute];
                    id = if x.is_nan() || x <= *threshold { *left } else { *right };
                },
            }
        }
    }


    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter()
            .filter(|node| matches!(node, IncrementalNode::Leaf(_)))
            .count()
    }


    /// Number of committed splits.
    pub fn n_splits(&self) -> usize {
        self.nodes.len() - self.n_leaves()
    }


    /// Number of examples the tree has been trained on.
    pub fn examples_seen(&self) -> usize {
        match &self.nodes[0] {
            IncrementalNode::Leaf(leaf) => leaf.examples_seen,
            IncrementalNode::Test { examples_seen, .. } => *examples_seen,
        }
    }


    /// `(attribute, threshold)` of the root split, if any.
    pub fn root_split(&self) -> Option<(usize, f64)> {
        match &self.nodes[0] {
            IncrementalNode::Test { attribute, threshold, .. }
                => Some((*attribute, *threshold)),
            IncrementalNode::Leaf(_) => None,
        }
    }


    fn split(&mut self, id: usize, decision: &SplitDecision) {
        let IncrementalNode::Leaf(leaf) = &self.nodes[id] else { return; };
        let prior = leaf.mean();
        let perceptron = leaf.perceptron.as_ref().map(Perceptron::restarted);
        let examples_seen = leaf.examples_seen;

        let left = self.nodes.len();
        let right = left + 1;
        self.nodes.push(IncrementalNode::Leaf(
            LeafStatistics::new(self.n_inputs, prior, perceptron.clone())
        ));
        self.nodes.push(IncrementalNode::Leaf(
            LeafStatistics::new(self.n_inputs, prior, perceptron)
        ));
        self.nodes[id] = IncrementalNode::Test {
            attribute: decision.attribute,
            threshold: decision.value,
            left,
            right,
            examples_seen,
        };
    }
}


/// Streaming regression tree learner.
/// Each leaf keeps one [`Ebst`] per input,
/// and every `chunk_size` examples it asks the
/// [`SplitRule`] whether to split.
/// Leaves predict the mean of their outputs, or with a
/// [`Perceptron`] of the scaled inputs, which children inherit.
///
/// ```no_run
/// use minitrees::prelude::*;
///
/// let learner = HoeffdingTreeLearner::new()
///     .chunk_size(100)
///     .unwrap();
/// let mut tree = learner.new_tree(2);
/// learner.add_training_sample(&mut tree, &[0.3, 1.0], 2.0).unwrap();
/// let y = tree.predict(&[0.3, 1.0]);
/// ```
#[derive(Debug, Clone)]
pub struct HoeffdingTreeLearner {
    chunk_size: usize,
    criterion: SplitRule,
    leaf_model: LeafModel,
    seed: u64,
    logger: Logger,
}


impl Default for HoeffdingTreeLearner {
    fn default() -> Self {
        Self::new()
    }
}


impl HoeffdingTreeLearner {
    /// Construct a learner with the default parameters.
    pub fn new() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            criterion: SplitRule::default(),
            leaf_model: LeafModel::default(),
            seed: DEFAULT_SEED,
            logger: Logger::new("Hoeffding", Verbosity::Silent),
        }
    }


    /// Number of examples a leaf sees between two split tests.
    pub fn chunk_size(mut self, chunk_size: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::invalid("chunk_size", "must be positive"));
        }
        self.chunk_size = chunk_size;
        Ok(self)
    }


    /// Set the confidence parameter, the threshold and the quality measure.
    pub fn criterion(
        mut self,
        delta: f64,
        threshold: f64,
        quality: IncrementalSplittingCriterion,
    ) -> Result<Self>
    {
        let criterion = HoeffdingBoundCriterion::new(delta, threshold, quality)?;
        self.criterion = SplitRule::HoeffdingBound(criterion);
        Ok(self)
    }


    /// Split with a Chow test on lines of `n_parameters` parameters,
    /// when the residual variance drops by more than `threshold`.
    pub fn quandt_andrews(mut self, n_parameters: usize, threshold: f64)
        -> Result<Self>
    {
        let criterion = QuandtAndrewsCriterion::new(n_parameters, threshold)?;
        self.criterion = SplitRule::QuandtAndrews(criterion);
        Ok(self)
    }


    /// Set the split rule.
    pub fn split_rule(mut self, rule: SplitRule) -> Self {
        self.criterion = rule;
        self
    }


    /// Set the model of the leaves.
    pub fn leaf_model(mut self, leaf_model: LeafModel) -> Result<Self> {
        leaf_model.validate()?;
        self.leaf_model = leaf_model;
        Ok(self)
    }


    /// Set the seed of the initial perceptron weights.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Set the verbosity. Committed splits are logged at `Detailed`.
    pub fn verbosity(mut self, verbosity: Verbosity) -> Self {
        self.logger = Logger::new("Hoeffding", verbosity);
        self
    }


    /// The split rule.
    #[inline]
    pub fn split_criterion(&self) -> &SplitRule {
        &self.criterion
    }


    /// An untrained tree over `n_inputs` inputs.
    pub fn new_tree(&self, n_inputs: usize) -> IncrementalTree {
        IncrementalTree::with_leaf_model(n_inputs, self.leaf_model, self.seed)
    }


    /// Update `tree` with one example.
    /// The example is routed to a leaf, whose statistics absorb it,
    /// and the leaf is split when the criterion is confident enough.
    pub fn add_training_sample(
        &self,
        tree: &mut IncrementalTree,
        input: &[f64],
        output: f64,
    ) -> Result<()>
    {
        if input.len() != tree.n_inputs {
            let reason = format!(
                "expected {} inputs, got {}.", tree.n_inputs, input.len()
            );
            return Err(Error::invalid("input", reason));
        }
        if !output.is_finite() {
            let reason = format!("the output must be finite. got {output}.");
            return Err(Error::invalid("output", reason));
        }

        tree.scaler.add(input);
        let scaled = match tree.leaf_model {
            LeafModel::Perceptron { .. } => Some(tree.scaler.scale(input)),
            LeafModel::Mean => None,
        };

        let mut id = 0;
        loop {
            match &mut tree.nodes[id] {
                IncrementalNode::Test {
                    attribute, threshold, left, right, examples_seen,
                } => {
                    *examples_seen += 1;
                    let x = input[*attribute];
                    id = if x.is_nan() || x <= *threshold { *left } else { *right };
                },
                IncrementalNode::Leaf(leaf) => {
                    leaf.examples_seen += 1;
                    leaf.target.add(0.0, output);
                    leaf.inputs.iter_mut()
                        .zip(input)
                        .filter(|(_, x)| !x.is_nan())
                        .for_each(|(ebst, &x)| ebst.add(x, output));
                    if let (Some(model), Some(x)) = (&mut leaf.perceptron, &scaled) {
                        model.train(x, output);
                    }
                    break;
                },
            }
        }

        let IncrementalNode::Leaf(leaf) = &tree.nodes[id] else {
            return Ok(());
        };
        if leaf.examples_seen % self.chunk_size != 0 {
            return Ok(());
        }

        let now = Instant::now();
        let n = leaf.target.count();
        let decision = self.criterion.find_best_split(&leaf.inputs, n);
        if let Some(decision) = decision {
            self.logger.detail(format!(
                "split leaf {id} on input {} at {:.5} \
                 (quality {:.5}, second {:.5}, bound {:.5}, n = {n})",
                decision.attribute,
                decision.value,
                decision.quality,
                decision.second_quality,
                decision.bound,
            ));
            tree.split(id, &decision);
            self.logger.trace(format!(
                "split test took {} ms", now.elapsed().as_millis()
            ));
        }
        Ok(())
    }
}
