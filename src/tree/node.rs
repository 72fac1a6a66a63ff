//! Nodes of a learned decision tree.
use serde::{Serialize, Deserialize};

use std::collections::HashMap;

use crate::criterion::Vote;
use crate::expression::Expression;
use crate::sample::Table;


/// Enumeration of `TestNode` and `LeafNode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A node that routes rows to three children.
    Test(TestNode),


    /// A node that predicts a constant vote.
    Leaf(LeafNode),
}


/// A condition and the subtrees for rows that pass it,
/// fail it, or cannot be evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestNode {
    pub(crate) condition: Expression,
    pub(crate) importance: f64,
    pub(crate) pass: Box<Node>,
    pub(crate) fail: Box<Node>,
    pub(crate) missing: Box<Node>,
}


impl TestNode {
    /// The condition of this node.
    #[inline]
    pub fn condition(&self) -> &Expression {
        &self.condition
    }


    /// `score × #rows at this node / #training rows`.
    #[inline]
    pub fn importance(&self) -> f64 {
        self.importance
    }


    /// Children for rows that pass, fail, and miss the condition.
    #[inline]
    pub fn children(&self) -> [&Node; 3] {
        [&*self.pass, &*self.fail, &*self.missing]
    }
}


/// A leaf of a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pub(crate) vote: Vote,
    pub(crate) n_examples: usize,
}


impl LeafNode {
    /// The prediction of this leaf.
    #[inline]
    pub fn vote(&self) -> &Vote {
        &self.vote
    }


    /// Number of training rows that reached this leaf.
    #[inline]
    pub fn n_examples(&self) -> usize {
        self.n_examples
    }
}


impl Node {
    pub(crate) fn leaf(vote: Vote, n_examples: usize) -> Self {
        Self::Leaf(LeafNode { vote, n_examples })
    }


    /// The leaf reached by `row`.
    pub fn leaf_of(&self, table: &Table, row: usize) -> &LeafNode {
        let mut node = self;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf,
                Node::Test(test) => {
                    node = match test.condition.evaluate_boolean(table, row) {
                        Some(true) => &*test.pass,
                        Some(false) => &*test.fail,
                        None => &*test.missing,
                    };
                },
            }
        }
    }


    /// Number of test nodes in this subtree.
    pub fn n_test_nodes(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Test(test) => {
                1 + test.children()
                    .into_iter()
                    .map(Node::n_test_nodes)
                    .sum::<usize>()
            },
        }
    }


    /// Number of leaves in this subtree.
    pub fn n_leaves(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Test(test) => {
                test.children()
                    .into_iter()
                    .map(Node::n_leaves)
                    .sum::<usize>()
            },
        }
    }


    /// Depth of this subtree. A leaf has depth `0`.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 0,
            Node::Test(test) => {
                1 + test.children()
                    .into_iter()
                    .map(Node::depth)
                    .max()
                    .unwrap_or(0)
            },
        }
    }


    pub(crate) fn accumulate_importances(
        &self,
        importances: &mut HashMap<String, f64>,
    )
    {
        if let Node::Test(test) = self {
            if let Some(name) = test.condition.input_name() {
                *importances.entry(name.to_string()).or_insert(0.0)
                    += test.importance;
            }
            test.children()
                .into_iter()
                .for_each(|child| child.accumulate_importances(importances));
        }
    }


    pub(crate) fn to_dot_info(&self, id: usize) -> (Vec<String>, usize) {
        match self {
            Node::Test(test) => {
                let mut info = vec![format!(
                    "\tnode_{id} [ label = \"{cond} ?\" ];\n",
                    cond = test.condition,
                )];

                let mut next_id = id + 1;
                let labels = ["Yes", "No", "Missing"];
                for (child, label) in test.children().into_iter().zip(labels) {
                    info.push(format!(
                        "\tnode_{id} -- node_{next_id} [ label = \"{label}\" ];\n"
                    ));
                    let (mut child_info, ret_id) = child.to_dot_info(next_id);
                    info.append(&mut child_info);
                    next_id = ret_id;
                }

                (info, next_id)
            },
            Node::Leaf(leaf) => {
                let p = match &leaf.vote {
                    Vote::Value(value) => format!("{value:.4}"),
                    Vote::Distribution(dist) => {
                        let dist = dist.iter()
                            .map(|p| format!("{p:.2}"))
                            .collect::<Vec<_>>()
                            .join(", ");
                        format!("[{dist}]")
                    },
                };
                let info = format!(
                    "\tnode_{id} [ \
                     label = \"{p} ({n})\", \
                     shape = box, \
                     ];\n",
                    n = leaf.n_examples,
                );

                (vec![info], id + 1)
            },
        }
    }
}
