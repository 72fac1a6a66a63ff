use rayon::prelude::*;
use serde::{Serialize, Deserialize};

use std::collections::HashMap;
use std::fs::File;
use std::io::prelude::*;
use std::path::Path;

use crate::criterion::Vote;
use crate::error::{Error, Result};
use crate::sample::Table;
use super::node::Node;


/// A learned decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    root: Node,
    target: String,
    class_names: Option<Vec<String>>,
}


impl DecisionTree {
    pub(crate) fn new(
        root: Node,
        target: String,
        class_names: Option<Vec<String>>,
    ) -> Self
    {
        Self { root, target, class_names }
    }


    /// The root node.
    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }


    /// Name of the supervision column the tree was trained on.
    #[inline]
    pub fn target(&self) -> &str {
        &self.target
    }


    /// Class names, for class label targets.
    #[inline]
    pub fn class_names(&self) -> Option<&[String]> {
        self.class_names.as_deref()
    }


    /// The vote of the leaf reached by `row`.
    #[inline]
    pub fn predict(&self, table: &Table, row: usize) -> &Vote {
        &self.root.leaf_of(table, row).vote
    }


    /// The scalar prediction for `row`:
    /// the mean target, or the code of the most probable class.
    #[inline]
    pub fn predict_value(&self, table: &Table, row: usize) -> f64 {
        self.predict(table, row).value()
    }


    /// The most probable class name for `row`.
    pub fn predict_class(&self, table: &Table, row: usize) -> Option<&str> {
        let class = self.predict(table, row).class()?;
        self.class_names.as_ref()
            .and_then(|names| names.get(class))
            .map(String::as_str)
    }


    /// Scalar predictions for every row of `table`.
    pub fn predict_all(&self, table: &Table) -> Vec<f64> {
        (0..table.n_rows()).into_par_iter()
            .map(|row| self.predict_value(table, row))
            .collect()
    }


    /// Number of nodes.
    pub fn tree_size(&self) -> usize {
        self.root.n_test_nodes() + self.root.n_leaves()
    }


    /// Number of test nodes.
    pub fn n_test_nodes(&self) -> usize {
        self.root.n_test_nodes()
    }


    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }


    /// Depth of the tree. A single leaf has depth `0`.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }


    /// Sum of the importances of the test nodes of each input.
    pub fn feature_importances(&self) -> HashMap<String, f64> {
        let mut importances = HashMap::new();
        self.root.accumulate_importances(&mut importances);
        importances
    }


    /// Serializes the tree as JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Serialization(e.to_string()))
    }


    /// Reads a tree written by [`to_json`](Self::to_json).
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::Serialization(e.to_string()))
    }


    /// Write the current decision tree to dot file.
    pub fn to_dot_file<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path>
    {
        let mut f = File::create(path)?;
        f.write_all(b"graph DecisionTree {\n")?;

        let info = self.root.to_dot_info(0).0;
        for row in info {
            f.write_all(row.as_bytes())?;
        }

        f.write_all(b"}\n")?;

        Ok(())
    }
}
