use minitrees::prelude::*;
use minitrees::tree::{dispatch, Node};
use minitrees::condition_learner::best_threshold;
use minitrees::criterion::{Targets, VarianceReduction};

use polars::prelude::*;

use std::sync::Arc;


// The toy example used throughout this file.
//
//  y
//  1|                o   o   o   o
//   |
//  0|o   o   o   o
//   |________________________________ x
//    1   2   3   4 | 5   6   7   8
//                 4.5
fn toy_table() -> Table {
    let x = Series::new("x", &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    let y = Series::new("y", &[0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0]);
    let df = DataFrame::new(vec![x, y]).unwrap();
    Table::from_dataframe(&df).unwrap()
}


#[test]
fn step_is_split_at_the_midpoint() {
    let table = toy_table();
    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();

    let Node::Test(root) = tree.root() else {
        panic!("the root must split");
    };
    assert_eq!(root.condition().to_string(), "x >= 4.5");

    let indices = IndexSet::full(table.n_rows());
    let [pass, fail, missing] = dispatch(&table, root.condition(), &indices);
    assert_eq!(pass.as_slice(), &[4, 5, 6, 7]);
    assert_eq!(fail.as_slice(), &[0, 1, 2, 3]);
    assert!(missing.is_empty());

    assert_eq!(tree.n_test_nodes(), 1);
    for row in 0..table.n_rows() {
        let expected = if row < 4 { 0.0 } else { 1.0 };
        assert_eq!(tree.predict_value(&table, row), expected);
    }
}


#[test]
fn the_step_threshold_is_unique() {
    let table = toy_table();
    let targets = Targets::from_column(table.column(1)).unwrap();
    let mut criterion = VarianceReduction::default();
    criterion.configure(Arc::new(targets), None, IndexSet::full(8));

    let predictions = vec![Some(false); 8];
    criterion.set_predictions(&predictions);
    let sorted = (0..8).map(|row| (row, row as f64 + 1.0)).collect::<Vec<_>>();
    let (threshold, score) = best_threshold(&mut criterion, &sorted);
    assert_eq!(threshold, 4.5);
    // the variance of y is 0.25, and both sides are pure.
    assert!((score - 0.25).abs() < 1e-12);
}


#[test]
fn tied_thresholds_resolve_to_their_median() {
    let x = (1..=10).map(f64::from).collect::<Vec<_>>();
    let sorted = x.iter().copied().enumerate().collect::<Vec<_>>();
    let mut n_ties = 0;
    for mask in 0..1024_u32 {
        let y = (0..10)
            .map(|i| if mask >> i & 1 == 1 { 0.7 } else { 0.1 })
            .collect::<Vec<_>>();
        let table = Table::new(vec![
            Column::from_numeric("x", x.clone()),
            Column::from_numeric("y", y),
        ])
        .unwrap();
        let targets = Arc::new(Targets::from_column(table.column(1)).unwrap());

        // Score every threshold from scratch, highest first.
        let mut direct = VarianceReduction::default();
        direct.configure(targets.clone(), None, IndexSet::full(10));
        let scores = (1..10).rev()
            .map(|k| {
                let threshold = k as f64 + 0.5;
                let predictions = x.iter()
                    .map(|&v| Some(v >= threshold))
                    .collect::<Vec<_>>();
                direct.set_predictions(&predictions);
                (threshold, direct.compute_criterion())
            })
            .collect::<Vec<_>>();
        let best = scores.iter()
            .map(|&(_, score)| score)
            .fold(f64::NEG_INFINITY, f64::max);
        let tied = scores.iter()
            .filter(|(_, score)| (score - best).abs() <= 1e-12 * best.abs().max(1.0))
            .map(|&(threshold, _)| threshold)
            .collect::<Vec<_>>();
        if tied.len() > 1 {
            n_ties += 1;
        }

        let mut criterion = VarianceReduction::default();
        criterion.configure(targets, None, IndexSet::full(10));
        let (threshold, _) = best_threshold(&mut criterion, &sorted);
        assert_eq!(threshold, tied[tied.len() / 2], "mask {mask:#012b}");
    }
    assert!(n_ties > 0);
}


#[test]
fn children_below_the_minimum_size_are_leaves() {
    // Two inputs, both splitting 4 / 4.
    let x = Column::from_numeric("x", (1..=8).map(f64::from).collect());
    let z = Column::from_numeric("z", vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    let y = Column::from_numeric("y", vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
    let table = Table::new(vec![x, z, y]).unwrap();

    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .min_examples_to_split(5)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();

    let Node::Test(root) = tree.root() else {
        panic!("8 rows must be split");
    };
    for child in root.children() {
        assert!(matches!(child, Node::Leaf(_)));
    }
    assert_eq!(tree.depth(), 1);
}


#[test]
fn constant_targets_give_a_single_leaf() {
    let x = Column::from_numeric("x", vec![3.0, 1.0, 4.0, 1.0, 5.0]);
    let y = Column::from_numeric("y", vec![2.5; 5]);
    let table = Table::new(vec![x, y]).unwrap();

    for (min_examples, max_depth) in [(1, 0), (2, 10), (100, 1)] {
        let mut learner = TreeLearnerBuilder::new(&table)
            .target("y")
            .min_examples_to_split(min_examples)
            .max_depth(max_depth)
            .verbosity(Verbosity::Silent)
            .build()
            .unwrap();
        let tree = learner.learn();
        let Node::Leaf(leaf) = tree.root() else {
            panic!("a constant target must not be split");
        };
        assert_eq!(leaf.vote(), &Vote::Value(2.5));
        assert_eq!(leaf.n_examples(), 5);
    }
}


#[test]
fn max_depth_one_gives_a_stump() {
    let x = Column::from_numeric("x", (0..20).map(f64::from).collect());
    let y = Column::from_numeric("y", (0..20).map(|i| f64::from(i * i % 7)).collect());
    let table = Table::new(vec![x, y]).unwrap();

    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .max_depth(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.n_test_nodes(), 1);
}


#[test]
fn missing_values_follow_the_missing_branch() {
    let x = Column::from_numeric("x", vec![1.0, 2.0, f64::NAN, 8.0, 9.0, f64::NAN]);
    let y = Column::from_numeric("y", vec![0.0, 0.0, 5.0, 10.0, 10.0, 5.0]);
    let table = Table::new(vec![x, y]).unwrap();

    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();
    assert_eq!(tree.predict_value(&table, 0), 0.0);
    assert_eq!(tree.predict_value(&table, 2), 5.0);
    assert_eq!(tree.predict_value(&table, 4), 10.0);
}


#[test]
fn classification_with_a_categorical_input() {
    let color = Column::categorical(
        "color",
        ["red", "blue", "red", "green", "blue", "green"].map(Some),
    );
    let size = Column::from_numeric("size", vec![1.0, 2.0, 1.5, 8.0, 2.5, 9.0]);
    let label = Column::categorical(
        "label",
        ["small", "small", "small", "large", "small", "large"].map(Some),
    );
    let table = Table::new(vec![color, size, label]).unwrap();

    for criterion in [Criterion::InformationGain, Criterion::Gini] {
        let mut learner = TreeLearnerBuilder::new(&table)
            .target("label")
            .criterion(criterion)
            .verbosity(Verbosity::Silent)
            .build()
            .unwrap();
        let tree = learner.learn();
        for row in 0..table.n_rows() {
            let expected = table.column(2).display_value(row);
            assert_eq!(tree.predict_class(&table, row), Some(expected.as_str()));
        }
        assert_eq!(tree.class_names().unwrap(), &["small", "large"]);
    }
}


#[test]
fn configuration_errors_surface_at_build() {
    let table = toy_table();

    let err = TreeLearnerBuilder::new(&table).build().unwrap_err();
    assert!(matches!(err, Error::NoTarget));

    let err = TreeLearnerBuilder::new(&table).target("w").build().unwrap_err();
    assert!(matches!(err, Error::UnknownColumn(_)));

    let err = TreeLearnerBuilder::new(&table)
        .target("y")
        .criterion(Criterion::Gini)
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedColumn { .. }));

    let err = TreeLearnerBuilder::new(&table)
        .target("y")
        .inputs(["x", "y"])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedColumn { .. }));
}


#[test]
fn trees_survive_json() {
    let table = toy_table();
    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();

    let json = tree.to_json().unwrap();
    let back = DecisionTree::from_json(&json).unwrap();
    assert_eq!(back, tree);
    assert_eq!(back.target(), "y");

    let importances = back.feature_importances();
    assert!((importances["x"] - 0.25).abs() < 1e-12);
}


#[test]
fn importances_are_relative_to_the_whole_table() {
    let table = toy_table();
    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    // Half of the rows, still a perfect step.
    let indices = IndexSet::from_rows([0, 1, 6, 7]);
    let tree = learner.learn_on(&indices, None);

    let Node::Test(root) = tree.root() else {
        panic!("the root must split");
    };
    assert_eq!(root.condition().to_string(), "x >= 4.5");
    // 0.25 of variance removed on 4 of the 8 rows.
    let importances = tree.feature_importances();
    assert!((importances["x"] - 0.125).abs() < 1e-12);
}


#[test]
fn json_keeps_thresholds_bit_exact() {
    // Midpoints of such values need all 17 digits to read back.
    let x = (0..60)
        .map(|i| (f64::from(i) * 0.37).sin() * 31.3 + 1.0 / 3.0)
        .collect::<Vec<_>>();
    let y = x.iter()
        .map(|&v| if v > 5.0 { v / 7.0 } else { -v.cos() })
        .collect::<Vec<_>>();
    let table = Table::new(vec![
        Column::from_numeric("x", x),
        Column::from_numeric("y", y),
    ])
    .unwrap();
    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();

    let back = DecisionTree::from_json(&tree.to_json().unwrap()).unwrap();
    assert_eq!(back, tree);
    assert_eq!(back.feature_importances(), tree.feature_importances());
    assert_eq!(back.predict_all(&table), tree.predict_all(&table));
}


#[test]
fn dot_output_lists_every_node() {
    let table = toy_table();
    let mut learner = TreeLearnerBuilder::new(&table)
        .target("y")
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();
    let tree = learner.learn();

    let path = std::env::temp_dir().join("minitrees_toy_tree.dot");
    tree.to_dot_file(&path).unwrap();
    let dot = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(dot.starts_with("graph DecisionTree {"));
    assert!(dot.contains("node_0"));
    assert!(dot.contains("x >= 4.5"));
}


#[test]
fn learning_is_deterministic() {
    let x = Column::from_numeric("x", (0..50).map(|i| f64::from(i * 37 % 50)).collect());
    let z = Column::from_numeric("z", (0..50).map(|i| f64::from(i * 11 % 13)).collect());
    let y = Column::from_numeric("y", (0..50).map(|i| f64::from(i % 5)).collect());
    let table = Table::new(vec![x, z, y]).unwrap();

    let kinds = [
        ConditionLearnerKind::Exhaustive,
        ConditionLearnerKind::RandomSplit,
        ConditionLearnerKind::laminating(),
        ConditionLearnerKind::bandit(),
    ];
    for kind in kinds {
        let grow = || {
            TreeLearnerBuilder::new(&table)
                .target("y")
                .condition_learner(kind)
                .seed(99)
                .verbosity(Verbosity::Silent)
                .build()
                .unwrap()
                .learn()
        };
        assert_eq!(grow(), grow(), "{kind}");
    }
}
