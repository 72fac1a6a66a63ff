use minitrees::prelude::*;
use minitrees::incremental::hoeffding_bound;

use rand::prelude::*;
use rand_distr::{Distribution, Normal};


#[test]
fn noise_is_never_split() {
    let learner = HoeffdingTreeLearner::new()
        .criterion(1e-7, 0.0, IncrementalSplittingCriterion::StdDevReduction)
        .unwrap();
    let mut tree = learner.new_tree(3);

    let mut rng = StdRng::seed_from_u64(11);
    let normal = Normal::new(0.0, 1.0).unwrap();
    for _ in 0..5_000 {
        let input = [rng.gen::<f64>(), rng.gen::<f64>(), rng.gen::<f64>()];
        let output = normal.sample(&mut rng);
        learner.add_training_sample(&mut tree, &input, output).unwrap();
    }
    assert_eq!(tree.n_splits(), 0);
    assert_eq!(tree.examples_seen(), 5_000);
    assert!(tree.predict(&[0.5, 0.5, 0.5]).abs() < 0.1);
}


#[test]
fn a_piecewise_function_is_learned() {
    let learner = HoeffdingTreeLearner::new();
    let mut tree = learner.new_tree(2);

    let mut rng = StdRng::seed_from_u64(12);
    let normal = Normal::new(0.0, 0.1).unwrap();
    let f = |x0: f64, x1: f64| {
        if x0 <= 0.5 { -2.0 } else if x1 <= 0.5 { 1.0 } else { 3.0 }
    };
    for _ in 0..20_000 {
        let (x0, x1) = (rng.gen::<f64>(), rng.gen::<f64>());
        let y = f(x0, x1) + normal.sample(&mut rng);
        learner.add_training_sample(&mut tree, &[x0, x1], y).unwrap();
    }
    assert!(tree.n_splits() >= 2);
    assert_eq!(tree.n_leaves(), tree.n_splits() + 1);

    let (attribute, _) = tree.root_split().unwrap();
    assert_eq!(attribute, 0);

    for (x0, x1) in [(0.1, 0.9), (0.9, 0.1), (0.9, 0.9)] {
        assert!((tree.predict(&[x0, x1]) - f(x0, x1)).abs() < 0.5);
    }
}


#[test]
fn the_bound_shrinks_like_one_over_sqrt_n() {
    let b100 = hoeffding_bound(1.0, 100.0, 0.05);
    let b400 = hoeffding_bound(1.0, 400.0, 0.05);
    assert!((b100 / b400 - 2.0).abs() < 1e-12);
    assert!((hoeffding_bound(2.0, 100.0, 0.05) - 2.0 * b100).abs() < 1e-12);
}


fn mean_abs_error<F>(tree: &IncrementalTree, f: F, rng: &mut StdRng) -> f64
    where F: Fn(f64, f64) -> f64
{
    (0..100)
        .map(|_| {
            let (x0, x1) = (rng.gen::<f64>(), rng.gen::<f64>());
            (tree.predict(&[x0, x1]) - f(x0, x1)).abs()
        })
        .sum::<f64>() / 100.0
}


#[test]
fn perceptron_leaves_fit_a_plane() {
    let f = |x0: f64, x1: f64| 3.0 * x0 + 7.0 * x1 + 2.0;
    let grow = |leaf_model| {
        let learner = HoeffdingTreeLearner::new()
            .criterion(0.01, 0.05, IncrementalSplittingCriterion::Null)
            .unwrap()
            .leaf_model(leaf_model)
            .unwrap();
        let mut tree = learner.new_tree(2);
        let mut rng = StdRng::seed_from_u64(21);
        for _ in 0..2_000 {
            let (x0, x1) = (rng.gen::<f64>(), rng.gen::<f64>());
            learner.add_training_sample(&mut tree, &[x0, x1], f(x0, x1))
                .unwrap();
        }
        tree
    };
    let linear = grow(LeafModel::perceptron());
    let constant = grow(LeafModel::Mean);
    assert_eq!(linear.n_splits(), 0);

    let mut rng = StdRng::seed_from_u64(22);
    let linear_error = mean_abs_error(&linear, f, &mut rng);
    let constant_error = mean_abs_error(&constant, f, &mut rng);
    assert!(linear_error < 0.2, "{linear_error}");
    assert!(constant_error > 1.0, "{constant_error}");
}


#[test]
fn the_chow_test_splits_at_the_break() {
    let learner = HoeffdingTreeLearner::new()
        .quandt_andrews(2, 0.0)
        .unwrap();
    let mut tree = learner.new_tree(2);

    let mut rng = StdRng::seed_from_u64(23);
    let normal = Normal::new(0.0, 0.1).unwrap();
    // One chunk of examples.
    for _ in 0..50 {
        let (x0, x1) = (rng.gen::<f64>(), rng.gen::<f64>());
        let y = if x0 <= 0.5 { 0.0 } else { 5.0 };
        learner.add_training_sample(&mut tree, &[x0, x1], y + normal.sample(&mut rng))
            .unwrap();
    }
    let (attribute, threshold) = tree.root_split().unwrap();
    assert_eq!(attribute, 0);
    assert!((0.3..0.7).contains(&threshold));
}
