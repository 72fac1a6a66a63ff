use minitrees::prelude::*;
use minitrees::criterion::{Targets, VarianceReduction};

use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use std::sync::Arc;


/// `n_noise` noise inputs and one input `signal` that determines `y`.
fn noisy_table(n_rows: usize, n_noise: usize, seed: u64) -> Table {
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();

    let mut columns = (0..n_noise)
        .map(|k| {
            let values = (0..n_rows).map(|_| normal.sample(&mut rng)).collect();
            Column::from_numeric(format!("noise{k}"), values)
        })
        .collect::<Vec<_>>();

    let signal = (0..n_rows).map(|_| rng.gen::<f64>()).collect::<Vec<_>>();
    let y = signal.iter()
        .map(|&s| (if s > 0.5 { 5.0 } else { -5.0 }) + 0.1 * normal.sample(&mut rng))
        .collect();
    columns.push(Column::from_numeric("signal", signal));
    columns.push(Column::from_numeric("y", y));
    Table::new(columns).unwrap()
}


fn candidates(table: &Table) -> Vec<Expression> {
    (0..table.n_columns() - 1)
        .map(|column| Expression::variable(table, column).unwrap())
        .collect()
}


fn bound_criterion(table: &Table) -> VarianceReduction {
    let target = table.index_of("y").unwrap();
    let targets = Targets::from_column(table.column(target)).unwrap();
    let mut criterion = VarianceReduction::default();
    criterion.configure(Arc::new(targets), None, IndexSet::full(table.n_rows()));
    criterion
}


fn signal_input(scored: &minitrees::condition_learner::ScoredCondition) -> bool {
    scored.condition.to_string().starts_with("signal >= ")
}


#[test]
fn laminating_budget_is_monotone_and_respected() {
    let table = noisy_table(200, 15, 1);
    let candidates = candidates(&table);
    let n_rows = table.n_rows();

    let mut previous = 0;
    for budget in [1.0, 2.0, 3.0, 5.0, 8.0, 12.0, 16.0, 20.0, 40.0] {
        let mut learner = LaminatingWeakLearner::new(budget, 5, 17)
            .unwrap()
            .verbosity(Verbosity::Silent);
        let mut criterion = bound_criterion(&table);
        let best = learner.learn(&table, &mut criterion, &candidates);

        let evaluations = learner.evaluations();
        assert!(evaluations as f64 <= budget * n_rows as f64, "{budget}");
        assert!(evaluations >= previous, "{budget}");
        assert!(best.is_some() || evaluations == 0);
        previous = evaluations;
    }
}


#[test]
fn bandit_budget_is_monotone_and_respected() {
    let table = noisy_table(200, 15, 2);
    let candidates = candidates(&table);
    let n_rows = table.n_rows();

    let mut previous = 0;
    for budget in [0.5, 1.0, 1.5, 2.0, 4.0, 7.0, 11.0, 16.0, 30.0] {
        let mut learner = BanditBasedWeakLearner::new(budget, 0.05, 23)
            .unwrap()
            .verbosity(Verbosity::Silent);
        let mut criterion = bound_criterion(&table);
        learner.learn(&table, &mut criterion, &candidates);

        let evaluations = learner.evaluations();
        assert!(evaluations as f64 <= budget * n_rows as f64, "{budget}");
        assert!(evaluations >= previous, "{budget}");
        previous = evaluations;
    }
}


#[test]
fn budgeted_learners_find_the_signal() {
    let table = noisy_table(400, 10, 3);
    let candidates = candidates(&table);

    let mut laminating = LaminatingWeakLearner::new(8.0, 20, 5)
        .unwrap()
        .verbosity(Verbosity::Silent);
    let mut criterion = bound_criterion(&table);
    let best = laminating.learn(&table, &mut criterion, &candidates).unwrap();
    assert!(signal_input(&best), "{}", best.condition);

    let mut bandit = BanditBasedWeakLearner::new(8.0, 0.1, 5)
        .unwrap()
        .verbosity(Verbosity::Silent);
    let mut criterion = bound_criterion(&table);
    let best = bandit.learn(&table, &mut criterion, &candidates).unwrap();
    assert!(signal_input(&best), "{}", best.condition);

    // The winner is scored on every row, as the exhaustive search does.
    let mut exhaustive = ExhaustiveConditionLearner::new();
    let mut criterion = bound_criterion(&table);
    let reference = exhaustive.learn(&table, &mut criterion, &candidates).unwrap();
    assert_eq!(best, reference);
}


#[test]
fn the_criterion_stays_bound_to_the_node() {
    let table = noisy_table(100, 4, 4);
    let candidates = candidates(&table);
    let full = IndexSet::full(table.n_rows());

    let mut laminating = LaminatingWeakLearner::new(3.0, 5, 0).unwrap();
    let mut criterion = bound_criterion(&table);
    laminating.learn(&table, &mut criterion, &candidates);
    assert_eq!(criterion.indices(), &full);

    let mut bandit = BanditBasedWeakLearner::new(3.0, 0.2, 0).unwrap();
    let mut criterion = bound_criterion(&table);
    bandit.learn(&table, &mut criterion, &candidates);
    assert_eq!(criterion.indices(), &full);
}
