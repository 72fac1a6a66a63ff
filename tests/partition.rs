use minitrees::prelude::*;
use minitrees::tree::{dispatch, Node};

use proptest::prelude::*;


fn table_from(xs: &[Option<f64>], ys: &[f64]) -> Table {
    let x = xs.iter().map(|x| x.unwrap_or(f64::NAN)).collect();
    Table::new(vec![
        Column::from_numeric("x", x),
        Column::from_numeric("y", ys.to_vec()),
    ])
    .unwrap()
}


/// Checks every test node of `node`, reached by `indices`.
fn check_partitions(table: &Table, node: &Node, indices: &IndexSet) {
    let Node::Test(test) = node else { return; };
    let parts = dispatch(table, test.condition(), indices);

    let total = parts.iter().map(IndexSet::len).sum::<usize>();
    assert_eq!(total, indices.len());
    let mut union = parts.iter()
        .flat_map(|part| part.iter())
        .collect::<Vec<_>>();
    union.sort_unstable();
    union.dedup();
    assert_eq!(union.as_slice(), indices.as_slice());
    for part in &parts {
        assert_ne!(part, indices);
    }

    for (child, part) in test.children().into_iter().zip(&parts) {
        check_partitions(table, child, part);
    }
}


proptest! {
    #[test]
    fn splits_partition_their_rows(
        rows in proptest::collection::vec(
            (proptest::option::weighted(0.8, -10.0..10.0_f64), -5.0..5.0_f64),
            2..80,
        ),
        random in any::<bool>(),
    ) {
        let (xs, ys): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        let table = table_from(&xs, &ys);
        let kind = if random {
            ConditionLearnerKind::RandomSplit
        } else {
            ConditionLearnerKind::Exhaustive
        };
        let mut learner = TreeLearnerBuilder::new(&table)
            .target("y")
            .condition_learner(kind)
            .verbosity(Verbosity::Silent)
            .build()
            .unwrap();
        let tree = learner.learn();
        check_partitions(&table, tree.root(), &IndexSet::full(table.n_rows()));
    }


    #[test]
    fn threshold_search_is_repeatable(
        xs in proptest::collection::vec(0..6_i32, 2..40),
    ) {
        let xs = xs.into_iter().map(|x| Some(f64::from(x))).collect::<Vec<_>>();
        let ys = (0..xs.len()).map(|i| (i % 3) as f64).collect::<Vec<_>>();
        let table = table_from(&xs, &ys);

        let grow = || {
            TreeLearnerBuilder::new(&table)
                .target("y")
                .max_depth(1)
                .verbosity(Verbosity::Silent)
                .build()
                .unwrap()
                .learn()
        };
        prop_assert_eq!(grow(), grow());
    }
}
