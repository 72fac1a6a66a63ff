//! Budgeted selection of a condition.
//! Both learners pick the best of many candidates while scoring them on
//! growing subsets of the node's rows, so that the total number of
//! `candidate × row` evaluations stays within
//! `relative_budget × #rows`.
//! The budget includes the final scoring of the winner on every row.
use rand::prelude::*;

use crate::error::{Error, Result};
use crate::sample::IndexSet;

mod laminating;
mod bandit;

pub use laminating::{LaminatingWeakLearner, LaminatingPlan};
pub use bandit::{BanditBasedWeakLearner, ArmPool};


/// The number of evaluations allowed for `n_rows` rows.
#[inline]
pub(crate) fn evaluation_budget(relative_budget: f64, n_rows: usize)
    -> usize
{
    (relative_budget * n_rows as f64).floor() as usize
}


/// A random order of the rows of `indices`.
/// Prefixes of this order are the nested subsamples.
pub(crate) fn shuffled_rows<R: Rng>(indices: &IndexSet, rng: &mut R)
    -> Vec<usize>
{
    let mut order = indices.as_slice().to_vec();
    order.shuffle(rng);
    order
}


/// The first `size` rows of `order`, or all of `indices`
/// once `size` covers them.
pub(crate) fn prefix(order: &[usize], size: usize, indices: &IndexSet)
    -> IndexSet
{
    if size >= order.len() {
        return indices.clone();
    }
    IndexSet::from_rows(order[..size].iter().copied())
}


pub(crate) fn check_relative_budget(relative_budget: f64) -> Result<()> {
    if relative_budget.is_finite() && relative_budget >= 0.0 {
        Ok(())
    } else {
        let reason = format!(
            "the relative budget must be a finite non-negative number. \
             got {relative_budget}."
        );
        Err(Error::invalid("relative_budget", reason))
    }
}
