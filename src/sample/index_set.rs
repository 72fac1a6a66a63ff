use fixedbitset::FixedBitSet;
use serde::{Serialize, Deserialize};

use std::sync::Arc;


/// A sorted, duplicate-free set of row indices.
/// Cloning an `IndexSet` is cheap; the rows are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexSet {
    rows: Arc<[usize]>,
}


impl IndexSet {
    /// All rows of a table with `n_rows` rows.
    pub fn full(n_rows: usize) -> Self {
        Self { rows: (0..n_rows).collect() }
    }


    /// The empty set.
    pub fn empty() -> Self {
        Self { rows: Arc::from(Vec::new()) }
    }


    /// Builds a set from arbitrary rows.
    /// The rows are sorted and duplicates are dropped.
    pub fn from_rows<I>(rows: I) -> Self
        where I: IntoIterator<Item = usize>
    {
        let mut rows = rows.into_iter().collect::<Vec<_>>();
        rows.sort_unstable();
        rows.dedup();
        Self { rows: rows.into() }
    }


    /// Builds a set from rows that are already sorted and unique.
    pub(crate) fn from_sorted_unchecked(rows: Vec<usize>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0] < w[1]));
        Self { rows: rows.into() }
    }


    /// Number of rows in the set.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }


    /// Returns `true` if the set has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }


    /// The rows, in increasing order.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.rows
    }


    /// Iterates the rows in increasing order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.rows.iter().copied()
    }


    /// Returns `true` if `row` belongs to the set.
    #[inline]
    pub fn contains(&self, row: usize) -> bool {
        self.rows.binary_search(&row).is_ok()
    }


    /// Returns `true` if the set holds every row of a table
    /// with `n_rows` rows.
    /// Since rows are unique and in `[0, n_rows)`,
    /// comparing the lengths decides the equality.
    #[inline]
    pub fn is_full(&self, n_rows: usize) -> bool {
        debug_assert!(self.rows.last().map_or(true, |&r| r < n_rows));
        self.rows.len() == n_rows
    }


    /// A bitset of length `n_rows` whose bits are the rows of this set.
    pub fn membership(&self, n_rows: usize) -> FixedBitSet {
        let mut bits = FixedBitSet::with_capacity(n_rows);
        self.rows.iter().for_each(|&row| bits.insert(row));
        bits
    }
}


impl Default for IndexSet {
    fn default() -> Self {
        Self::empty()
    }
}


impl FromIterator<usize> for IndexSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_rows(iter)
    }
}


impl<'a> IntoIterator for &'a IndexSet {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;
    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_unique() {
        let set = IndexSet::from_rows(vec![5, 1, 3, 1, 5]);
        assert_eq!(set.as_slice(), &[1, 3, 5]);
        assert!(set.contains(3));
        assert!(!set.contains(2));
    }


    #[test]
    fn full_set_identity() {
        let full = IndexSet::full(4);
        assert!(full.is_full(4));

        let partial = IndexSet::from_rows(vec![0, 1, 2]);
        assert!(!partial.is_full(4));

        let bits = partial.membership(4);
        assert!(bits.contains(2));
        assert!(!bits.contains(3));
    }
}
