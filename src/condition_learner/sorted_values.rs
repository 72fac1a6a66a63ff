use std::collections::HashMap;
use std::sync::Arc;

use crate::expression::{Expression, ExpressionType};
use crate::sample::{IndexSet, Table};


/// `(row, value)` pairs in increasing order of value,
/// ties in increasing order of row.
/// Rows whose value is missing are left out.
pub type SortedValues = Arc<[(usize, f64)]>;


/// Sorted values of numeric expressions over a whole table.
///
/// One entry is kept per numeric column, computed on first use.
/// The values of a large subset of rows are obtained by filtering the
/// full list with the membership of the subset,
/// so an entry is valid for every [`IndexSet`] of the table.
/// Subsets small enough to sort in less than a scan of the table
/// are sorted directly and never touch the cache.
/// Entries live until [`clear`](SortedValuesCache::clear).
#[derive(Debug, Default)]
pub struct SortedValuesCache {
    full: HashMap<usize, SortedValues>,
    hits: usize,
    misses: usize,
}


impl SortedValuesCache {
    /// Construct an empty cache.
    pub fn new() -> Self {
        Self::default()
    }


    /// Sorted values of `expression` restricted to `indices`.
    pub fn sorted_values(
        &mut self,
        table: &Table,
        expression: &Expression,
        indices: &IndexSet,
    ) -> SortedValues
    {
        let column = match expression {
            Expression::Variable {
                column, output: ExpressionType::Numeric, ..
            } => *column,
            _ => return sort_rows(table, expression, indices.iter()),
        };
        let n_rows = table.n_rows();
        if sorting_is_cheaper(indices.len(), n_rows) {
            return sort_rows(table, expression, indices.iter());
        }

        let full = match self.full.get(&column) {
            Some(full) => {
                self.hits += 1;
                full.clone()
            },
            None => {
                self.misses += 1;
                let full = sort_rows(table, expression, 0..n_rows);
                self.full.insert(column, full.clone());
                full
            },
        };

        if indices.is_full(n_rows) {
            return full;
        }
        let members = indices.membership(n_rows);
        full.iter()
            .filter(|(row, _)| members.contains(*row))
            .copied()
            .collect()
    }


    /// Number of cached expressions.
    pub fn len(&self) -> usize {
        self.full.len()
    }


    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }


    /// Returns `(hits, misses)` since the last `clear`.
    pub fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }


    /// Drops every entry.
    pub fn clear(&mut self) {
        self.full.clear();
        self.hits = 0;
        self.misses = 0;
    }
}


/// `n log n` comparisons against a scan of the table.
#[inline]
fn sorting_is_cheaper(n_indices: usize, n_rows: usize) -> bool {
    let log = (usize::BITS - n_indices.leading_zeros()) as usize;
    n_indices.saturating_mul(log) < n_rows
}


fn sort_rows<I>(table: &Table, expression: &Expression, rows: I)
    -> SortedValues
    where I: Iterator<Item = usize>
{
    let mut values = rows
        .filter_map(|row| {
            expression.evaluate_numeric(table, row).map(|v| (row, v))
        })
        .collect::<Vec<_>>();
    values.sort_by(|(r1, v1), (r2, v2)| {
        v1.total_cmp(v2).then(r1.cmp(r2))
    });
    values.into()
}
