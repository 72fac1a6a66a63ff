use std::collections::HashMap;

use crate::error::{Error, Result};
use super::column::{Column, ColumnKind};


/// A columnar dataset.
/// All columns have the same number of rows.
/// Learners read rows through [`IndexSet`](crate::IndexSet)s
/// and never modify a `Table`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub(super) name_to_index: HashMap<String, usize>,
    pub(super) columns: Vec<Column>,
    pub(super) n_rows: usize,
}


impl Table {
    /// Construct a table from columns of equal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);

        let mut name_to_index = HashMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            if column.len() != n_rows {
                return Err(Error::ColumnLength {
                    name: column.name().to_string(),
                    got: column.len(),
                    expected: n_rows,
                });
            }
            let name = column.name().to_string();
            if name_to_index.insert(name.clone(), i).is_some() {
                return Err(Error::DuplicateColumn(name));
            }
        }

        Ok(Self { name_to_index, columns, n_rows })
    }


    /// Returns `(n_rows, n_columns)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.columns.len())
    }


    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }


    /// Number of columns.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }


    /// All columns, in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }


    /// The column at position `index`.
    #[inline]
    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }


    /// Position of the column named `name`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.name_to_index.get(name)
            .copied()
            .ok_or_else(|| Error::UnknownColumn(name.to_string()))
    }


    /// The column named `name`.
    pub fn column_by_name(&self, name: &str) -> Result<&Column> {
        self.index_of(name).map(|i| &self.columns[i])
    }


    /// Columns that can be used as split inputs.
    pub(crate) fn splittable_columns(&self) -> impl Iterator<Item = usize> + '_ {
        self.columns.iter()
            .enumerate()
            .filter(|(_, c)| c.kind() != ColumnKind::Object)
            .map(|(i, _)| i)
    }
}
