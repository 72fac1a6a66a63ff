//! Conditions and numeric inputs evaluated on table rows.
//! A tree node stores one [`Expression`] whose boolean value
//! routes each row to the pass, fail or missing child.
use serde::{Serialize, Deserialize};

use std::fmt;

use crate::error::{Error, Result};
use crate::sample::{ColumnKind, Table};

mod sampler;
pub use sampler::CandidateSampler;


/// The type produced by an [`Expression`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpressionType {
    /// A real value; split with a threshold.
    Numeric,
    /// A truth value; used directly as a condition.
    Boolean,
}


/// An expression over the columns of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// The raw value of a numeric or boolean column.
    Variable {
        /// Column position in the table.
        column: usize,
        /// Column name, kept for reports.
        name: String,
        /// Output type of the column.
        output: ExpressionType,
    },
    /// `input >= threshold`.
    /// Rows with `input < threshold` fail the test.
    Stump {
        /// A numeric expression.
        input: Box<Expression>,
        /// The split point.
        threshold: f64,
    },
    /// `column == category` for a categorical column.
    Equals {
        /// Column position in the table.
        column: usize,
        /// Column name, kept for reports.
        name: String,
        /// Category code.
        category: u32,
        /// Category label.
        label: String,
    },
    /// A constant truth value. Never a useful split.
    Constant(bool),
}


impl Expression {
    /// A variable reading column `column` of `table`.
    /// Categorical and object columns have no scalar value
    /// and are rejected.
    pub fn variable(table: &Table, column: usize) -> Result<Self> {
        let col = table.column(column);
        let output = match col.kind() {
            ColumnKind::Numeric => ExpressionType::Numeric,
            ColumnKind::Boolean => ExpressionType::Boolean,
            _ => {
                return Err(Error::UnsupportedColumn {
                    name: col.name().to_string(),
                    role: "as a scalar variable",
                });
            },
        };
        let name = col.name().to_string();
        Ok(Self::Variable { column, name, output })
    }


    /// Wraps a numeric expression into a threshold test.
    pub fn stump(input: Expression, threshold: f64) -> Self {
        debug_assert_eq!(input.output_type(), ExpressionType::Numeric);
        Self::Stump { input: Box::new(input), threshold }
    }


    /// Every candidate condition that column `column` offers.
    /// Numeric and boolean columns yield their variable,
    /// categorical columns yield one equality test per category
    /// (a single one for two categories).
    pub fn candidates_for(table: &Table, column: usize)
        -> Result<Vec<Self>>
    {
        let col = table.column(column);
        match col.kind() {
            ColumnKind::Numeric | ColumnKind::Boolean => {
                Ok(vec![Self::variable(table, column)?])
            },
            ColumnKind::Categorical => {
                let categories = col.categories();
                let n_tests = if categories.len() == 2 {
                    1
                } else {
                    categories.len()
                };
                let tests = categories.iter()
                    .take(n_tests)
                    .enumerate()
                    .map(|(code, label)| Self::Equals {
                        column,
                        name: col.name().to_string(),
                        category: code as u32,
                        label: label.clone(),
                    })
                    .collect();
                Ok(tests)
            },
            ColumnKind::Object => {
                Err(Error::UnsupportedColumn {
                    name: col.name().to_string(),
                    role: "as a split input",
                })
            },
        }
    }


    /// The output type of this expression.
    pub fn output_type(&self) -> ExpressionType {
        match self {
            Self::Variable { output, .. } => *output,
            _ => ExpressionType::Boolean,
        }
    }


    /// Returns `true` for `Expression::Constant`.
    #[inline]
    pub fn is_constant(&self) -> bool {
        matches!(self, Self::Constant(_))
    }


    /// The table column this expression reads, if any.
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Variable { column, .. }
            | Self::Equals { column, .. } => Some(*column),
            Self::Stump { input, .. } => input.column(),
            Self::Constant(_) => None,
        }
    }


    /// The name of the column this expression reads, if any.
    pub fn input_name(&self) -> Option<&str> {
        match self {
            Self::Variable { name, .. }
            | Self::Equals { name, .. } => Some(name),
            Self::Stump { input, .. } => input.input_name(),
            Self::Constant(_) => None,
        }
    }


    /// Numeric value at `row`.
    /// `None` if the value is missing or the expression is not numeric.
    pub fn evaluate_numeric(&self, table: &Table, row: usize)
        -> Option<f64>
    {
        match self {
            Self::Variable { column, output: ExpressionType::Numeric, .. } => {
                table.column(*column).numeric(row)
            },
            _ => None,
        }
    }


    /// Truth value at `row`.
    /// `None` if an input is missing or has the wrong type.
    pub fn evaluate_boolean(&self, table: &Table, row: usize)
        -> Option<bool>
    {
        match self {
            Self::Variable { column, output: ExpressionType::Boolean, .. } => {
                table.column(*column).boolean(row)
            },
            Self::Variable { .. } => None,
            Self::Stump { input, threshold } => {
                input.evaluate_numeric(table, row)
                    .map(|value| value >= *threshold)
            },
            Self::Equals { column, category, .. } => {
                table.column(*column).category(row)
                    .map(|code| code == *category)
            },
            Self::Constant(value) => Some(*value),
        }
    }
}


impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable { name, .. } => write!(f, "{name}"),
            Self::Stump { input, threshold } => {
                write!(f, "{input} >= {threshold}")
            },
            Self::Equals { name, label, .. } => {
                write!(f, "{name} == {label}")
            },
            Self::Constant(value) => write!(f, "{value}"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Column;

    fn table() -> Table {
        let columns = vec![
            Column::from_numeric("x", vec![1.0, 5.0, f64::NAN]),
            Column::categorical("c", vec![Some("a"), Some("b"), Some("c")]),
            Column::from_booleans("b", vec![Some(true), None, Some(false)]),
        ];
        Table::new(columns).unwrap()
    }


    #[test]
    fn stump_routes_missing_to_none() {
        let table = table();
        let x = Expression::variable(&table, 0).unwrap();
        let stump = Expression::stump(x, 3.0);
        assert_eq!(stump.evaluate_boolean(&table, 0), Some(false));
        assert_eq!(stump.evaluate_boolean(&table, 1), Some(true));
        assert_eq!(stump.evaluate_boolean(&table, 2), None);
        assert_eq!(stump.input_name(), Some("x"));
    }


    #[test]
    fn type_errors_are_missing() {
        let table = table();
        let x = Expression::variable(&table, 0).unwrap();
        assert_eq!(x.evaluate_boolean(&table, 0), None);

        let b = Expression::variable(&table, 2).unwrap();
        assert_eq!(b.output_type(), ExpressionType::Boolean);
        assert_eq!(b.evaluate_numeric(&table, 0), None);
        assert_eq!(b.evaluate_boolean(&table, 1), None);
    }


    #[test]
    fn categorical_candidates() {
        let table = table();
        let tests = Expression::candidates_for(&table, 1).unwrap();
        assert_eq!(tests.len(), 3);
        assert_eq!(tests[1].evaluate_boolean(&table, 1), Some(true));
        assert_eq!(tests[1].evaluate_boolean(&table, 0), Some(false));
        assert_eq!(format!("{}", tests[2]), "c == c");
        assert!(Expression::variable(&table, 1).is_err());
    }
}
