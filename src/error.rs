//! Errors reported while reading data or configuring a learner.
//! The learning loops never fail once a learner has been built.
use thiserror::Error;


/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;


/// Configuration, schema and I/O errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A column name that does not exist in the table.
    #[error("the column named `{0}` does not exist")]
    UnknownColumn(String),

    /// Two columns share the same name.
    #[error("the column named `{0}` appears more than once")]
    DuplicateColumn(String),

    /// A column whose length differs from the other columns.
    #[error("the column `{name}` has {got} rows, expected {expected}")]
    ColumnLength {
        /// Name of the offending column.
        name: String,
        /// Number of rows in the offending column.
        got: usize,
        /// Number of rows of the table.
        expected: usize,
    },

    /// A column type that cannot be used for the requested role.
    #[error("the column `{name}` cannot be used {role}")]
    UnsupportedColumn {
        /// Name of the offending column.
        name: String,
        /// What the column was asked to do.
        role: &'static str,
    },

    /// A supervision value is missing.
    #[error("the target column `{name}` has a missing value at row {row}")]
    MissingTarget {
        /// Name of the target column.
        name: String,
        /// Row holding the missing value.
        row: usize,
    },

    /// `build()` was called before the target column was chosen.
    #[error("no target column was specified")]
    NoTarget,

    /// A learner parameter outside its domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human readable description of the constraint.
        reason: String,
    },

    /// A malformed input file.
    #[error("parse error at line {line}: {reason}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// Description.
        reason: String,
    },

    /// JSON (de)serialization failure.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// An error raised by `polars`.
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),

    /// An I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}


impl Error {
    pub(crate) fn invalid<S: Into<String>>(name: &'static str, reason: S)
        -> Self
    {
        Self::InvalidParameter { name, reason: reason.into() }
    }
}
