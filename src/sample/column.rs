//! Typed columns.
//! Every column type can represent a missing value
//! that is distinct from all valid values.
use fixedbitset::FixedBitSet;

use std::collections::HashMap;
use std::fmt;


/// The type of a column, without its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    /// Dense `f64` values. `NaN` is missing.
    Numeric,
    /// Boolean values with a validity mask.
    Boolean,
    /// Enumeration values encoded as category codes.
    Categorical,
    /// Arbitrary objects kept as text. Never splittable.
    Object,
}


impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Categorical => "categorical",
            Self::Object => "object",
        };
        write!(f, "{name}")
    }
}


/// Column storage.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Dense values, `NaN` for missing entries.
    Numeric(Vec<f64>),
    /// `values[i]` is meaningful only when `present[i]` is set.
    Boolean {
        /// Bit `i` holds the value of row `i`.
        values: FixedBitSet,
        /// Bit `i` is set iff row `i` is not missing.
        present: FixedBitSet,
    },
    /// Codes index into `categories`.
    Categorical {
        /// Per-row category code.
        codes: Vec<Option<u32>>,
        /// Category labels, in order of first appearance.
        categories: Vec<String>,
    },
    /// Generic objects.
    Object(Vec<Option<String>>),
}


/// A named column of a [`Table`](crate::Table).
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}


impl Column {
    /// A numeric column. `NaN` entries are missing.
    pub fn from_numeric<S: ToString>(name: S, values: Vec<f64>) -> Self {
        Self { name: name.to_string(), data: ColumnData::Numeric(values) }
    }


    /// A boolean column.
    pub fn from_booleans<S, I>(name: S, values: I) -> Self
        where S: ToString,
              I: IntoIterator<Item = Option<bool>>,
    {
        let values = values.into_iter().collect::<Vec<_>>();
        let n_rows = values.len();

        let mut bits = FixedBitSet::with_capacity(n_rows);
        let mut present = FixedBitSet::with_capacity(n_rows);
        for (row, value) in values.into_iter().enumerate() {
            if let Some(value) = value {
                present.insert(row);
                bits.set(row, value);
            }
        }

        let data = ColumnData::Boolean { values: bits, present };
        Self { name: name.to_string(), data }
    }


    /// A categorical column. Categories are numbered
    /// in order of first appearance.
    pub fn categorical<S, I, T>(name: S, values: I) -> Self
        where S: ToString,
              I: IntoIterator<Item = Option<T>>,
              T: AsRef<str>,
    {
        let mut lookup = HashMap::new();
        let mut categories = Vec::new();
        let codes = values.into_iter()
            .map(|value| {
                let value = value?;
                let value = value.as_ref();
                let code = *lookup.entry(value.to_string())
                    .or_insert_with(|| {
                        categories.push(value.to_string());
                        categories.len() as u32 - 1
                    });
                Some(code)
            })
            .collect::<Vec<_>>();

        let data = ColumnData::Categorical { codes, categories };
        Self { name: name.to_string(), data }
    }


    /// A column of generic objects.
    pub fn object<S: ToString>(name: S, values: Vec<Option<String>>)
        -> Self
    {
        Self { name: name.to_string(), data: ColumnData::Object(values) }
    }


    /// The column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }


    /// The storage of this column.
    #[inline]
    pub fn data(&self) -> &ColumnData {
        &self.data
    }


    /// The type of this column.
    pub fn kind(&self) -> ColumnKind {
        match self.data {
            ColumnData::Numeric(_) => ColumnKind::Numeric,
            ColumnData::Boolean { .. } => ColumnKind::Boolean,
            ColumnData::Categorical { .. } => ColumnKind::Categorical,
            ColumnData::Object(_) => ColumnKind::Object,
        }
    }


    /// Number of rows.
    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Boolean { present, .. } => present.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
            ColumnData::Object(values) => values.len(),
        }
    }


    /// Returns `true` if the column has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /// Returns `true` if the value at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Numeric(values) => values[row].is_nan(),
            ColumnData::Boolean { present, .. } => !present.contains(row),
            ColumnData::Categorical { codes, .. } => codes[row].is_none(),
            ColumnData::Object(values) => values[row].is_none(),
        }
    }


    /// The value at `row` as a number.
    /// Booleans read as `0` / `1`;
    /// categorical and object columns have no numeric value.
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Numeric(values) => {
                let value = values[row];
                (!value.is_nan()).then_some(value)
            },
            ColumnData::Boolean { .. } => {
                self.boolean(row).map(|b| if b { 1.0 } else { 0.0 })
            },
            _ => None,
        }
    }


    /// The value at `row` as a boolean, for boolean columns.
    pub fn boolean(&self, row: usize) -> Option<bool> {
        match &self.data {
            ColumnData::Boolean { values, present } => {
                present.contains(row).then(|| values.contains(row))
            },
            _ => None,
        }
    }


    /// The category code at `row`, for categorical columns.
    pub fn category(&self, row: usize) -> Option<u32> {
        match &self.data {
            ColumnData::Categorical { codes, .. } => codes[row],
            _ => None,
        }
    }


    /// Category labels of a categorical column, empty otherwise.
    pub fn categories(&self) -> &[String] {
        match &self.data {
            ColumnData::Categorical { categories, .. } => categories,
            _ => &[],
        }
    }


    /// Renders the value at `row` for reports.
    pub fn display_value(&self, row: usize) -> String {
        if self.is_missing(row) {
            return "?".to_string();
        }
        match &self.data {
            ColumnData::Numeric(values) => values[row].to_string(),
            ColumnData::Boolean { values, .. } => {
                values.contains(row).to_string()
            },
            ColumnData::Categorical { codes, categories } => {
                codes[row].map(|c| categories[c as usize].clone())
                    .unwrap_or_default()
            },
            ColumnData::Object(values) => {
                values[row].clone().unwrap_or_default()
            },
        }
    }
}
