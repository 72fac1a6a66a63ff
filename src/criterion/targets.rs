use serde::{Serialize, Deserialize};

use crate::error::{Error, Result};
use crate::sample::{Column, ColumnKind, IndexSet};


/// The supervision column in a form the criteria can read in `O(1)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    /// A real-valued target.
    Numeric(Vec<f64>),
    /// A class label target.
    Labels {
        /// Class code of each row.
        labels: Vec<u32>,
        /// Class names, indexed by code.
        names: Vec<String>,
    },
}


/// The prediction stored in a leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Vote {
    /// Weighted mean of a numeric target.
    Value(f64),
    /// Weighted class proportions.
    Distribution(Vec<f64>),
}


impl Vote {
    /// A scalar summary of this vote:
    /// the value itself, or the code of the most probable class.
    pub fn value(&self) -> f64 {
        match self {
            Self::Value(value) => *value,
            Self::Distribution(_) => {
                self.class().map_or(f64::NAN, |c| c as f64)
            },
        }
    }


    /// The most probable class. Ties go to the smallest code.
    pub fn class(&self) -> Option<usize> {
        let Self::Distribution(probabilities) = self else {
            return None;
        };
        probabilities.iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (k, &p)| {
                match best {
                    Some((_, q)) if q >= p => best,
                    _ => Some((k, p)),
                }
            })
            .map(|(k, _)| k)
    }
}


impl Targets {
    /// Reads `column` as a supervision column.
    /// Numeric columns give a numeric target,
    /// boolean and categorical columns give class labels.
    pub fn from_column(column: &Column) -> Result<Self> {
        let n_rows = column.len();
        let missing = (0..n_rows).find(|&row| column.is_missing(row));
        if let Some(row) = missing {
            return Err(Error::MissingTarget {
                name: column.name().to_string(),
                row,
            });
        }

        let targets = match column.kind() {
            ColumnKind::Numeric => {
                let values = (0..n_rows)
                    .filter_map(|row| column.numeric(row))
                    .collect();
                Self::Numeric(values)
            },
            ColumnKind::Boolean => {
                let labels = (0..n_rows)
                    .map(|row| column.boolean(row).map_or(0, u32::from))
                    .collect();
                let names = vec!["false".to_string(), "true".to_string()];
                Self::Labels { labels, names }
            },
            ColumnKind::Categorical => {
                let labels = (0..n_rows)
                    .map(|row| column.category(row).unwrap_or(0))
                    .collect();
                let names = column.categories().to_vec();
                Self::Labels { labels, names }
            },
            ColumnKind::Object => {
                return Err(Error::UnsupportedColumn {
                    name: column.name().to_string(),
                    role: "as a target",
                });
            },
        };
        Ok(targets)
    }


    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        match self {
            Self::Numeric(values) => values.len(),
            Self::Labels { labels, .. } => labels.len(),
        }
    }


    /// Number of classes, `0` for a numeric target.
    pub fn n_classes(&self) -> usize {
        match self {
            Self::Numeric(_) => 0,
            Self::Labels { names, .. } => names.len(),
        }
    }


    /// Returns `true` for class label targets.
    #[inline]
    pub fn is_labels(&self) -> bool {
        matches!(self, Self::Labels { .. })
    }


    /// Returns `true` if every row of `indices` has the same target.
    /// Sets with at most one row are constant.
    pub fn is_constant(&self, indices: &IndexSet) -> bool {
        let rows = indices.as_slice();
        let Some((&first, rest)) = rows.split_first() else {
            return true;
        };
        match self {
            Self::Numeric(values) => {
                rest.iter().all(|&row| values[row] == values[first])
            },
            Self::Labels { labels, .. } => {
                rest.iter().all(|&row| labels[row] == labels[first])
            },
        }
    }


    /// The vote of `indices`: the weighted mean of a numeric target,
    /// or the weighted class proportions of a label target.
    pub fn vote(&self, weights: Option<&[f64]>, indices: &IndexSet) -> Vote {
        let weight = |row: usize| weights.map_or(1.0, |w| w[row]);
        match self {
            Self::Numeric(values) => {
                let (sum, total) = indices.iter()
                    .fold((0.0, 0.0), |(s, t), row| {
                        let w = weight(row);
                        (s + w * values[row], t + w)
                    });
                let mean = if total > 0.0 { sum / total } else { 0.0 };
                Vote::Value(mean)
            },
            Self::Labels { labels, names } => {
                let mut counts = vec![0.0; names.len()];
                indices.iter()
                    .for_each(|row| counts[labels[row] as usize] += weight(row));
                let total = counts.iter().sum::<f64>();
                if total > 0.0 {
                    counts.iter_mut().for_each(|c| *c /= total);
                } else if !counts.is_empty() {
                    let uniform = 1.0 / counts.len() as f64;
                    counts.iter_mut().for_each(|c| *c = uniform);
                }
                Vote::Distribution(counts)
            },
        }
    }
}
