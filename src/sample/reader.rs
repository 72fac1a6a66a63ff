//! Constructors of `Table` from external sources.
use polars::prelude::*;
use rayon::prelude::*;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use super::column::Column;
use super::table::Table;


const MISSING_TOKENS: [&str; 3] = ["", "?", "NA"];


impl Table {
    /// Convert a `polars::DataFrame` into a `Table`.
    /// Numeric columns become numeric, boolean columns stay boolean,
    /// and string columns become categorical.
    /// Null entries are missing values.
    pub fn from_dataframe(data: &DataFrame) -> Result<Self> {
        let columns = data.get_columns()
            .par_iter()
            .map(column_from_series)
            .collect::<Result<Vec<_>>>()?;

        Table::new(columns)
    }


    /// Read a comma separated file into a `Table`.
    /// A column whose present cells all parse as `f64` is numeric,
    /// other columns are categorical.
    /// Empty cells, `?` and `NA` are missing values.
    /// Without a header, columns are named `Col. [1]`, `Col. [2]`, ....
    pub fn from_csv<P>(file: P, has_header: bool) -> Result<Self>
        where P: AsRef<Path>,
    {
        let file = File::open(file)?;
        let mut lines = BufReader::new(file).lines();

        let mut names = Vec::new();
        if has_header {
            if let Some(line) = lines.next() {
                names = line?.split(',')
                    .map(|name| name.trim().to_string())
                    .collect::<Vec<_>>();
            }
        }

        let mut cells: Vec<Vec<String>> = Vec::new();
        let first_line = if has_header { 2 } else { 1 };
        for (k, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let row = line.split(',')
                .map(|cell| cell.trim().to_string())
                .collect::<Vec<_>>();

            if names.is_empty() {
                names = (1..=row.len())
                    .map(|i| format!("Col. [{i}]"))
                    .collect();
            }
            if row.len() != names.len() {
                return Err(Error::Parse {
                    line: k + first_line,
                    reason: format!(
                        "expected {} cells, got {}", names.len(), row.len()
                    ),
                });
            }
            if cells.is_empty() {
                cells = vec![Vec::new(); names.len()];
            }
            for (column, cell) in cells.iter_mut().zip(row) {
                column.push(cell);
            }
        }
        if cells.is_empty() {
            cells = vec![Vec::new(); names.len()];
        }

        let columns = names.into_par_iter()
            .zip(cells)
            .map(|(name, cells)| column_from_cells(name, cells))
            .collect::<Vec<_>>();

        Table::new(columns)
    }
}


fn is_missing(cell: &str) -> bool {
    MISSING_TOKENS.contains(&cell)
}


fn column_from_cells(name: String, cells: Vec<String>) -> Column {
    let numbers = cells.iter()
        .map(|cell| {
            if is_missing(cell) {
                Some(f64::NAN)
            } else {
                cell.parse::<f64>().ok()
            }
        })
        .collect::<Option<Vec<_>>>();

    match numbers {
        Some(values) => Column::from_numeric(name, values),
        None => {
            let values = cells.iter()
                .map(|cell| (!is_missing(cell)).then_some(cell.as_str()));
            Column::categorical(name, values)
        },
    }
}


fn column_from_series(series: &Series) -> Result<Column> {
    let name = series.name();
    let dtype = series.dtype();

    if dtype == &DataType::Boolean {
        let values = series.bool()?.into_iter().collect::<Vec<_>>();
        return Ok(Column::from_booleans(name, values));
    }

    if dtype == &DataType::Utf8 {
        let values = series.utf8()?.into_iter().collect::<Vec<_>>();
        return Ok(Column::categorical(name, values));
    }

    if dtype.is_numeric() {
        let series = series.cast(&DataType::Float64)?;
        let values = series.f64()?
            .into_iter()
            .map(|value| value.unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        return Ok(Column::from_numeric(name, values));
    }

    Err(Error::UnsupportedColumn {
        name: name.to_string(),
        role: "as a table column (cast it to a numeric, boolean or utf8 dtype)",
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::ColumnKind;

    #[test]
    fn dataframe_columns_keep_their_type() {
        let x = Series::new("x", &[1_i64, 2, 3]);
        let b = Series::new("b", &[Some(true), None, Some(false)]);
        let s = Series::new("s", &[Some("a"), Some("b"), None]);
        let df = DataFrame::new(vec![x, b, s]).unwrap();

        let table = Table::from_dataframe(&df).unwrap();
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(table.column(0).kind(), ColumnKind::Numeric);
        assert_eq!(table.column(0).numeric(2), Some(3.0));
        assert_eq!(table.column(1).kind(), ColumnKind::Boolean);
        assert_eq!(table.column(1).boolean(1), None);
        assert_eq!(table.column(2).kind(), ColumnKind::Categorical);
        assert!(table.column(2).is_missing(2));
    }


    #[test]
    fn csv_cells_infer_column_types() {
        let x = column_from_cells(
            "x".into(), vec!["1.5".into(), "?".into(), "3".into()],
        );
        assert_eq!(x.kind(), ColumnKind::Numeric);
        assert!(x.is_missing(1));

        let c = column_from_cells(
            "c".into(), vec!["red".into(), "NA".into(), "2".into()],
        );
        assert_eq!(c.kind(), ColumnKind::Categorical);
        assert_eq!(c.categories().len(), 2);
        assert!(c.is_missing(1));
    }
}
