//! Tabular data: typed columns, tables and index sets over their rows.
pub mod column;
pub mod table;
pub mod index_set;
mod reader;


pub use column::{Column, ColumnData, ColumnKind};
pub use table::Table;
pub use index_set::IndexSet;
