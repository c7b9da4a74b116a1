//! Table definition.

use serde::Serialize;

use super::column::Column;
use super::types::{Value, ValueKey};
use crate::error::{DataSageError, Result};

/// An ordered set of equally long columns. Rows are identified by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    /// Create a table, checking that every column has the same length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if let Some(first) = columns.first() {
            let expected = first.len();
            if let Some(bad) = columns.iter().find(|c| c.len() != expected) {
                return Err(DataSageError::Shape {
                    column: bad.name.clone(),
                    expected,
                    actual: bad.len(),
                });
            }
        }
        Ok(Self { columns })
    }

    /// Build a table from a header row and row-major raw cells, inferring
    /// each column's type.
    pub fn from_records(headers: &[String], rows: &[Vec<String>]) -> Result<Self> {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let raw: Vec<&str> = rows
                    .iter()
                    .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                    .collect();
                Column::infer(name.clone(), &raw)
            })
            .collect();
        Self::new(columns)
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Mutable access to all columns.
    pub fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    /// Values of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns
            .iter()
            .filter_map(|c| c.values.get(index))
            .collect()
    }

    /// Hashable identity of a whole row.
    pub fn row_key(&self, index: usize) -> Vec<ValueKey<'_>> {
        self.row(index).into_iter().map(Value::key).collect()
    }

    /// Count the non-missing cells of a row.
    pub fn non_missing_in_row(&self, index: usize) -> usize {
        self.row(index).iter().filter(|v| !v.is_missing()).count()
    }

    /// Keep only the rows whose flag is `true`, preserving order.
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column
                .values
                .retain(|_| flags.next().copied().unwrap_or(true));
        }
    }
}
