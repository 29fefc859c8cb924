//! Statement results
//!
//! A statement either reports how many rows it affected or returns rows.

use crate::error::{Error, Result};
use crate::storage::{Row, Value};
use serde::Serialize;

/// Outcome of executing one statement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExecResult {
    /// Rows affected by DDL or DML (DDL always reports 0)
    RowCount(usize),
    /// Rows returned by a query
    Rows(ResultSet),
}

impl ExecResult {
    /// The affected-row count, if this is not a query result
    pub fn row_count(&self) -> Option<usize> {
        match self {
            ExecResult::RowCount(n) => Some(*n),
            ExecResult::Rows(_) => None,
        }
    }

    /// The returned rows, if this is a query result
    pub fn into_rows(self) -> Option<ResultSet> {
        match self {
            ExecResult::Rows(rows) => Some(rows),
            ExecResult::RowCount(_) => None,
        }
    }
}

/// Rows returned by a query, in scan order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultSet {
    /// Column names
    columns: Vec<String>,
    /// Result rows
    rows: Vec<Row>,
}

impl ResultSet {
    /// Create a result set
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names, in select-list order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Raw rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at a 0-based position
    pub fn row(&self, index: usize) -> Option<ResultRow<'_>> {
        self.rows.get(index).map(|row| ResultRow {
            columns: &self.columns,
            row,
        })
    }

    /// Iterate over rows with named access
    pub fn iter(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(move |row| ResultRow {
            columns: &self.columns,
            row,
        })
    }

    /// Serialize as `{"columns": [...], "rows": [[...], ...]}`
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Internal(e.to_string()))
    }
}

/// A single row of a [`ResultSet`]
///
/// Positions are 1-based, as in `get(1)` for the first column.
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl<'a> ResultRow<'a> {
    /// Value at a 1-based position
    pub fn get(&self, position: usize) -> Result<&'a Value> {
        position
            .checked_sub(1)
            .and_then(|index| self.row.get(index))
            .ok_or(Error::ColumnIndexOutOfRange(position))
    }

    /// Value of the named column
    pub fn get_by_name(&self, name: &str) -> Result<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|index| self.row.get(index))
            .ok_or_else(|| Error::UnknownColumn {
                column: name.to_string(),
                table: "result set".to_string(),
            })
    }

    /// Integer at a 1-based position
    pub fn get_int(&self, position: usize) -> Result<i32> {
        let value = self.get(position)?;
        value.as_i32().ok_or_else(|| self.mismatch(position, "INT", value))
    }

    /// String at a 1-based position
    pub fn get_string(&self, position: usize) -> Result<&'a str> {
        let value = self.get(position)?;
        value
            .as_str()
            .ok_or_else(|| self.mismatch(position, "VARCHAR", value))
    }

    /// Number of values in the row
    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// The underlying row
    pub fn row(&self) -> &'a Row {
        self.row
    }

    fn mismatch(&self, position: usize, expected: &str, found: &Value) -> Error {
        Error::TypeMismatch {
            column: self
                .columns
                .get(position - 1)
                .cloned()
                .unwrap_or_default(),
            expected: expected.to_string(),
            found: found.type_name().to_string(),
        }
    }
}
