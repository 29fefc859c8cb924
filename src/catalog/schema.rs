//! Schema definitions for MiniDB
//!
//! This module defines table schemas and column metadata.

use super::types::DataType;
use indexmap::IndexMap;

/// Column definition in a table
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

impl Column {
    /// Create a new column
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Table schema - defines the structure of a table
///
/// Columns keep their declaration order; lookups by name go through the
/// same map.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    /// Columns in declaration order, keyed by name
    columns: IndexMap<String, Column>,
    /// Position of the primary key column, if one is declared
    primary_key: Option<usize>,
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column to the schema. Returns false if the name is taken.
    pub fn add_column(&mut self, column: Column) -> bool {
        if self.columns.contains_key(&column.name) {
            return false;
        }
        self.columns.insert(column.name.clone(), column);
        true
    }

    /// Get column by name
    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Get column by position
    pub fn get_column_by_index(&self, index: usize) -> Option<&Column> {
        self.columns.get_index(index).map(|(_, col)| col)
    }

    /// Get column position by name
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.get_index_of(name)
    }

    /// Iterate over columns in declaration order
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    /// Get number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// Position of the primary key column
    pub fn primary_key_index(&self) -> Option<usize> {
        self.primary_key
    }

    /// The primary key column
    pub fn primary_key(&self) -> Option<&Column> {
        self.primary_key.and_then(|idx| self.get_column_by_index(idx))
    }

    /// Mark the column at `index` as the primary key
    pub(crate) fn set_primary_key(&mut self, index: usize) {
        debug_assert!(index < self.columns.len());
        self.primary_key = Some(index);
    }
}
