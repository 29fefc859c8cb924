//! System Catalog for MiniDB
//!
//! This module manages the set of tables visible to a session. Each table
//! sits behind its own reader/writer lock so that sessions sharing a catalog
//! serialize writers per table while readers proceed together.

use super::schema::{Column, Schema};
use super::types::DataType;
use crate::error::{Error, Result};
use crate::storage::Table;
use indexmap::IndexMap;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Shared, lockable handle to a table
pub type TableHandle = Arc<RwLock<Table>>;

/// System Catalog - manages all tables
#[derive(Debug, Default)]
pub struct Catalog {
    /// Tables by name, in creation order
    tables: RwLock<IndexMap<String, TableHandle>>,
}

impl Catalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table
    pub fn create_table(&self, name: &str, columns: Vec<Column>) -> Result<TableHandle> {
        self.register(name, columns, None)
    }

    /// Get a table by name
    pub fn get_table(&self, name: &str) -> Result<TableHandle> {
        let tables = self.tables.read()?;
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownTable(name.to_string()))
    }

    /// Check if a table exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let tables = self.tables.read()?;
        Ok(tables.contains_key(name))
    }

    /// Drop a table
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let mut tables = self.tables.write()?;

        if tables.shift_remove(name).is_none() {
            return Err(Error::UnknownTable(name.to_string()));
        }

        info!(table = name, "table dropped");
        Ok(())
    }

    /// List all table names in creation order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let tables = self.tables.read()?;
        Ok(tables.keys().cloned().collect())
    }

    /// Declare the primary key of an existing table
    pub fn set_primary_key(&self, table: &str, column: &str) -> Result<()> {
        let handle = self.get_table(table)?;
        let mut table_guard = handle.write()?;
        table_guard.set_primary_key(column)?;

        info!(table, column, "primary key added");
        Ok(())
    }

    fn register(
        &self,
        name: &str,
        columns: Vec<Column>,
        primary_key: Option<&str>,
    ) -> Result<TableHandle> {
        let mut tables = self.tables.write()?;

        if tables.contains_key(name) {
            return Err(Error::DuplicateTable(name.to_string()));
        }

        let mut schema = Schema::new();
        for column in columns {
            let column_name = column.name.clone();
            if !schema.add_column(column) {
                return Err(Error::DuplicateColumn {
                    column: column_name,
                    table: name.to_string(),
                });
            }
        }

        let mut table = Table::new(name, schema);
        if let Some(column) = primary_key {
            table.set_primary_key(column)?;
        }

        let handle = Arc::new(RwLock::new(table));
        tables.insert(name.to_string(), handle.clone());

        info!(table = name, "table created");
        Ok(handle)
    }
}

/// Builder for creating tables with a fluent API
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    primary_key: Option<String>,
}

impl TableBuilder {
    /// Start building a new table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: None,
        }
    }

    /// Add a column
    pub fn column(mut self, name: impl Into<String>, data_type: DataType) -> Self {
        self.columns.push(Column::new(name, data_type));
        self
    }

    /// Declare the primary key column
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = Some(name.into());
        self
    }

    /// Build the table in the catalog
    pub fn build(self, catalog: &Catalog) -> Result<TableHandle> {
        catalog.register(&self.name, self.columns, self.primary_key.as_deref())
    }
}
