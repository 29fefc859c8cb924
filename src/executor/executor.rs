//! Statement Executor for MiniDB
//!
//! This module dispatches parsed statements to the catalog and table storage
//! and turns the outcome into an [`ExecResult`].

use super::result::{ExecResult, ResultSet};
use crate::catalog::{Catalog, Column, DataType, TableBuilder};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::sql::ast::*;
use crate::storage::{Row, RowFilter, Table, Value};
use tracing::{debug, info, warn};

/// Statement executor
#[derive(Debug, Clone, Default)]
pub struct Executor {
    config: EngineConfig,
}

impl Executor {
    /// Create a new executor
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Execute a statement against `catalog`
    pub fn execute(&self, catalog: &Catalog, stmt: Statement) -> Result<ExecResult> {
        debug!(?stmt, "executing statement");

        match stmt {
            Statement::CreateTable(stmt) => self.execute_create_table(catalog, stmt),
            Statement::DropTable(stmt) => self.execute_drop_table(catalog, stmt),
            Statement::AlterAddPrimaryKey(stmt) => self.execute_add_primary_key(catalog, stmt),
            Statement::Insert(stmt) => self.execute_insert(catalog, stmt),
            Statement::Select(stmt) => self.execute_select(catalog, stmt),
            Statement::Update(stmt) => self.execute_update(catalog, stmt),
            Statement::Delete(stmt) => self.execute_delete(catalog, stmt),
        }
    }

    // ========== DDL ==========

    fn execute_create_table(
        &self,
        catalog: &Catalog,
        stmt: CreateTableStatement,
    ) -> Result<ExecResult> {
        let mut builder = TableBuilder::new(stmt.table_name.as_str());
        for column in stmt.columns {
            builder = builder.column(column.name, column.data_type);
        }
        if let Some(key) = stmt.primary_key {
            builder = builder.primary_key(key);
        }

        match builder.build(catalog) {
            Ok(_) => Ok(ExecResult::RowCount(0)),
            Err(Error::DuplicateTable(_)) if stmt.if_not_exists => {
                debug!(table = %stmt.table_name, "table already exists, skipping");
                Ok(ExecResult::RowCount(0))
            }
            Err(e) => Err(e),
        }
    }

    fn execute_drop_table(&self, catalog: &Catalog, stmt: DropTableStatement) -> Result<ExecResult> {
        match catalog.drop_table(&stmt.table_name) {
            Ok(()) => Ok(ExecResult::RowCount(0)),
            Err(Error::UnknownTable(_)) if stmt.if_exists => {
                debug!(table = %stmt.table_name, "table does not exist, skipping");
                Ok(ExecResult::RowCount(0))
            }
            Err(e) => Err(e),
        }
    }

    fn execute_add_primary_key(
        &self,
        catalog: &Catalog,
        stmt: AlterAddPrimaryKeyStatement,
    ) -> Result<ExecResult> {
        catalog.set_primary_key(&stmt.table_name, &stmt.column)?;

        if let Some(name) = &stmt.constraint_name {
            info!(table = %stmt.table_name, constraint = %name, "named constraint recorded");
        }
        Ok(ExecResult::RowCount(0))
    }

    // ========== DML ==========

    fn execute_insert(&self, catalog: &Catalog, stmt: InsertStatement) -> Result<ExecResult> {
        let handle = catalog.get_table(&stmt.table_name)?;
        let mut table = handle.write()?;

        let mut rows = Vec::with_capacity(stmt.rows.len());
        for literals in stmt.rows {
            let expected = table.schema().column_count();
            if literals.len() != expected {
                return Err(Error::ColumnCountMismatch {
                    table: stmt.table_name,
                    expected,
                    found: literals.len(),
                });
            }

            let values = table
                .schema()
                .columns()
                .zip(literals)
                .map(|(column, literal)| self.coerce_literal(column, literal))
                .collect::<Result<Vec<_>>>()?;
            rows.push(Row::new(values));
        }

        let inserted = table.insert_all(rows)?;
        Ok(ExecResult::RowCount(inserted))
    }

    fn execute_select(&self, catalog: &Catalog, stmt: SelectStatement) -> Result<ExecResult> {
        let handle = catalog.get_table(&stmt.table_name)?;
        let table = handle.read()?;

        let projection: Vec<usize> = match &stmt.projection {
            Projection::Wildcard => (0..table.schema().column_count()).collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| table.column_index(name))
                .collect::<Result<_>>()?,
        };
        let columns = projection
            .iter()
            .filter_map(|&i| table.schema().get_column_by_index(i))
            .map(|c| c.name.clone())
            .collect();

        let filter = resolve_filter(&table, stmt.predicate)?;
        let rows: Vec<Row> = table.select(&projection, filter.as_ref()).collect();

        debug!(table = %stmt.table_name, rows = rows.len(), "select complete");
        Ok(ExecResult::Rows(ResultSet::new(columns, rows)))
    }

    fn execute_update(&self, catalog: &Catalog, stmt: UpdateStatement) -> Result<ExecResult> {
        let handle = catalog.get_table(&stmt.table_name)?;
        let mut table = handle.write()?;

        let mut assignments = Vec::with_capacity(stmt.assignments.len());
        for assignment in stmt.assignments {
            let index = table.column_index(&assignment.column)?;
            let column = column_at(&table, index)?;
            assignments.push((index, self.coerce_literal(column, assignment.value)?));
        }

        let filter = resolve_filter(&table, stmt.predicate)?;
        let updated = table.update(filter.as_ref(), &assignments)?;
        Ok(ExecResult::RowCount(updated))
    }

    fn execute_delete(&self, catalog: &Catalog, stmt: DeleteStatement) -> Result<ExecResult> {
        let handle = catalog.get_table(&stmt.table_name)?;
        let mut table = handle.write()?;

        let filter = resolve_filter(&table, stmt.predicate)?;
        Ok(ExecResult::RowCount(table.delete(filter.as_ref())))
    }

    // ========== Value coercion ==========

    /// Convert a literal into a value storable in `column`
    fn coerce_literal(&self, column: &Column, literal: Literal) -> Result<Value> {
        match (column.data_type, literal) {
            (DataType::Integer, Literal::Integer(n)) => int_value(column, n),
            (DataType::Varchar(max), Literal::String(s)) => {
                if s.chars().count() <= max {
                    return Ok(Value::String(s));
                }
                if self.config.strict_mode {
                    return Err(Error::ValueTooLong {
                        column: column.name.clone(),
                        max,
                    });
                }
                warn!(column = %column.name, max, "truncating string value");
                Ok(Value::String(s.chars().take(max).collect()))
            }
            (expected, literal) => Err(type_mismatch(column, expected, &literal)),
        }
    }
}

/// Resolve a parsed predicate into a filter over `table`
///
/// Strings are compared exactly, so an over-long literal simply matches nothing.
fn resolve_filter(table: &Table, predicate: Option<Predicate>) -> Result<Option<RowFilter>> {
    let Some(predicate) = predicate else {
        return Ok(None);
    };

    let index = table.column_index(&predicate.column)?;
    let column = column_at(table, index)?;
    let value = match (column.data_type, predicate.value) {
        (DataType::Integer, Literal::Integer(n)) => int_value(column, n)?,
        (DataType::Varchar(_), Literal::String(s)) => Value::String(s),
        (expected, literal) => return Err(type_mismatch(column, expected, &literal)),
    };

    Ok(Some(RowFilter::new(index, value)))
}

fn column_at(table: &Table, index: usize) -> Result<&Column> {
    table
        .schema()
        .get_column_by_index(index)
        .ok_or(Error::ColumnIndexOutOfRange(index))
}

fn int_value(column: &Column, n: i64) -> Result<Value> {
    i32::try_from(n)
        .map(Value::Integer)
        .map_err(|_| Error::ValueOutOfRange {
            column: column.name.clone(),
            value: n,
        })
}

fn type_mismatch(column: &Column, expected: DataType, literal: &Literal) -> Error {
    Error::TypeMismatch {
        column: column.name.clone(),
        expected: expected.to_string(),
        found: literal.type_name().to_string(),
    }
}
