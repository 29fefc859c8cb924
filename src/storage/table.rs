//! Table storage for MiniDB
//!
//! This module combines a schema with an in-memory, insertion-ordered row
//! store and enforces the primary key once one is declared.

use super::tuple::{Row, Value};
use crate::catalog::{DataType, Schema};
use crate::error::{Error, Result};
use std::collections::HashSet;
use tracing::debug;

/// An equality filter on a single column, resolved against a schema
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    /// Column position
    pub column: usize,
    /// Value the column must equal
    pub value: Value,
}

impl RowFilter {
    /// Create a new filter
    pub fn new(column: usize, value: Value) -> Self {
        Self { column, value }
    }

    /// Check whether a row satisfies the filter
    pub fn matches(&self, row: &Row) -> bool {
        row.get(self.column) == Some(&self.value)
    }
}

/// Returns true when the row passes the optional filter
fn passes(filter: Option<&RowFilter>, row: &Row) -> bool {
    filter.map_or(true, |f| f.matches(row))
}

/// A table combining schema and row storage
#[derive(Debug)]
pub struct Table {
    /// Table name
    name: String,
    /// Table schema
    schema: Schema,
    /// Rows in insertion order
    rows: Vec<Row>,
    /// Primary key values currently present; empty without a primary key
    keys: HashSet<Value>,
}

impl Table {
    /// Create a new empty table
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
            rows: Vec::new(),
            keys: HashSet::new(),
        }
    }

    /// Get table name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get table schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Number of rows in the table
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Declare `column` as the primary key
    ///
    /// Existing rows must already hold distinct values for the column.
    pub fn set_primary_key(&mut self, column: &str) -> Result<()> {
        if self.schema.primary_key().is_some() {
            return Err(Error::PrimaryKeyExists(self.name.clone()));
        }
        let index = self.column_index(column)?;

        let mut keys = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if let Some(value) = row.get(index) {
                if !keys.insert(value.clone()) {
                    return Err(Error::DuplicateKeyViolation {
                        table: self.name.clone(),
                        column: column.to_string(),
                    });
                }
            }
        }

        self.schema.set_primary_key(index);
        self.keys = keys;
        debug!(table = %self.name, column, "primary key declared");
        Ok(())
    }

    /// Insert a single row
    pub fn insert(&mut self, row: Row) -> Result<()> {
        self.validate_row(&row)?;

        if let Some(key) = self.key_of(&row) {
            if self.keys.contains(key) {
                return Err(self.key_violation(key));
            }
            self.keys.insert(key.clone());
        }

        self.rows.push(row);
        debug!(table = %self.name, rows = self.rows.len(), "row inserted");
        Ok(())
    }

    /// Insert rows independently, reporting one outcome per row
    ///
    /// A failed row does not stop the rows after it.
    pub fn insert_batch(&mut self, rows: Vec<Row>) -> Vec<Result<()>> {
        rows.into_iter().map(|row| self.insert(row)).collect()
    }

    /// Insert all rows or none of them
    pub fn insert_all(&mut self, rows: Vec<Row>) -> Result<usize> {
        let mut pending = HashSet::new();
        for row in &rows {
            self.validate_row(row)?;
            if let Some(key) = self.key_of(row) {
                if self.keys.contains(key) || !pending.insert(key.clone()) {
                    return Err(self.key_violation(key));
                }
            }
        }

        let count = rows.len();
        self.keys.extend(pending);
        self.rows.extend(rows);
        debug!(table = %self.name, inserted = count, "rows inserted");
        Ok(count)
    }

    /// Scan the table, yielding projections of the rows that pass `filter`
    ///
    /// The scan borrows the table; each call starts over from the first row.
    pub fn select<'a>(
        &'a self,
        projection: &'a [usize],
        filter: Option<&'a RowFilter>,
    ) -> impl Iterator<Item = Row> + 'a {
        self.rows
            .iter()
            .filter(move |row| passes(filter, row))
            .map(move |row| row.project(projection))
    }

    /// Apply `assignments` to every row that passes `filter`
    ///
    /// Either every matching row is updated or, on error, none is.
    pub fn update(
        &mut self,
        filter: Option<&RowFilter>,
        assignments: &[(usize, Value)],
    ) -> Result<usize> {
        for (index, value) in assignments {
            self.validate_value(*index, value)?;
        }

        let matching: Vec<usize> = self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| passes(filter, row))
            .map(|(i, _)| i)
            .collect();

        let pk = self.schema.primary_key_index();
        let new_key = pk.and_then(|pk| {
            assignments
                .iter()
                .rev()
                .find(|(index, _)| *index == pk)
                .map(|(_, value)| value)
        });

        if let (Some(pk), Some(new_key)) = (pk, new_key) {
            // Every matching row would carry the same key
            if matching.len() > 1 {
                return Err(self.key_violation(new_key));
            }
            if let Some(&target) = matching.first() {
                let clash = self
                    .rows
                    .iter()
                    .enumerate()
                    .any(|(i, row)| i != target && row.get(pk) == Some(new_key));
                if clash {
                    return Err(self.key_violation(new_key));
                }
            }
        }

        for &i in &matching {
            for (index, value) in assignments {
                self.rows[i].set(*index, value.clone());
            }
        }

        if new_key.is_some() && !matching.is_empty() {
            self.rebuild_keys();
        }

        debug!(table = %self.name, updated = matching.len(), "rows updated");
        Ok(matching.len())
    }

    /// Remove every row that passes `filter`, keeping the order of the rest
    pub fn delete(&mut self, filter: Option<&RowFilter>) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !passes(filter, row));
        let removed = before - self.rows.len();

        if removed > 0 {
            self.rebuild_keys();
        }

        debug!(table = %self.name, deleted = removed, "rows deleted");
        removed
    }

    /// Resolve a column name to its position
    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.schema
            .get_column_index(column)
            .ok_or_else(|| Error::UnknownColumn {
                column: column.to_string(),
                table: self.name.clone(),
            })
    }

    fn key_of<'r>(&self, row: &'r Row) -> Option<&'r Value> {
        self.schema.primary_key_index().and_then(|pk| row.get(pk))
    }

    fn key_violation(&self, key: &Value) -> Error {
        Error::PrimaryKeyViolation {
            table: self.name.clone(),
            key: key.to_string(),
        }
    }

    fn rebuild_keys(&mut self) {
        self.keys = match self.schema.primary_key_index() {
            Some(pk) => self.rows.iter().filter_map(|r| r.get(pk).cloned()).collect(),
            None => HashSet::new(),
        };
    }

    fn validate_row(&self, row: &Row) -> Result<()> {
        if row.len() != self.schema.column_count() {
            return Err(Error::ColumnCountMismatch {
                table: self.name.clone(),
                expected: self.schema.column_count(),
                found: row.len(),
            });
        }
        for (index, value) in row.values().iter().enumerate() {
            self.validate_value(index, value)?;
        }
        Ok(())
    }

    fn validate_value(&self, index: usize, value: &Value) -> Result<()> {
        let column = self
            .schema
            .get_column_by_index(index)
            .ok_or(Error::ColumnIndexOutOfRange(index))?;

        if column.data_type.accepts(value) {
            return Ok(());
        }
        match (column.data_type, value) {
            (DataType::Varchar(max), Value::String(_)) => Err(Error::ValueTooLong {
                column: column.name.clone(),
                max,
            }),
            (expected, found) => Err(Error::TypeMismatch {
                column: column.name.clone(),
                expected: expected.to_string(),
                found: found.type_name().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Column;

    fn ddl_table() -> Table {
        let mut schema = Schema::new();
        schema.add_column(Column::new("id", DataType::Integer));
        schema.add_column(Column::new("name", DataType::Varchar(20)));
        schema.add_column(Column::new("price", DataType::Integer));
        Table::new("DDL", schema)
    }

    fn product(id: i32, name: &str, price: i32) -> Row {
        Row::new(vec![Value::Integer(id), Value::from(name), Value::Integer(price)])
    }

    fn all_rows(table: &Table) -> Vec<Row> {
        table.select(&[0, 1, 2], None).collect()
    }

    #[test]
    fn test_insert_and_select() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();

        assert_eq!(all_rows(&table), vec![product(1, "notebook", 20)]);
    }

    #[test]
    fn test_insert_wrong_arity() {
        let mut table = ddl_table();
        let result = table.insert(Row::new(vec![Value::Integer(1), Value::from("notebook")]));

        assert!(matches!(
            result,
            Err(Error::ColumnCountMismatch { expected: 3, found: 2, .. })
        ));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_insert_wrong_type() {
        let mut table = ddl_table();
        let result = table.insert(Row::new(vec![
            Value::from("one"),
            Value::from("notebook"),
            Value::Integer(20),
        ]));
        assert!(matches!(result, Err(Error::TypeMismatch { .. })));

        let result = table.insert(product(1, "a notebook with a very long name", 20));
        assert!(matches!(result, Err(Error::ValueTooLong { max: 20, .. })));
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_primary_key_violation() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.set_primary_key("id").unwrap();

        let result = table.insert(product(1, "notebook", 20));
        assert!(matches!(result, Err(Error::PrimaryKeyViolation { .. })));
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn test_set_primary_key_with_duplicates() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(1, "pen", 10)).unwrap();

        let result = table.set_primary_key("id");
        assert!(matches!(result, Err(Error::DuplicateKeyViolation { .. })));
        assert!(table.schema().primary_key().is_none());

        // The table stays usable without a key
        table.insert(product(1, "ink", 5)).unwrap();
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_set_primary_key_errors() {
        let mut table = ddl_table();
        assert!(matches!(
            table.set_primary_key("sku"),
            Err(Error::UnknownColumn { .. })
        ));

        table.set_primary_key("id").unwrap();
        assert!(matches!(
            table.set_primary_key("name"),
            Err(Error::PrimaryKeyExists(_))
        ));
    }

    #[test]
    fn test_insert_batch_continues_past_failures() {
        let mut table = ddl_table();
        table.set_primary_key("id").unwrap();

        let outcomes = table.insert_batch(vec![
            product(1, "notebook", 20),
            product(1, "duplicate", 0),
            product(2, "pen", 10),
        ]);

        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1], Err(Error::PrimaryKeyViolation { .. })));
        assert!(outcomes[2].is_ok());
        assert_eq!(
            all_rows(&table),
            vec![product(1, "notebook", 20), product(2, "pen", 10)]
        );
    }

    #[test]
    fn test_insert_all_is_atomic() {
        let mut table = ddl_table();
        table.set_primary_key("id").unwrap();

        let result = table.insert_all(vec![product(1, "notebook", 20), product(1, "pen", 10)]);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation { .. })));
        assert_eq!(table.row_count(), 0);

        let count = table
            .insert_all(vec![product(1, "notebook", 20), product(2, "pen", 10)])
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(table.row_count(), 2);
    }

    #[test]
    fn test_select_with_filter_and_projection() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(2, "pen", 10)).unwrap();
        table.insert(product(3, "folder", 20)).unwrap();

        let filter = RowFilter::new(2, Value::Integer(20));
        let names: Vec<Row> = table.select(&[1], Some(&filter)).collect();
        assert_eq!(
            names,
            vec![
                Row::new(vec![Value::from("notebook")]),
                Row::new(vec![Value::from("folder")]),
            ]
        );

        // A second scan sees the same state
        assert_eq!(table.select(&[1], Some(&filter)).count(), 2);
    }

    #[test]
    fn test_update_matching_rows_only() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(2, "pen", 10)).unwrap();

        let filter = RowFilter::new(2, Value::Integer(20));
        let updated = table
            .update(Some(&filter), &[(1, Value::from("pen"))])
            .unwrap();

        assert_eq!(updated, 1);
        assert_eq!(
            all_rows(&table),
            vec![product(1, "pen", 20), product(2, "pen", 10)]
        );
    }

    #[test]
    fn test_update_without_filter_touches_all_rows() {
        let mut table = ddl_table();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(2, "pen", 10)).unwrap();

        let updated = table.update(None, &[(2, Value::Integer(0))]).unwrap();
        assert_eq!(updated, 2);
        assert!(all_rows(&table).iter().all(|r| r.get(2) == Some(&Value::Integer(0))));
    }

    #[test]
    fn test_update_primary_key_clash() {
        let mut table = ddl_table();
        table.set_primary_key("id").unwrap();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(2, "pen", 10)).unwrap();

        let filter = RowFilter::new(0, Value::Integer(2));
        let result = table.update(Some(&filter), &[(0, Value::Integer(1))]);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation { .. })));

        let result = table.update(None, &[(0, Value::Integer(9))]);
        assert!(matches!(result, Err(Error::PrimaryKeyViolation { .. })));
        assert_eq!(
            all_rows(&table),
            vec![product(1, "notebook", 20), product(2, "pen", 10)]
        );

        // Moving a key to a free value keeps uniqueness tracking accurate
        table.update(Some(&filter), &[(0, Value::Integer(3))]).unwrap();
        assert!(table.insert(product(2, "ink", 5)).is_ok());
        assert!(table.insert(product(3, "ink", 5)).is_err());
    }

    #[test]
    fn test_delete_preserves_order() {
        let mut table = ddl_table();
        table.set_primary_key("id").unwrap();
        table.insert(product(1, "notebook", 20)).unwrap();
        table.insert(product(2, "pen", 10)).unwrap();
        table.insert(product(3, "folder", 20)).unwrap();

        let filter = RowFilter::new(0, Value::Integer(2));
        assert_eq!(table.delete(Some(&filter)), 1);
        assert_eq!(
            all_rows(&table),
            vec![product(1, "notebook", 20), product(3, "folder", 20)]
        );

        // Missing key deletes nothing
        assert_eq!(table.delete(Some(&filter)), 0);
        assert_eq!(table.row_count(), 2);

        // The deleted key can be reused
        table.insert(product(2, "pen", 10)).unwrap();

        assert_eq!(table.delete(None), 3);
        assert_eq!(table.row_count(), 0);
    }
}
