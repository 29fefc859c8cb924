//! SQL Abstract Syntax Tree (AST)
//!
//! This module defines the AST nodes for the statements the engine accepts.

use crate::catalog::DataType;
use std::fmt;

/// A SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// CREATE TABLE statement
    CreateTable(CreateTableStatement),
    /// DROP TABLE statement
    DropTable(DropTableStatement),
    /// ALTER TABLE ... ADD CONSTRAINT PRIMARY KEY statement
    AlterAddPrimaryKey(AlterAddPrimaryKeyStatement),
    /// INSERT statement
    Insert(InsertStatement),
    /// SELECT statement
    Select(SelectStatement),
    /// UPDATE statement
    Update(UpdateStatement),
    /// DELETE statement
    Delete(DeleteStatement),
}

impl Statement {
    /// Whether this statement produces rows rather than a row count
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Select(_))
    }
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStatement {
    /// Table name
    pub table_name: String,
    /// Column definitions
    pub columns: Vec<ColumnDef>,
    /// Primary key column, declared inline or as a table constraint
    pub primary_key: Option<String>,
    /// IF NOT EXISTS flag
    pub if_not_exists: bool,
}

/// Column definition
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Data type
    pub data_type: DataType,
}

/// DROP TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DropTableStatement {
    /// Table name
    pub table_name: String,
    /// IF EXISTS flag
    pub if_exists: bool,
}

/// ALTER TABLE name ADD CONSTRAINT [c] PRIMARY KEY (col)
#[derive(Debug, Clone, PartialEq)]
pub struct AlterAddPrimaryKeyStatement {
    /// Table name
    pub table_name: String,
    /// Optional constraint name
    pub constraint_name: Option<String>,
    /// Key column
    pub column: String,
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    /// Target table name
    pub table_name: String,
    /// One value list per row
    pub rows: Vec<Vec<Literal>>,
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    /// Select list
    pub projection: Projection,
    /// Source table
    pub table_name: String,
    /// WHERE clause
    pub predicate: Option<Predicate>,
}

/// Select list
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// All columns (*)
    Wildcard,
    /// Named columns, in order
    Columns(Vec<String>),
}

/// UPDATE statement
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    /// Target table name
    pub table_name: String,
    /// SET clause (column = value pairs)
    pub assignments: Vec<Assignment>,
    /// WHERE clause
    pub predicate: Option<Predicate>,
}

/// Column assignment (for UPDATE)
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    /// Column name
    pub column: String,
    /// New value
    pub value: Literal,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    /// Target table name
    pub table_name: String,
    /// WHERE clause
    pub predicate: Option<Predicate>,
}

/// `column = literal`, the only predicate shape the engine evaluates
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Column name
    pub column: String,
    /// Value the column must equal
    pub value: Literal,
}

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Integer
    Integer(i64),
    /// String, with its quote delimiters stripped
    String(String),
}

impl Literal {
    /// Get the type name of this literal
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Integer(_) => "INT",
            Literal::String(_) => "VARCHAR",
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}
