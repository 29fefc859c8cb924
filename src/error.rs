//! Error types for MiniDB
//!
//! This module defines all error types used throughout the engine.

use std::sync::PoisonError;
use thiserror::Error;

/// The main error type for MiniDB
#[derive(Error, Debug)]
pub enum Error {
    // ========== Parser Errors ==========
    #[error("Syntax error: {0}")]
    Syntax(String),

    #[error("Syntax error: unsupported predicate - {0}")]
    UnsupportedPredicate(String),

    // ========== Catalog Errors ==========
    #[error("Catalog error: table '{0}' not found")]
    UnknownTable(String),

    #[error("Catalog error: table '{0}' already exists")]
    DuplicateTable(String),

    #[error("Catalog error: column '{column}' not found in table '{table}'")]
    UnknownColumn { column: String, table: String },

    #[error("Catalog error: column '{column}' declared twice in table '{table}'")]
    DuplicateColumn { column: String, table: String },

    #[error("Catalog error: table '{0}' already has a primary key")]
    PrimaryKeyExists(String),

    // ========== Type Errors ==========
    #[error("Type error: column '{column}' expects {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    #[error("Type error: value too long for column '{column}' (max {max} characters)")]
    ValueTooLong { column: String, max: usize },

    #[error("Type error: value {value} out of range for column '{column}'")]
    ValueOutOfRange { column: String, value: i64 },

    // ========== Execution Errors ==========
    #[error("Execution error: table '{table}' has {expected} columns but {found} values were supplied")]
    ColumnCountMismatch {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Execution error: primary key violation for table '{table}', duplicate key {key}")]
    PrimaryKeyViolation { table: String, key: String },

    #[error("Execution error: column '{column}' of table '{table}' contains duplicate values")]
    DuplicateKeyViolation { table: String, column: String },

    #[error("Execution error: {0}")]
    WrongStatementKind(String),

    #[error("Execution error: column index {0} out of range")]
    ColumnIndexOutOfRange(usize),

    // ========== Session Errors ==========
    #[error("Session error: session is closed")]
    SessionClosed,

    // ========== Configuration Errors ==========
    #[error("Config error: {0}")]
    Config(String),

    // ========== I/O Errors ==========
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // ========== Internal Errors ==========
    #[error("Internal error: {0}")]
    Internal(String),
}

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Result type alias for MiniDB operations
pub type Result<T> = std::result::Result<T, Error>;
