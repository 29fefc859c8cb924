//! Data types for MiniDB
//!
//! This module defines the SQL data types supported by the engine.

use crate::storage::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL Data Types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Integer (32-bit)
    Integer,
    /// Variable-length character string with max length
    Varchar(usize),
}

impl DataType {
    /// Check whether a stored value conforms to this type
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (DataType::Integer, Value::Integer(_)) => true,
            (DataType::Varchar(max), Value::String(s)) => s.chars().count() <= *max,
            _ => false,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "INT"),
            DataType::Varchar(n) => write!(f, "VARCHAR({})", n),
        }
    }
}
