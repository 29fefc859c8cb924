//! Storage engine module
//!
//! This module contains the in-memory storage components:
//! - Values and rows
//! - Tables with primary key enforcement

pub mod table;
pub mod tuple;

pub use table::{RowFilter, Table};
pub use tuple::{Row, Value};
