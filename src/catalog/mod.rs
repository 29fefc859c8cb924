//! Catalog module
//!
//! This module contains the table registry, schema definitions, and data types.

pub mod catalog;
pub mod schema;
pub mod types;

pub use catalog::{Catalog, TableBuilder, TableHandle};
pub use schema::{Column, Schema};
pub use types::DataType;
