//! Statement execution module
//!
//! This module contains the executor and the result types it produces.

pub mod executor;
pub mod result;

pub use executor::Executor;
pub use result::{ExecResult, ResultRow, ResultSet};
