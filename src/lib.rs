//! MiniDB - A minimal in-memory relational engine written in Rust
//!
//! This library provides the core components for a small SQL engine:
//! - SQL parsing (lexer, parser, AST)
//! - System catalog with per-table locking
//! - In-memory table storage with primary key enforcement
//! - Statement execution and result sets
//! - Sessions with batch execution

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod session;
pub mod sql;
pub mod storage;

pub use catalog::Catalog;
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use executor::{ExecResult, ResultSet};
pub use session::Session;
pub use storage::{Row, Value};
