//! SQL front end for MiniDB
//!
//! Text goes through the [`Lexer`] into tokens, and the [`Parser`] turns
//! those into a single [`Statement`].

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::Statement;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::Token;

use crate::error::Result;

/// Parse one SQL statement
pub fn parse(sql: &str) -> Result<Statement> {
    Parser::new(sql)?.parse()
}
