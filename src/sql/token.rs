//! SQL Token definitions
//!
//! This module defines all tokens that can appear in SQL statements.

use std::fmt;

/// SQL Token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // ========== Keywords ==========
    // DDL Keywords
    Create,
    Drop,
    Alter,
    Table,
    Add,

    // DML Keywords
    Select,
    Insert,
    Update,
    Delete,
    Into,
    Values,
    Set,
    From,
    Where,

    // Predicate keywords this engine recognizes but does not evaluate
    And,
    Or,
    Not,
    Like,
    In,
    Between,
    Is,

    // Constraints
    Primary,
    Key,
    Constraint,
    If,
    Exists,

    // Data Types
    Int,
    Integer,
    Varchar,

    // ========== Literals ==========
    /// Integer literal
    IntegerLiteral(i64),
    /// String literal (single- or double-quoted)
    StringLiteral(String),
    /// Identifier (table name, column name, etc.)
    Identifier(String),

    // ========== Operators ==========
    /// =
    Eq,
    /// <> or !=
    Neq,
    /// <
    Lt,
    /// >
    Gt,
    /// <=
    Lte,
    /// >=
    Gte,
    /// *
    Asterisk,

    // ========== Delimiters ==========
    /// (
    LParen,
    /// )
    RParen,
    /// ,
    Comma,
    /// ;
    Semicolon,
    /// .
    Dot,

    // ========== Special ==========
    /// End of input
    Eof,
}

impl Token {
    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Drop
                | Token::Alter
                | Token::Table
                | Token::Add
                | Token::Select
                | Token::Insert
                | Token::Update
                | Token::Delete
                | Token::Into
                | Token::Values
                | Token::Set
                | Token::From
                | Token::Where
                | Token::And
                | Token::Or
                | Token::Not
                | Token::Like
                | Token::In
                | Token::Between
                | Token::Is
                | Token::Primary
                | Token::Key
                | Token::Constraint
                | Token::If
                | Token::Exists
                | Token::Int
                | Token::Integer
                | Token::Varchar
        )
    }

    /// Check if this token is a comparison operator
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::Eq | Token::Neq | Token::Lt | Token::Gt | Token::Lte | Token::Gte
        )
    }

    /// Try to parse a keyword from a string
    pub fn from_keyword(s: &str) -> Option<Token> {
        match s.to_uppercase().as_str() {
            // DDL
            "CREATE" => Some(Token::Create),
            "DROP" => Some(Token::Drop),
            "ALTER" => Some(Token::Alter),
            "TABLE" => Some(Token::Table),
            "ADD" => Some(Token::Add),

            // DML
            "SELECT" => Some(Token::Select),
            "INSERT" => Some(Token::Insert),
            "UPDATE" => Some(Token::Update),
            "DELETE" => Some(Token::Delete),
            "INTO" => Some(Token::Into),
            "VALUES" => Some(Token::Values),
            "SET" => Some(Token::Set),
            "FROM" => Some(Token::From),
            "WHERE" => Some(Token::Where),

            // Predicates
            "AND" => Some(Token::And),
            "OR" => Some(Token::Or),
            "NOT" => Some(Token::Not),
            "LIKE" => Some(Token::Like),
            "IN" => Some(Token::In),
            "BETWEEN" => Some(Token::Between),
            "IS" => Some(Token::Is),

            // Constraints
            "PRIMARY" => Some(Token::Primary),
            "KEY" => Some(Token::Key),
            "CONSTRAINT" => Some(Token::Constraint),
            "IF" => Some(Token::If),
            "EXISTS" => Some(Token::Exists),

            // Data Types
            "INT" => Some(Token::Int),
            "INTEGER" => Some(Token::Integer),
            "VARCHAR" => Some(Token::Varchar),

            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Create => write!(f, "CREATE"),
            Token::Drop => write!(f, "DROP"),
            Token::Alter => write!(f, "ALTER"),
            Token::Table => write!(f, "TABLE"),
            Token::Add => write!(f, "ADD"),
            Token::Select => write!(f, "SELECT"),
            Token::Insert => write!(f, "INSERT"),
            Token::Update => write!(f, "UPDATE"),
            Token::Delete => write!(f, "DELETE"),
            Token::Into => write!(f, "INTO"),
            Token::Values => write!(f, "VALUES"),
            Token::Set => write!(f, "SET"),
            Token::From => write!(f, "FROM"),
            Token::Where => write!(f, "WHERE"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Like => write!(f, "LIKE"),
            Token::In => write!(f, "IN"),
            Token::Between => write!(f, "BETWEEN"),
            Token::Is => write!(f, "IS"),
            Token::Primary => write!(f, "PRIMARY"),
            Token::Key => write!(f, "KEY"),
            Token::Constraint => write!(f, "CONSTRAINT"),
            Token::If => write!(f, "IF"),
            Token::Exists => write!(f, "EXISTS"),
            Token::Int => write!(f, "INT"),
            Token::Integer => write!(f, "INTEGER"),
            Token::Varchar => write!(f, "VARCHAR"),
            Token::IntegerLiteral(n) => write!(f, "{}", n),
            Token::StringLiteral(s) => write!(f, "'{}'", s),
            Token::Identifier(s) => write!(f, "{}", s),
            Token::Eq => write!(f, "="),
            Token::Neq => write!(f, "<>"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::Lte => write!(f, "<="),
            Token::Gte => write!(f, ">="),
            Token::Asterisk => write!(f, "*"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "EOF"),
        }
    }
}
