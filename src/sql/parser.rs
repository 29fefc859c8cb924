//! SQL Parser
//!
//! This module parses SQL tokens into an AST.

use super::ast::*;
use super::lexer::Lexer;
use super::token::Token;
use crate::catalog::DataType;
use crate::error::{Error, Result};

/// SQL Parser
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    /// Create a new parser from a SQL string
    pub fn new(sql: &str) -> Result<Self> {
        let mut lexer = Lexer::new(sql);
        let tokens = lexer.tokenize()?;

        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse exactly one SQL statement with an optional trailing semicolon
    pub fn parse(&mut self) -> Result<Statement> {
        let stmt = self.parse_statement()?;

        if self.check(&Token::Semicolon) {
            self.advance();
        }

        if !self.is_at_end() {
            return Err(Error::Syntax(format!(
                "unexpected token '{}' after end of statement",
                self.current()
            )));
        }

        Ok(stmt)
    }

    /// Parse a single statement
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.current() {
            Token::Select => self.parse_select().map(Statement::Select),
            Token::Insert => self.parse_insert().map(Statement::Insert),
            Token::Update => self.parse_update().map(Statement::Update),
            Token::Delete => self.parse_delete().map(Statement::Delete),
            Token::Create => self.parse_create_table().map(Statement::CreateTable),
            Token::Drop => self.parse_drop_table().map(Statement::DropTable),
            Token::Alter => self.parse_alter_table().map(Statement::AlterAddPrimaryKey),
            _ => Err(unexpected(
                "SELECT, INSERT, UPDATE, DELETE, CREATE, DROP, or ALTER",
                self.current(),
            )),
        }
    }

    // ========== SELECT Statement ==========

    fn parse_select(&mut self) -> Result<SelectStatement> {
        self.expect(&Token::Select)?;

        let projection = if self.check(&Token::Asterisk) {
            self.advance();
            Projection::Wildcard
        } else {
            Projection::Columns(self.parse_identifier_list()?)
        };

        self.expect(&Token::From)?;
        let table_name = self.expect_identifier()?;
        let predicate = self.parse_where()?;

        Ok(SelectStatement {
            projection,
            table_name,
            predicate,
        })
    }

    // ========== INSERT Statement ==========

    fn parse_insert(&mut self) -> Result<InsertStatement> {
        self.expect(&Token::Insert)?;
        self.expect(&Token::Into)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Values)?;

        // Parse value rows
        let mut rows = Vec::new();
        loop {
            self.expect(&Token::LParen)?;
            let row = self.parse_literal_list()?;
            self.expect(&Token::RParen)?;
            rows.push(row);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(InsertStatement { table_name, rows })
    }

    // ========== UPDATE Statement ==========

    fn parse_update(&mut self) -> Result<UpdateStatement> {
        self.expect(&Token::Update)?;

        let table_name = self.expect_identifier()?;

        self.expect(&Token::Set)?;

        let mut assignments = Vec::new();
        loop {
            let column = self.expect_identifier()?;
            self.expect(&Token::Eq)?;
            let value = self.parse_literal()?;
            assignments.push(Assignment { column, value });

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        let predicate = self.parse_where()?;

        Ok(UpdateStatement {
            table_name,
            assignments,
            predicate,
        })
    }

    // ========== DELETE Statement ==========

    fn parse_delete(&mut self) -> Result<DeleteStatement> {
        self.expect(&Token::Delete)?;
        self.expect(&Token::From)?;

        let table_name = self.expect_identifier()?;
        let predicate = self.parse_where()?;

        Ok(DeleteStatement {
            table_name,
            predicate,
        })
    }

    // ========== CREATE TABLE Statement ==========

    fn parse_create_table(&mut self) -> Result<CreateTableStatement> {
        self.expect(&Token::Create)?;
        self.expect(&Token::Table)?;

        let if_not_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Not)?;
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        let mut primary_key = None;

        loop {
            let key = if self.check(&Token::Primary) || self.check(&Token::Constraint) {
                Some(self.parse_primary_key_constraint()?.1)
            } else {
                let (column, inline_key) = self.parse_column_def()?;
                let key = inline_key.then(|| column.name.clone());
                columns.push(column);
                key
            };

            if let Some(key) = key {
                if primary_key.is_some() {
                    return Err(Error::Syntax(format!(
                        "multiple primary keys defined for table '{}'",
                        table_name
                    )));
                }
                primary_key = Some(key);
            }

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        self.expect(&Token::RParen)?;

        if columns.is_empty() {
            return Err(Error::Syntax(format!(
                "table '{}' must have at least one column",
                table_name
            )));
        }

        Ok(CreateTableStatement {
            table_name,
            columns,
            primary_key,
            if_not_exists,
        })
    }

    /// Parse `name type [PRIMARY KEY]`; the flag reports an inline key
    fn parse_column_def(&mut self) -> Result<(ColumnDef, bool)> {
        let name = self.expect_identifier()?;
        let data_type = self.parse_data_type()?;

        let primary_key = if self.check(&Token::Primary) {
            self.advance();
            self.expect(&Token::Key)?;
            true
        } else {
            false
        };

        Ok((ColumnDef { name, data_type }, primary_key))
    }

    fn parse_data_type(&mut self) -> Result<DataType> {
        match self.current() {
            Token::Int | Token::Integer => {
                self.advance();
                Ok(DataType::Integer)
            }
            Token::Varchar => {
                self.advance();
                self.expect(&Token::LParen)?;
                let len = self.expect_integer()?;
                self.expect(&Token::RParen)?;
                let len = usize::try_from(len).map_err(|_| {
                    Error::Syntax(format!("invalid VARCHAR length {}", len))
                })?;
                Ok(DataType::Varchar(len))
            }
            _ => Err(unexpected("data type", self.current())),
        }
    }

    /// Parse `[CONSTRAINT [name]] PRIMARY KEY (col)`
    fn parse_primary_key_constraint(&mut self) -> Result<(Option<String>, String)> {
        let name = if self.check(&Token::Constraint) {
            self.advance();
            if let Token::Identifier(name) = self.current().clone() {
                self.advance();
                Some(name)
            } else {
                None
            }
        } else {
            None
        };

        self.expect(&Token::Primary)?;
        self.expect(&Token::Key)?;
        self.expect(&Token::LParen)?;
        let mut columns = self.parse_identifier_list()?;
        self.expect(&Token::RParen)?;

        match columns.len() {
            1 => Ok((name, columns.remove(0))),
            _ => Err(Error::Syntax(
                "composite primary keys are not supported".to_string(),
            )),
        }
    }

    // ========== DROP TABLE Statement ==========

    fn parse_drop_table(&mut self) -> Result<DropTableStatement> {
        self.expect(&Token::Drop)?;
        self.expect(&Token::Table)?;

        let if_exists = if self.check(&Token::If) {
            self.advance();
            self.expect(&Token::Exists)?;
            true
        } else {
            false
        };

        let table_name = self.expect_identifier()?;

        Ok(DropTableStatement {
            table_name,
            if_exists,
        })
    }

    // ========== ALTER TABLE Statement ==========

    fn parse_alter_table(&mut self) -> Result<AlterAddPrimaryKeyStatement> {
        self.expect(&Token::Alter)?;
        self.expect(&Token::Table)?;
        let table_name = self.expect_identifier()?;
        self.expect(&Token::Add)?;

        let (constraint_name, column) = self.parse_primary_key_constraint()?;

        Ok(AlterAddPrimaryKeyStatement {
            table_name,
            constraint_name,
            column,
        })
    }

    // ========== WHERE clause ==========

    /// Parse an optional `WHERE column = literal`
    fn parse_where(&mut self) -> Result<Option<Predicate>> {
        if !self.check(&Token::Where) {
            return Ok(None);
        }
        self.advance();

        let column = match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                name
            }
            Token::Not | Token::LParen => {
                return Err(Error::UnsupportedPredicate(format!(
                    "'{}' in WHERE clause",
                    self.current()
                )))
            }
            Token::IntegerLiteral(_) | Token::StringLiteral(_) => {
                return Err(Error::UnsupportedPredicate(format!(
                    "literal {} on the left of a comparison",
                    self.current()
                )))
            }
            other => return Err(unexpected("column name", &other)),
        };

        match self.current() {
            Token::Eq => self.advance(),
            Token::Dot => {
                return Err(Error::UnsupportedPredicate(
                    "qualified column reference".to_string(),
                ))
            }
            token
                if token.is_comparison()
                    || matches!(
                        token,
                        Token::Like | Token::In | Token::Between | Token::Is | Token::Not
                    ) =>
            {
                return Err(Error::UnsupportedPredicate(format!(
                    "operator '{}', only '=' is supported",
                    token
                )))
            }
            token => return Err(unexpected("'='", token)),
        }

        let value = match self.current().clone() {
            Token::Identifier(other) => {
                return Err(Error::UnsupportedPredicate(format!(
                    "comparison between columns '{}' and '{}'",
                    column, other
                )))
            }
            _ => self.parse_literal()?,
        };

        if matches!(self.current(), Token::And | Token::Or) {
            return Err(Error::UnsupportedPredicate(format!(
                "compound condition with '{}'",
                self.current()
            )));
        }

        Ok(Some(Predicate { column, value }))
    }

    // ========== Helper functions ==========

    fn parse_literal(&mut self) -> Result<Literal> {
        let literal = match self.current() {
            Token::IntegerLiteral(n) => Literal::Integer(*n),
            Token::StringLiteral(s) => Literal::String(s.clone()),
            other => return Err(unexpected("literal value", other)),
        };
        self.advance();
        Ok(literal)
    }

    fn parse_literal_list(&mut self) -> Result<Vec<Literal>> {
        let mut literals = Vec::new();

        loop {
            literals.push(self.parse_literal()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(literals)
    }

    fn parse_identifier_list(&mut self) -> Result<Vec<String>> {
        let mut identifiers = Vec::new();

        loop {
            identifiers.push(self.expect_identifier()?);

            if !self.check(&Token::Comma) {
                break;
            }
            self.advance();
        }

        Ok(identifiers)
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.current()) == std::mem::discriminant(token)
    }

    fn expect(&mut self, token: &Token) -> Result<()> {
        if self.check(token) {
            self.advance();
            Ok(())
        } else {
            Err(unexpected(&token.to_string(), self.current()))
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.current().clone() {
            Token::Identifier(name) => {
                self.advance();
                Ok(name)
            }
            token if token.is_keyword() => Err(Error::Syntax(format!(
                "reserved word '{}' cannot be used as a name",
                token
            ))),
            token => Err(unexpected("identifier", &token)),
        }
    }

    fn expect_integer(&mut self) -> Result<i64> {
        match self.current().clone() {
            Token::IntegerLiteral(n) => {
                self.advance();
                Ok(n)
            }
            token => Err(unexpected("integer", &token)),
        }
    }
}

fn unexpected(expected: &str, found: &Token) -> Error {
    Error::Syntax(format!("unexpected token '{}', expected {}", found, expected))
}
