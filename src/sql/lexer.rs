//! SQL Lexer (Tokenizer)
//!
//! This module converts SQL strings into a stream of tokens.

use super::token::Token;
use crate::error::{Error, Result};

/// SQL Lexer
pub struct Lexer {
    /// Input characters
    input: Vec<char>,
    /// Current position in input
    position: usize,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token()?;
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }

        Ok(tokens)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.skip_comments();
        self.skip_whitespace();

        if self.is_at_end() {
            return Ok(Token::Eof);
        }

        let ch = self.current_char();

        match ch {
            '(' => return Ok(self.single(Token::LParen)),
            ')' => return Ok(self.single(Token::RParen)),
            ',' => return Ok(self.single(Token::Comma)),
            ';' => return Ok(self.single(Token::Semicolon)),
            '.' => return Ok(self.single(Token::Dot)),
            '*' => return Ok(self.single(Token::Asterisk)),
            '=' => return Ok(self.single(Token::Eq)),
            '-' => {
                self.advance();
                // Only a negative number literal is valid here
                if !self.is_at_end() && self.current_char().is_ascii_digit() {
                    return self.read_number(true);
                }
                return Err(unexpected_character('-', self.position - 1));
            }
            '<' => {
                self.advance();
                if !self.is_at_end() {
                    match self.current_char() {
                        '=' => return Ok(self.single(Token::Lte)),
                        '>' => return Ok(self.single(Token::Neq)),
                        _ => {}
                    }
                }
                return Ok(Token::Lt);
            }
            '>' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    return Ok(self.single(Token::Gte));
                }
                return Ok(Token::Gt);
            }
            '!' => {
                self.advance();
                if !self.is_at_end() && self.current_char() == '=' {
                    return Ok(self.single(Token::Neq));
                }
                return Err(unexpected_character('!', self.position - 1));
            }
            '\'' | '"' => {
                let value = self.read_quoted(ch)?;
                return Ok(Token::StringLiteral(value));
            }
            '`' => {
                let value = self.read_quoted('`')?;
                return Ok(Token::Identifier(value));
            }
            _ => {}
        }

        // Numbers
        if ch.is_ascii_digit() {
            return self.read_number(false);
        }

        // Identifiers and keywords
        if ch.is_alphabetic() || ch == '_' {
            return Ok(self.read_identifier());
        }

        Err(unexpected_character(ch, self.position))
    }

    /// Consume one character and return `token`
    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Get the current character
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    /// Peek at the next character
    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Skip whitespace characters
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    /// Skip SQL comments (-- and /* */)
    fn skip_comments(&mut self) {
        if self.is_at_end() {
            return;
        }

        // Single line comment: --
        if self.current_char() == '-' && self.peek_char() == Some('-') {
            while !self.is_at_end() && self.current_char() != '\n' {
                self.advance();
            }
            self.skip_whitespace();
            self.skip_comments();
            return;
        }

        // Multi-line comment: /* */
        if self.current_char() == '/' && self.peek_char() == Some('*') {
            self.advance(); // skip /
            self.advance(); // skip *

            while !self.is_at_end() {
                if self.current_char() == '*' && self.peek_char() == Some('/') {
                    self.advance(); // skip *
                    self.advance(); // skip /
                    break;
                }
                self.advance();
            }
            self.skip_whitespace();
            self.skip_comments();
        }
    }

    /// Read text enclosed in `quote`; a doubled quote stands for itself
    fn read_quoted(&mut self, quote: char) -> Result<String> {
        let start_pos = self.position;
        self.advance(); // skip opening quote

        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch == quote {
                if self.peek_char() == Some(quote) {
                    value.push(quote);
                    self.advance();
                    self.advance();
                } else {
                    self.advance(); // skip closing quote
                    return Ok(value);
                }
            } else {
                value.push(ch);
                self.advance();
            }
        }

        Err(Error::Syntax(format!(
            "unterminated quoted text starting at position {}",
            start_pos
        )))
    }

    /// Read an integer literal; the sign, if any, is already consumed
    fn read_number(&mut self, negative: bool) -> Result<Token> {
        let start_pos = self.position;
        let mut value = String::new();
        if negative {
            value.push('-');
        }

        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            value.push(self.current_char());
            self.advance();
        }

        value
            .parse::<i64>()
            .map(Token::IntegerLiteral)
            .map_err(|_| Error::Syntax(format!("invalid number at position {}", start_pos)))
    }

    /// Read an identifier or keyword
    fn read_identifier(&mut self) -> Token {
        let mut value = String::new();

        while !self.is_at_end() {
            let ch = self.current_char();

            if ch.is_alphanumeric() || ch == '_' {
                value.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        Token::from_keyword(&value).unwrap_or(Token::Identifier(value))
    }
}

fn unexpected_character(ch: char, position: usize) -> Error {
    Error::Syntax(format!(
        "unexpected character '{}' at position {}",
        ch, position
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_with_where() {
        let mut lexer = Lexer::new("SELECT id, name FROM DDL WHERE price = 20;");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Select,
                Token::Identifier("id".to_string()),
                Token::Comma,
                Token::Identifier("name".to_string()),
                Token::From,
                Token::Identifier("DDL".to_string()),
                Token::Where,
                Token::Identifier("price".to_string()),
                Token::Eq,
                Token::IntegerLiteral(20),
                Token::Semicolon,
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_create_table() {
        let mut lexer = Lexer::new("create table DDL(id int, name varchar(20),price int)");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::Create);
        assert_eq!(tokens[1], Token::Table);
        assert_eq!(tokens[2], Token::Identifier("DDL".to_string()));
        assert_eq!(tokens[3], Token::LParen);
        assert_eq!(tokens[5], Token::Int);
        assert_eq!(tokens[8], Token::Varchar);
        assert_eq!(tokens[10], Token::IntegerLiteral(20));
    }

    #[test]
    fn test_string_literals() {
        let mut lexer = Lexer::new(r#"values(1,"notebook",'pen')"#);
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[4], Token::StringLiteral("notebook".to_string()));
        assert_eq!(tokens[6], Token::StringLiteral("pen".to_string()));
    }

    #[test]
    fn test_escaped_quotes() {
        let mut lexer = Lexer::new(r#"'it''s' "say ""hi""""#);
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::StringLiteral("it's".to_string()));
        assert_eq!(tokens[1], Token::StringLiteral("say \"hi\"".to_string()));
    }

    #[test]
    fn test_backtick_identifier() {
        let mut lexer = Lexer::new("`order items`");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[0], Token::Identifier("order items".to_string()));
    }

    #[test]
    fn test_comparison_operators() {
        let mut lexer = Lexer::new("a < b <= c > d >= e <> f != g");
        let tokens = lexer.tokenize().unwrap();

        assert!(tokens.contains(&Token::Lt));
        assert!(tokens.contains(&Token::Lte));
        assert!(tokens.contains(&Token::Gt));
        assert!(tokens.contains(&Token::Gte));
        assert_eq!(tokens.iter().filter(|t| **t == Token::Neq).count(), 2);
    }

    #[test]
    fn test_negative_number() {
        let mut lexer = Lexer::new("price = -5");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(tokens[2], Token::IntegerLiteral(-5));
    }

    #[test]
    fn test_integer_extremes() {
        let tokens = Lexer::new("-9223372036854775808 9223372036854775807")
            .tokenize()
            .unwrap();

        assert_eq!(tokens[0], Token::IntegerLiteral(i64::MIN));
        assert_eq!(tokens[1], Token::IntegerLiteral(i64::MAX));
    }

    #[test]
    fn test_comments() {
        let mut lexer = Lexer::new("DELETE -- remove\nFROM /* the table */ DDL");
        let tokens = lexer.tokenize().unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::Delete,
                Token::From,
                Token::Identifier("DDL".to_string()),
                Token::Eof,
            ]
        );
    }

    #[test]
    fn test_lexer_errors() {
        assert!(matches!(
            Lexer::new("'unterminated").tokenize(),
            Err(Error::Syntax(_))
        ));
        assert!(matches!(Lexer::new("a # b").tokenize(), Err(Error::Syntax(_))));
        assert!(matches!(
            Lexer::new("99999999999999999999").tokenize(),
            Err(Error::Syntax(_))
        ));
    }
}
